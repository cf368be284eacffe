/// Bluetooth Low Energy discovery feed
use futures_util::{pin_mut, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::bluetooth::class::BluezClassRegistry;
use crate::error::{AppError, Result};
use crate::models::DeviceObservation;
use crate::utils::canonical_address;

/// Powered-on BlueZ adapter ready to scan
pub struct BleScanner {
    _session: bluer::Session,
    adapter: bluer::Adapter,
}

impl BleScanner {
    /// Open a BlueZ session, pick the adapter and power it on
    ///
    /// Every failure here is fatal: without a radio there is nothing to log.
    pub async fn init(adapter_name: Option<&str>) -> Result<Self> {
        // Initialize Bluetooth session
        let session = bluer::Session::new()
            .await
            .map_err(AppError::bluetooth("create Bluetooth session"))?;

        let adapter = match adapter_name {
            Some(name) => session
                .adapter(name)
                .map_err(AppError::bluetooth("open Bluetooth adapter"))?,
            None => session
                .default_adapter()
                .await
                .map_err(AppError::bluetooth("get default Bluetooth adapter"))?,
        };

        // Ensure Bluetooth adapter is powered on
        adapter
            .set_powered(true)
            .await
            .map_err(AppError::bluetooth("power on adapter"))?;

        // Low Energy only, and report every advertisement rather than the first
        let filter = bluer::DiscoveryFilter {
            transport: bluer::DiscoveryTransport::Le,
            duplicate_data: true,
            ..Default::default()
        };

        adapter
            .set_discovery_filter(filter)
            .await
            .map_err(AppError::bluetooth("set discovery filter"))?;

        info!("Bluetooth adapter {} ready", adapter.name());

        Ok(Self {
            _session: session,
            adapter,
        })
    }

    /// Registry view of the same adapter for device class lookups
    pub fn class_registry(&self) -> BluezClassRegistry {
        BluezClassRegistry::new(self.adapter.clone())
    }

    /// Start discovery and stream observations into a bounded queue
    ///
    /// The returned receiver closes when the discovery stream ends.
    pub async fn start(&self, queue_depth: usize) -> Result<mpsc::Receiver<DeviceObservation>> {
        let events = self
            .adapter
            .discover_devices_with_changes()
            .await
            .map_err(AppError::bluetooth("start scan"))?;

        let (tx, rx) = mpsc::channel(queue_depth);
        let adapter = self.adapter.clone();

        tokio::spawn(async move {
            pin_mut!(events);
            while let Some(event) = events.next().await {
                let addr = match event {
                    bluer::AdapterEvent::DeviceAdded(addr) => addr,
                    other => {
                        debug!("Discovery event: {:?}", other);
                        continue;
                    }
                };

                let observation = match observe(&adapter, addr).await {
                    Some(observation) => observation,
                    None => continue,
                };

                if tx.send(observation).await.is_err() {
                    debug!("Observation queue closed, stopping discovery");
                    break;
                }
            }
            warn!("Bluetooth discovery stream ended");
        });

        info!("Bluetooth LE scan started");
        Ok(rx)
    }
}

/// Read the advertised properties of one device into an observation
async fn observe(adapter: &bluer::Adapter, addr: bluer::Address) -> Option<DeviceObservation> {
    let device = match adapter.device(addr) {
        Ok(device) => device,
        Err(e) => {
            error!("Failed to open device {}: {}", addr, e);
            return None;
        }
    };

    let local_name = device.name().await.ok().flatten().unwrap_or_default();
    // BlueZ replays cached devices first; only those with an RSSI are in range
    let rssi = match device.rssi().await {
        Ok(rssi) => rssi,
        Err(e) => {
            debug!("Failed to get RSSI for {}: {}", addr, e);
            None
        }
    };
    let manufacturer_data = match device.manufacturer_data().await {
        Ok(data) => data,
        Err(e) => {
            debug!("Failed to get manufacturer data for {}: {}", addr, e);
            None
        }
    };

    let observation = build_observation(
        &addr.to_string(),
        local_name,
        rssi,
        manufacturer_data.as_ref(),
    );
    if observation.is_none() {
        debug!("No RSSI for {}, device not in range", addr);
    }
    observation
}

/// Assemble an observation from raw device properties
///
/// BlueZ hands manufacturer data over as an unordered map, so company
/// identifiers are sorted to make "first entry" deterministic. A device
/// without an RSSI was not heard in this scan and yields `None`.
pub fn build_observation(
    address: &str,
    local_name: String,
    rssi: Option<i16>,
    manufacturer_data: Option<&HashMap<u16, Vec<u8>>>,
) -> Option<DeviceObservation> {
    let rssi = rssi?;
    let mut manufacturer_ids: Vec<u16> = manufacturer_data
        .map(|data| data.keys().copied().collect())
        .unwrap_or_default();
    manufacturer_ids.sort_unstable();

    Some(DeviceObservation {
        address: canonical_address(address),
        local_name,
        rssi,
        manufacturer_ids,
    })
}
