/// Correlation of discovery events with the current location into log rows
use log::info;
use time::OffsetDateTime;

use crate::bluetooth::{masked_class, CapabilityEncoder, ClassRegistry, DeviceClassResolver};
use crate::error::Result;
use crate::first_seen::FirstSeenRegistry;
use crate::gps::LocationTracker;
use crate::models::{DeviceObservation, LogRow};
use crate::sink::{LogSink, Persist};
use crate::utils::{canonical_address, format_first_seen};

/// Turns discovery events into WiGLE rows.
///
/// Owns the first-seen registry; discovery events are handled one at a time
/// by the single consumer of the scan queue.
pub struct ScanCorrelator<R> {
    location: LocationTracker,
    first_seen: FirstSeenRegistry,
    resolver: DeviceClassResolver<R>,
    encoder: CapabilityEncoder,
}

impl<R: ClassRegistry> ScanCorrelator<R> {
    pub fn new(
        location: LocationTracker,
        resolver: DeviceClassResolver<R>,
        encoder: CapabilityEncoder,
    ) -> Self {
        Self {
            location,
            first_seen: FirstSeenRegistry::new(),
            resolver,
            encoder,
        }
    }

    /// Build the row for one discovery event observed at `now`
    ///
    /// Returns `None` when there is no GPS fix; the event is dropped.
    pub async fn correlate(
        &mut self,
        observation: &DeviceObservation,
        now: OffsetDateTime,
    ) -> Option<LogRow> {
        let loc = self.location.snapshot();
        let address = canonical_address(&observation.address);

        if !loc.has_fix {
            info!("No GPS fix, skipping device: {}", address);
            return None;
        }

        self.first_seen.touch(&address, now);
        let first_seen = self
            .first_seen
            .first_seen_of(&address)
            .map(|dt| format_first_seen(&dt))
            .unwrap_or_default();

        let device_class = self.resolver.class_of(&address).await;
        let capabilities = self.encoder.encode(device_class);

        info!(
            "Found device: {} ({}) Class: 0x{:06X} Capabilities: {}",
            address, observation.local_name, device_class, capabilities
        );

        Some(LogRow {
            mac: address,
            ssid: observation.local_name.clone(),
            auth_mode: capabilities,
            first_seen,
            frequency: masked_class(device_class),
            rssi: observation.rssi,
            latitude: loc.latitude,
            longitude: loc.longitude,
            altitude: loc.altitude,
            accuracy_meters: loc.accuracy_meters,
            mfgr_id: observation.first_manufacturer_id(),
        })
    }

    /// Correlate one event and append the row, if any, to `sink`
    ///
    /// Returns whether a row was written.
    pub async fn process<W: Persist>(
        &mut self,
        observation: &DeviceObservation,
        now: OffsetDateTime,
        sink: &mut LogSink<W>,
    ) -> Result<bool> {
        match self.correlate(observation, now).await {
            Some(row) => {
                sink.append(&row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of distinct devices logged this session
    pub fn devices_seen(&self) -> usize {
        self.first_seen.len()
    }
}
