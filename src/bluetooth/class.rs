/// Device class lookup against the BlueZ device registry
///
/// Class of Device is best-effort enrichment. Every failure collapses to 0,
/// which encodes as "Misc [LE]".
use async_trait::async_trait;
use log::debug;
use thiserror::Error;

use crate::utils::canonical_address;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    #[error("registry lookup failed: {0}")]
    Lookup(String),
}

/// Keyed lookup of a device's Class of Device value.
#[async_trait]
pub trait ClassRegistry: Send + Sync {
    /// `Ok(None)` when the registry knows the device but has no class for it.
    async fn lookup_class(&self, address: &str) -> Result<Option<u32>, RegistryError>;
}

/// D-Bus object path BlueZ uses for a device, e.g.
/// `/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF`
///
/// Diagnostic only: it names the object in lookup errors. bluer builds its
/// own path for the actual property read.
pub fn device_object_path(adapter: &str, address: &str) -> String {
    format!(
        "/org/bluez/{}/dev_{}",
        adapter,
        canonical_address(address).replace(':', "_")
    )
}

/// Reads `org.bluez.Device1.Class` through bluer
pub struct BluezClassRegistry {
    adapter: bluer::Adapter,
}

impl BluezClassRegistry {
    pub fn new(adapter: bluer::Adapter) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl ClassRegistry for BluezClassRegistry {
    async fn lookup_class(&self, address: &str) -> Result<Option<u32>, RegistryError> {
        let addr: bluer::Address = address
            .parse()
            .map_err(|_| RegistryError::InvalidAddress(address.to_string()))?;

        let path = device_object_path(self.adapter.name(), address);
        let device = self
            .adapter
            .device(addr)
            .map_err(|e| RegistryError::Lookup(format!("{}: {}", path, e)))?;

        device
            .class()
            .await
            .map_err(|e| RegistryError::Lookup(format!("{}: {}", path, e)))
    }
}

pub struct DeviceClassResolver<R> {
    registry: R,
}

impl<R: ClassRegistry> DeviceClassResolver<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Raw class code for `address`, or 0 when it cannot be resolved.
    pub async fn class_of(&self, address: &str) -> u32 {
        match self.registry.lookup_class(address).await {
            Ok(Some(class)) => class,
            Ok(None) => {
                debug!("No device class reported for {}", address);
                0
            }
            Err(e) => {
                debug!("Device class lookup failed for {}: {}", address, e);
                0
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory registry; addresses not present fail the lookup.
    pub(crate) struct MockRegistry {
        pub classes: HashMap<String, Option<u32>>,
    }

    impl MockRegistry {
        pub(crate) fn with(entries: &[(&str, Option<u32>)]) -> Self {
            Self {
                classes: entries
                    .iter()
                    .map(|(addr, class)| (addr.to_string(), *class))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ClassRegistry for MockRegistry {
        async fn lookup_class(&self, address: &str) -> Result<Option<u32>, RegistryError> {
            self.classes
                .get(address)
                .copied()
                .ok_or_else(|| RegistryError::Lookup(format!("no such object: {}", address)))
        }
    }

    #[test]
    fn test_device_object_path() {
        assert_eq!(
            device_object_path("hci0", "aa:bb:cc:dd:ee:ff"),
            "/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF"
        );
    }

    #[tokio::test]
    async fn test_resolves_known_class() {
        let resolver =
            DeviceClassResolver::new(MockRegistry::with(&[("AA:BB:CC:DD:EE:FF", Some(0x5A020C))]));
        assert_eq!(resolver.class_of("AA:BB:CC:DD:EE:FF").await, 0x5A020C);
    }

    #[tokio::test]
    async fn test_failures_resolve_to_zero() {
        let resolver =
            DeviceClassResolver::new(MockRegistry::with(&[("11:22:33:44:55:66", None)]));
        assert_eq!(resolver.class_of("11:22:33:44:55:66").await, 0);
        assert_eq!(resolver.class_of("AA:BB:CC:DD:EE:FF").await, 0);
    }
}
