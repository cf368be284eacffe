pub mod capabilities;
pub mod class;
pub mod scanner;

pub use capabilities::{masked_class, CapabilityEncoder};
pub use class::{ClassRegistry, DeviceClassResolver};
pub use scanner::BleScanner;
