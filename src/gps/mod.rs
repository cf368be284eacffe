pub mod gpsd;
pub mod tracker;

pub use gpsd::GpsdClient;
pub use tracker::LocationTracker;
