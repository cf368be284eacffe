/// Error types for the logger
///
/// Everything here is fatal for the run. Best-effort lookups (device class,
/// manufacturer data) never surface as an `AppError`; they degrade to defaults
/// inside the component that owns them.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to {action}: {source}")]
    Bluetooth {
        action: &'static str,
        #[source]
        source: bluer::Error,
    },

    #[error("failed to connect to gpsd at {address}: {source}")]
    GpsConnect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gpsd feed error: {0}")]
    GpsFeed(#[source] std::io::Error),

    #[error("failed to create log directory {}: {source}", path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log row: {0}")]
    LogWrite(#[from] csv::Error),

    #[error("failed to format timestamp: {0}")]
    TimeFormat(#[from] time::error::Format),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Wrap a bluer error with the startup step that produced it.
    pub fn bluetooth(action: &'static str) -> impl FnOnce(bluer::Error) -> Self {
        move |source| Self::Bluetooth { action, source }
    }
}
