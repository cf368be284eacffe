use std::env;
use std::path::PathBuf;

use crate::error::{AppError, Result};

const DEFAULT_LOG_ROOT: &str = "/root/loot/wigle-bluetooth";
const DEFAULT_GPSD_ADDRESS: &str = "localhost:2947";
const DEFAULT_SCAN_QUEUE_DEPTH: usize = 256;
const MAX_SCAN_QUEUE_DEPTH: usize = 65_536;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub log_root: PathBuf,
    pub gpsd_address: String,
    pub adapter: Option<String>,
    pub scan_queue_depth: usize,
}

impl LoggerConfig {
    pub fn new() -> Result<Self> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let log_root = non_empty("WIGLE_BLE_LOG_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_ROOT));

        let gpsd_address =
            non_empty("GPSD_ADDRESS").unwrap_or_else(|| DEFAULT_GPSD_ADDRESS.to_string());

        let adapter = non_empty("BLUETOOTH_ADAPTER");

        let scan_queue_depth = match non_empty("SCAN_QUEUE_DEPTH") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(depth) if (1..=MAX_SCAN_QUEUE_DEPTH).contains(&depth) => depth,
                _ => {
                    return Err(AppError::Config(format!(
                        "SCAN_QUEUE_DEPTH must be an integer between 1 and {}, got '{}'",
                        MAX_SCAN_QUEUE_DEPTH, raw
                    )))
                }
            },
            None => DEFAULT_SCAN_QUEUE_DEPTH,
        };

        Ok(LoggerConfig {
            log_root,
            gpsd_address,
            adapter,
            scan_queue_depth,
        })
    }
}
