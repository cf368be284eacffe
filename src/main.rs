mod bluetooth;
mod config;
mod correlator;
mod error;
mod first_seen;
mod gps;
mod models;
mod sink;
mod utils;

use log::{error, info, warn};
use time::OffsetDateTime;

use bluetooth::{BleScanner, CapabilityEncoder, DeviceClassResolver};
use config::LoggerConfig;
use correlator::ScanCorrelator;
use error::Result;
use gps::{GpsdClient, LocationTracker};
use sink::LogSink;
use utils::log_file_path;

async fn run(config: LoggerConfig) -> Result<()> {
    let started_at = OffsetDateTime::now_utc();

    // Startup: every step here is fatal on failure
    let scanner = BleScanner::init(config.adapter.as_deref()).await?;
    let gps = GpsdClient::connect(&config.gpsd_address).await?;
    let mut sink = LogSink::open(&log_file_path(&config.log_root, started_at)?)?;
    info!("Writing to {}", sink.path().display());

    let tracker = LocationTracker::new();
    let gps_task = tokio::spawn(gps.watch(tracker.clone()));

    let mut observations = match scanner.start(config.scan_queue_depth).await {
        Ok(rx) => rx,
        Err(e) => {
            gps_task.abort();
            sink.close()?;
            return Err(e);
        }
    };

    let mut correlator = ScanCorrelator::new(
        tracker,
        DeviceClassResolver::new(scanner.class_registry()),
        CapabilityEncoder::default(),
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            observation = observations.recv() => {
                let Some(observation) = observation else {
                    warn!("Bluetooth scan stopped, shutting down");
                    break Ok(());
                };
                if let Err(e) = correlator
                    .process(&observation, OffsetDateTime::now_utc(), &mut sink)
                    .await
                {
                    break Err(e);
                }
            }
            _ = &mut shutdown => {
                info!("Program terminated by signal. Exiting gracefully.");
                break Ok(());
            }
        }
    };

    gps_task.abort();
    info!(
        "Logged {} distinct devices to {}",
        correlator.devices_seen(),
        sink.path().display()
    );
    sink.close()?;
    outcome
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match LoggerConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        return Err(e.into());
    }

    info!("Program completed successfully");
    Ok(())
}
