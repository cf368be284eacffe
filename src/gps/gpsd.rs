/// gpsd client: subscribes to the JSON watch stream and feeds TPV reports
/// into the location tracker
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{AppError, Result};
use crate::gps::tracker::LocationTracker;
use crate::models::PositionReport;

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";

/// gpsd JSON object, dispatched on its `class` member
#[derive(Debug, Deserialize)]
#[serde(tag = "class")]
enum GpsdMessage {
    #[serde(rename = "TPV")]
    Tpv(TpvReport),
    #[serde(other)]
    Other,
}

/// Time-position-velocity report. Every member except `class` is optional.
#[derive(Debug, Default, Deserialize)]
struct TpvReport {
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
    alt: Option<f64>,
    #[serde(rename = "altMSL")]
    alt_msl: Option<f64>,
    #[serde(rename = "altHAE")]
    alt_hae: Option<f64>,
    eph: Option<f64>,
    epx: Option<f64>,
    epy: Option<f64>,
}

impl From<TpvReport> for PositionReport {
    fn from(tpv: TpvReport) -> Self {
        // Newer gpsd releases drop `alt` and `eph` in favour of these
        let altitude = tpv.alt.or(tpv.alt_msl).or(tpv.alt_hae).unwrap_or(0.0);
        let horizontal_error = tpv
            .eph
            .or(match (tpv.epx, tpv.epy) {
                (Some(x), Some(y)) => Some(x.max(y)),
                (x, y) => x.or(y),
            })
            .unwrap_or(0.0);

        PositionReport {
            mode: tpv.mode,
            latitude: tpv.lat.unwrap_or(0.0),
            longitude: tpv.lon.unwrap_or(0.0),
            altitude,
            horizontal_error,
        }
    }
}

/// Decode one line of the watch stream; `None` for anything but a TPV report
pub fn parse_line(line: &str) -> Option<PositionReport> {
    match serde_json::from_str::<GpsdMessage>(line) {
        Ok(GpsdMessage::Tpv(tpv)) => Some(tpv.into()),
        Ok(GpsdMessage::Other) => None,
        Err(e) => {
            debug!("Ignoring undecodable gpsd line: {}", e);
            None
        }
    }
}

/// Feed every TPV report from `reader` into `tracker` until end of stream
pub async fn follow<R>(reader: R, tracker: &LocationTracker) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.map_err(AppError::GpsFeed)? {
        if let Some(report) = parse_line(&line) {
            tracker.update(&report);
        }
    }
    Ok(())
}

/// Like [`follow`], but marks the fix as lost once the feed stops
pub async fn track<R>(reader: R, tracker: LocationTracker)
where
    R: AsyncBufRead + Unpin,
{
    match follow(reader, &tracker).await {
        Ok(()) => warn!("gpsd closed the connection"),
        Err(e) => error!("{}", e),
    }
    tracker.update(&PositionReport::lost());
}

pub struct GpsdClient {
    stream: TcpStream,
}

impl GpsdClient {
    /// Connect to gpsd and enable the JSON watch stream
    pub async fn connect(address: &str) -> Result<Self> {
        let connect_error = |source| AppError::GpsConnect {
            address: address.to_string(),
            source,
        };

        let mut stream = TcpStream::connect(address).await.map_err(connect_error)?;
        stream
            .write_all(WATCH_COMMAND)
            .await
            .map_err(connect_error)?;

        info!("Connected to gpsd at {}", address);
        Ok(Self { stream })
    }

    /// Follow the position feed for the lifetime of the connection
    pub async fn watch(self, tracker: LocationTracker) {
        track(BufReader::new(self.stream), tracker).await;
    }
}
