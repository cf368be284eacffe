use log::info;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{LocationFix, PositionReport};

/// Minimum gpsd fix mode that carries a position (2 = 2D, 3 = 3D)
const MIN_FIX_MODE: u8 = 2;

/// Holds the current location snapshot shared between the position feed and
/// the scan correlator.
///
/// Cloning shares the same snapshot. Updates swap the whole `LocationFix` under
/// the write lock, so readers never see fields from two different reports.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    current: Arc<RwLock<LocationFix>>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the contents of `report`
    pub fn update(&self, report: &PositionReport) -> LocationFix {
        let fix = LocationFix {
            has_fix: report.mode >= MIN_FIX_MODE,
            latitude: report.latitude,
            longitude: report.longitude,
            altitude: report.altitude,
            accuracy_meters: report.horizontal_error,
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = fix;

        info!(
            "GPS update: Fix {} Lat {:.6} Lon {:.6} Alt {:.1} m Acc {:.1} m",
            fix.has_fix, fix.latitude, fix.longitude, fix.altitude, fix.accuracy_meters
        );
        fix
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> LocationFix {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}
