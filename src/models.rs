/// Most recent GPS solution.
///
/// Always replaced as a whole, never mutated field by field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationFix {
    pub has_fix: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy_meters: f64,
}

/// One position report as delivered by the position feed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionReport {
    pub mode: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_error: f64,
}

impl PositionReport {
    /// Report used to signal that the position feed went away.
    pub fn lost() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceObservation {
    pub address: String,
    pub local_name: String,
    pub rssi: i16,
    /// Company identifiers from the manufacturer data; the first one is logged
    pub manufacturer_ids: Vec<u16>,
}

impl DeviceObservation {
    /// First manufacturer identifier as a decimal string, or empty.
    pub fn first_manufacturer_id(&self) -> String {
        self.manufacturer_ids
            .first()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }
}

/// Column header of the WiGLE Bluetooth log. Downstream tools match on this.
pub const LOG_HEADER: [&str; 14] = [
    "MAC",
    "SSID",
    "AuthMode",
    "FirstSeen",
    "Channel",
    "Frequency",
    "RSSI",
    "CurrentLatitude",
    "CurrentLongitude",
    "AltitudeMeters",
    "AccuracyMeters",
    "RCOIs",
    "MfgrId",
    "Type",
];

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub mac: String,
    pub ssid: String,
    pub auth_mode: String,
    pub first_seen: String,
    pub frequency: u32,
    pub rssi: i16,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy_meters: f64,
    pub mfgr_id: String,
}

impl LogRow {
    /// Render the row in header column order.
    pub fn to_record(&self) -> [String; 14] {
        [
            self.mac.clone(),
            self.ssid.clone(),
            self.auth_mode.clone(),
            self.first_seen.clone(),
            "0".to_string(), // Channel
            self.frequency.to_string(),
            self.rssi.to_string(),
            format!("{:.6}", self.latitude),
            format!("{:.6}", self.longitude),
            // Truncate toward zero, whole meters
            format!("{}", self.altitude as i64),
            format!("{:.6}", self.accuracy_meters),
            String::new(), // RCOIs
            self.mfgr_id.clone(),
            "BLE".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> LogRow {
        LogRow {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            ssid: "Pixel".into(),
            auth_mode: "Smartphone [LE]".into(),
            first_seen: "2026-10-19 12:00:00".into(),
            frequency: 524,
            rssi: -60,
            latitude: 37.0,
            longitude: -122.0,
            altitude: 10.9,
            accuracy_meters: 5.0,
            mfgr_id: "76".into(),
        }
    }

    #[test]
    fn test_record_column_order() {
        let record = sample_row().to_record();
        assert_eq!(record.len(), LOG_HEADER.len());
        assert_eq!(
            record,
            [
                "AA:BB:CC:DD:EE:FF",
                "Pixel",
                "Smartphone [LE]",
                "2026-10-19 12:00:00",
                "0",
                "524",
                "-60",
                "37.000000",
                "-122.000000",
                "10",
                "5.000000",
                "",
                "76",
                "BLE",
            ]
        );
    }

    #[test]
    fn test_negative_altitude_truncates_toward_zero() {
        let mut row = sample_row();
        row.altitude = -3.7;
        assert_eq!(row.to_record()[9], "-3");
    }

    #[test]
    fn test_header_text() {
        assert_eq!(
            LOG_HEADER.join(","),
            "MAC,SSID,AuthMode,FirstSeen,Channel,Frequency,RSSI,CurrentLatitude,\
             CurrentLongitude,AltitudeMeters,AccuracyMeters,RCOIs,MfgrId,Type"
        );
    }

    #[test]
    fn test_first_manufacturer_id_only() {
        let obs = DeviceObservation {
            address: "AA:BB:CC:DD:EE:FF".into(),
            local_name: String::new(),
            rssi: -70,
            manufacturer_ids: vec![76, 117],
        };
        assert_eq!(obs.first_manufacturer_id(), "76");

        let none = DeviceObservation {
            manufacturer_ids: Vec::new(),
            ..obs
        };
        assert_eq!(none.first_manufacturer_id(), "");
    }
}
