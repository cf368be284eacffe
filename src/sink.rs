/// Append-only WiGLE Bluetooth CSV log
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{LogRow, LOG_HEADER};

/// Writer whose contents can be pushed to stable storage
pub trait Persist: Write {
    fn persist_data(&self) -> io::Result<()>;
    fn persist_all(&self) -> io::Result<()>;
}

impl Persist for File {
    fn persist_data(&self) -> io::Result<()> {
        self.sync_data()
    }

    fn persist_all(&self) -> io::Result<()> {
        self.sync_all()
    }
}

pub struct LogSink<W: Persist = File> {
    path: PathBuf,
    writer: csv::Writer<W>,
}

impl LogSink<File> {
    /// Create the log file (and any missing parent directories) and write the header
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| AppError::LogDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(path).map_err(|source| AppError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

        Self::with_writer(path, file)
    }
}

impl<W: Persist> LogSink<W> {
    /// Start a log on an already opened writer by writing the header
    pub fn with_writer(path: &Path, inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);
        writer.write_record(LOG_HEADER)?;
        writer.flush().map_err(csv::Error::from)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one row and push it to stable storage before returning
    pub fn append(&mut self, row: &LogRow) -> Result<()> {
        self.writer.write_record(row.to_record())?;
        self.writer.flush().map_err(csv::Error::from)?;
        self.writer.get_ref().persist_data().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        self.writer.flush().map_err(csv::Error::from)?;
        self.writer.get_ref().persist_all().map_err(csv::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory writer that starts failing once `full` is set, like a disk
    /// running out of space.
    #[derive(Clone, Default)]
    pub(crate) struct FillingDisk {
        pub full: Arc<AtomicBool>,
        pub contents: Arc<Mutex<Vec<u8>>>,
    }

    impl FillingDisk {
        pub(crate) fn lines(&self) -> Vec<String> {
            String::from_utf8(self.contents.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl Write for FillingDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.full.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            self.contents.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Persist for FillingDisk {
        fn persist_data(&self) -> io::Result<()> {
            Ok(())
        }

        fn persist_all(&self) -> io::Result<()> {
            Ok(())
        }
    }

    fn row(ssid: &str) -> LogRow {
        LogRow {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            ssid: ssid.into(),
            auth_mode: "Misc [LE]".into(),
            first_seen: "2026-10-19 12:00:00".into(),
            frequency: 0,
            rssi: -80,
            latitude: 1.0,
            longitude: 2.0,
            altitude: 3.0,
            accuracy_meters: 4.0,
            mfgr_id: String::new(),
        }
    }

    const HEADER_LINE: &str = "MAC,SSID,AuthMode,FirstSeen,Channel,Frequency,RSSI,CurrentLatitude,CurrentLongitude,AltitudeMeters,AccuracyMeters,RCOIs,MfgrId,Type";

    #[test]
    fn test_open_creates_directories_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/loot/wigle-bluetooth-test.csv");

        let sink = LogSink::open(&path).unwrap();
        assert_eq!(sink.path(), path.as_path());
        sink.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", HEADER_LINE));
    }

    #[test]
    fn test_rows_visible_without_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let mut sink = LogSink::open(&path).unwrap();
        sink.append(&row("Tag")).unwrap();

        // Read back while the sink is still open
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "AA:BB:CC:DD:EE:FF,Tag,Misc [LE],2026-10-19 12:00:00,0,0,-80,1.000000,2.000000,3,4.000000,,,BLE"
        );
        drop(sink);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let mut sink = LogSink::open(&path).unwrap();
        sink.append(&row("Kitchen, Speaker")).unwrap();
        sink.close().unwrap();

        let mut reader = csv::ReaderBuilder::new().from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 14);

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), 14);
        assert_eq!(&record[1], "Kitchen, Speaker");
    }

    #[test]
    fn test_header_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");

        LogSink::open(&first).unwrap().close().unwrap();
        LogSink::open(&second).unwrap().close().unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let result = LogSink::open(&blocker.join("log.csv"));
        assert!(matches!(result, Err(AppError::LogDirectory { .. })));
    }

    #[test]
    fn test_append_fails_when_disk_is_full() {
        let disk = FillingDisk::default();
        let mut sink = LogSink::with_writer(Path::new("full.csv"), disk.clone()).unwrap();
        sink.append(&row("Tag")).unwrap();

        disk.full.store(true, Ordering::SeqCst);
        let result = sink.append(&row("Lost"));
        assert!(matches!(result, Err(AppError::LogWrite(_))));

        let lines = disk.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER_LINE);
        assert!(lines[1].contains(",Tag,"));
    }
}
