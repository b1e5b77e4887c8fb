//! Single-file store in long format.
//!
//! Layout: `fecha_estancia,tipo_alojamiento,cantidad,fecha_snapshot`, one
//! line per record. Every write rewrites the whole file through a temporary
//! sibling and a rename, so readers never see a half-written file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::replace_file;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::{sort_history, Snapshot, SnapshotRecord};
use crate::error::{Result, StoreError};
use crate::port::outbound::store::SnapshotStore;

#[derive(Debug, Serialize, Deserialize)]
struct LongRow {
    #[serde(rename = "fecha_estancia")]
    stay_date: NaiveDate,
    #[serde(rename = "tipo_alojamiento")]
    room_type: RoomType,
    #[serde(rename = "cantidad")]
    quantity: u32,
    #[serde(rename = "fecha_snapshot")]
    snapshot_date: NaiveDate,
}

impl From<&SnapshotRecord> for LongRow {
    fn from(r: &SnapshotRecord) -> Self {
        Self {
            stay_date: r.stay_date,
            room_type: r.room_type.clone(),
            quantity: r.quantity,
            snapshot_date: r.snapshot_date,
        }
    }
}

impl From<LongRow> for SnapshotRecord {
    fn from(r: LongRow) -> Self {
        Self {
            stay_date: r.stay_date,
            room_type: r.room_type,
            quantity: r.quantity,
            snapshot_date: r.snapshot_date,
        }
    }
}

/// Long-format CSV file store.
#[derive(Debug, Clone)]
pub struct CsvSnapshotStore {
    path: PathBuf,
}

impl CsvSnapshotStore {
    /// Use the file at `path`. A missing file is an empty store.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, err: &csv::Error) -> StoreError {
        StoreError::Malformed {
            location: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl SnapshotStore for CsvSnapshotStore {
    fn write(&self, snapshot: &Snapshot) -> Result<usize> {
        let mut records: Vec<SnapshotRecord> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.snapshot_date != snapshot.date())
            .collect();
        let previous = records.len();
        records.extend(snapshot.records());
        sort_history(&mut records);

        replace_file(&self.path, |file| {
            let mut writer = csv::Writer::from_writer(file);
            for record in &records {
                writer
                    .serialize(LongRow::from(record))
                    .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
            }
            writer.flush().map_err(StoreError::Io)?;
            Ok(())
        })?;

        debug!(
            path = %self.path.display(),
            snapshot_date = %snapshot.date(),
            records = snapshot.len(),
            kept = previous,
            "csv snapshot written"
        );
        Ok(snapshot.len())
    }

    fn read_all(&self) -> Result<Vec<SnapshotRecord>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e).into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        let mut records = Vec::new();
        for row in reader.deserialize::<LongRow>() {
            let row = row.map_err(|e| self.malformed(&e))?;
            records.push(SnapshotRecord::from(row));
        }
        sort_history(&mut records);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_uses_long_layout_headers() {
        let dir = TempDir::new().unwrap();
        let store = CsvSnapshotStore::new(dir.path().join("reservas.csv"));
        let mut s = Snapshot::new(date(2025, 1, 10));
        s.insert(date(2025, 8, 1), RoomType::try_new("N-4").unwrap(), 5);
        store.write(&s).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "fecha_estancia,tipo_alojamiento,cantidad,fecha_snapshot\n2025-08-01,N-4,5,2025-01-10\n"
        );
    }

    #[test]
    fn corrupt_file_is_malformed_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reservas.csv");
        std::fs::write(
            &path,
            "fecha_estancia,tipo_alojamiento,cantidad,fecha_snapshot\nnot-a-date,N-4,5,2025-01-10\n",
        )
        .unwrap();

        let err = CsvSnapshotStore::new(path).read_all().unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Store(StoreError::Malformed { .. })
        ));
        assert!(err.is_recoverable());
    }
}
