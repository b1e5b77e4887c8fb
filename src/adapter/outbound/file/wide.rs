//! Directory store with one wide CSV per snapshot date.
//!
//! Files are named `snapshot_YYYY-MM-DD.csv` and hold the same layout users
//! upload: `fecha` plus one column per room type. They are read back through
//! the upload normalizer, with two differences: every column is a room type
//! (so a later capacity change never hides stored records), and anything the
//! normalizer would drop is treated as corruption.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::replace_file;
use crate::adapter::outbound::table::{export, reader};
use crate::application::ingest;
use crate::domain::capacity::CapacityModel;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::{Snapshot, SnapshotRecord};
use crate::error::{Result, StoreError};
use crate::port::outbound::store::SnapshotStore;

const PREFIX: &str = "snapshot_";
const SUFFIX: &str = ".csv";

/// One wide file per snapshot date inside a directory.
#[derive(Debug, Clone)]
pub struct WideDirectoryStore {
    dir: PathBuf,
    capacity: CapacityModel,
}

impl WideDirectoryStore {
    /// Use `dir` (created on first write). `capacity` gives the columns every
    /// file starts with; room types outside it get extra columns.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, capacity: CapacityModel) -> Self {
        Self {
            dir: dir.into(),
            capacity,
        }
    }

    fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{PREFIX}{}{SUFFIX}", date.format("%Y-%m-%d")))
    }

    /// `(date, path)` of every snapshot file, ascending by date.
    fn files(&self) -> Result<Vec<(NaiveDate, PathBuf)>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e).into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(StoreError::Io)?.path();
            if let Some(date) = snapshot_file_date(&path) {
                files.push((date, path));
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, date: NaiveDate, path: &Path) -> Result<Snapshot> {
        let malformed = |reason: String| StoreError::Malformed {
            location: path.display().to_string(),
            reason,
        };
        let table = reader::read_table_file(path).map_err(|e| malformed(e.to_string()))?;
        let upload =
            ingest::normalize_stored(&table, date).map_err(|e| malformed(e.to_string()))?;

        if let Some(row) = upload.dropped_rows.first() {
            return Err(malformed(format!("line {}: {}", row.line, row.error)).into());
        }
        if let Some(cell) = upload.skipped_cells.first() {
            return Err(malformed(format!("line {}: {}", cell.line, cell.error)).into());
        }
        if !upload.ignored_columns.is_empty() {
            return Err(malformed(format!(
                "unreadable column headers: {:?}",
                upload.ignored_columns
            ))
            .into());
        }
        Ok(upload.snapshot)
    }

    /// Configured room types first, then any others present in `snapshot`.
    fn columns_for(&self, snapshot: &Snapshot) -> Vec<RoomType> {
        let mut columns: Vec<RoomType> = self.capacity.room_types().cloned().collect();
        let extra: BTreeSet<&RoomType> = snapshot
            .keys()
            .map(|k| &k.room_type)
            .filter(|rt| !self.capacity.contains(rt))
            .collect();
        columns.extend(extra.into_iter().cloned());
        columns
    }
}

fn snapshot_file_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let date = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

impl SnapshotStore for WideDirectoryStore {
    fn write(&self, snapshot: &Snapshot) -> Result<usize> {
        let path = self.file_for(snapshot.date());
        if snapshot.is_empty() {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e).into()),
            }
            return Ok(0);
        }

        let columns = self.columns_for(snapshot);
        replace_file(&path, |file| export::write_wide_snapshot(snapshot, &columns, file))?;
        debug!(
            path = %path.display(),
            snapshot_date = %snapshot.date(),
            records = snapshot.len(),
            "wide snapshot written"
        );
        Ok(snapshot.len())
    }

    fn read_all(&self) -> Result<Vec<SnapshotRecord>> {
        let mut records = Vec::new();
        for (date, path) in self.files()? {
            records.extend(self.load(date, &path)?.records());
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("wide:{}", self.dir.display())
    }

    fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.files()?.into_iter().map(|(date, _)| date).collect())
    }

    fn read_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let path = self.file_for(date);
        if !path.exists() {
            return Ok(None);
        }
        let snapshot = self.load(date, &path)?;
        Ok((!snapshot.is_empty()).then_some(snapshot))
    }

    fn read_latest_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.files()?.pop() {
            Some((date, path)) => Ok(Some(self.load(date, &path)?)),
            None => Ok(None),
        }
    }

    fn read_latest_before(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let previous = self.files()?.into_iter().filter(|(d, _)| *d < date).last();
        match previous {
            Some((d, path)) => Ok(Some(self.load(d, &path)?)),
            None => Ok(None),
        }
    }
}
