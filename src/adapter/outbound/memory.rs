//! In-process snapshot store for tests and dry runs.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::snapshot::{Snapshot, SnapshotRecord};
use crate::error::Result;
use crate::port::outbound::store::SnapshotStore;

/// Snapshots keyed by date. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RefCell<BTreeMap<NaiveDate, Snapshot>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of every record in another store.
    pub fn seeded_from(other: &dyn SnapshotStore) -> Result<Self> {
        let store = Self::new();
        let history = other.read_all()?;
        for date in crate::domain::snapshot::snapshot_dates(&history) {
            store.write(&Snapshot::from_records(date, &history))?;
        }
        Ok(store)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write(&self, snapshot: &Snapshot) -> Result<usize> {
        let mut snapshots = self.snapshots.borrow_mut();
        if snapshot.is_empty() {
            snapshots.remove(&snapshot.date());
        } else {
            snapshots.insert(snapshot.date(), snapshot.clone());
        }
        Ok(snapshot.len())
    }

    fn read_all(&self) -> Result<Vec<SnapshotRecord>> {
        // BTreeMap order on date then key already matches the store ordering.
        Ok(self
            .snapshots
            .borrow()
            .values()
            .flat_map(|s| s.records().collect::<Vec<_>>())
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        Ok(self.snapshots.borrow().get(&date).cloned())
    }

    fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.snapshots.borrow().keys().copied().collect())
    }
}
