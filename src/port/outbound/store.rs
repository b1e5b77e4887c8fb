//! Persistence port for booking snapshots.

use chrono::NaiveDate;

use crate::domain::snapshot::{self, Snapshot, SnapshotRecord};
use crate::error::Result;

/// Storage operations for snapshot records.
///
/// Backends only have to provide [`write`](Self::write),
/// [`read_all`](Self::read_all) and [`describe`](Self::describe); the
/// snapshot lookups are derived from the full history. Backends with an index
/// may override them.
pub trait SnapshotStore {
    /// Replace every record stored under `snapshot.date()` with the snapshot's
    /// records, as one logical operation. Returns the number of records written.
    ///
    /// On failure the previously stored state is left untouched.
    fn write(&self, snapshot: &Snapshot) -> Result<usize>;

    /// Every stored record, ordered by `(snapshot_date, stay_date, room_type)`.
    fn read_all(&self) -> Result<Vec<SnapshotRecord>>;

    /// Short human-readable label (backend and location).
    fn describe(&self) -> String;

    /// Distinct stored snapshot dates, ascending.
    fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(snapshot::snapshot_dates(&self.read_all()?))
    }

    /// Records of the most recent snapshot date, `None` on an empty store.
    fn read_latest_snapshot(&self) -> Result<Option<Snapshot>> {
        let history = self.read_all()?;
        let latest = history.iter().map(|r| r.snapshot_date).max();
        Ok(latest.map(|date| Snapshot::from_records(date, &history)))
    }

    /// Records stored under exactly `date`.
    fn read_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let history = self.read_all()?;
        let snapshot = Snapshot::from_records(date, &history);
        Ok((!snapshot.is_empty()).then_some(snapshot))
    }

    /// Most recent snapshot strictly older than `date`.
    fn read_latest_before(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        let history = self.read_all()?;
        let previous = history
            .iter()
            .map(|r| r.snapshot_date)
            .filter(|d| *d < date)
            .max();
        Ok(previous.map(|d| Snapshot::from_records(d, &history)))
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn write(&self, snapshot: &Snapshot) -> Result<usize> {
        (**self).write(snapshot)
    }

    fn read_all(&self) -> Result<Vec<SnapshotRecord>> {
        (**self).read_all()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        (**self).snapshot_dates()
    }

    fn read_latest_snapshot(&self) -> Result<Option<Snapshot>> {
        (**self).read_latest_snapshot()
    }

    fn read_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        (**self).read_snapshot(date)
    }

    fn read_latest_before(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        (**self).read_latest_before(date)
    }
}
