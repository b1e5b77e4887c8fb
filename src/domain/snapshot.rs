//! Snapshot records and per-date record sets.
//!
//! A [`SnapshotRecord`] is one persisted cell: booked units for a stay date and
//! room type as observed on a snapshot date. A [`Snapshot`] groups every record
//! of one snapshot date and keys them by [`SnapshotKey`], so a record set can
//! never hold two values for the same `(stay_date, room_type)`.

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::room_type::RoomType;

/// Largest room-night count a single record may hold (the SQLite column is a
/// signed 32-bit integer).
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// One persisted observation. Natural key: `(stay_date, room_type, snapshot_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    /// Night the reservation count applies to.
    pub stay_date: NaiveDate,
    pub room_type: RoomType,
    /// Booked units as observed at capture time.
    pub quantity: u32,
    /// Day the data was captured (not the upload time).
    pub snapshot_date: NaiveDate,
}

impl SnapshotRecord {
    #[must_use]
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.stay_date, self.room_type.clone())
    }
}

/// Key of a record within one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SnapshotKey {
    pub stay_date: NaiveDate,
    pub room_type: RoomType,
}

impl SnapshotKey {
    #[must_use]
    pub fn new(stay_date: NaiveDate, room_type: RoomType) -> Self {
        Self {
            stay_date,
            room_type,
        }
    }
}

/// The full record set captured on one snapshot date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    date: NaiveDate,
    entries: BTreeMap<SnapshotKey, u32>,
}

impl Snapshot {
    /// Create an empty snapshot for a capture date.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: BTreeMap::new(),
        }
    }

    /// Collect the records of one snapshot date out of a mixed history.
    ///
    /// Records with a different `snapshot_date` are ignored. A repeated key
    /// keeps the last quantity seen.
    #[must_use]
    pub fn from_records<'a, I>(date: NaiveDate, records: I) -> Self
    where
        I: IntoIterator<Item = &'a SnapshotRecord>,
    {
        let mut snapshot = Self::new(date);
        for record in records.into_iter().filter(|r| r.snapshot_date == date) {
            snapshot.insert(record.stay_date, record.room_type.clone(), record.quantity);
        }
        snapshot
    }

    /// Insert or replace a cell. Returns the previous quantity, if any.
    pub fn insert(&mut self, stay_date: NaiveDate, room_type: RoomType, quantity: u32) -> Option<u32> {
        self.entries
            .insert(SnapshotKey::new(stay_date, room_type), quantity)
    }

    /// Capture date of this snapshot.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn quantity(&self, key: &SnapshotKey) -> Option<u32> {
        self.entries.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, quantity)` in `(stay_date, room_type)` order.
    pub fn entries(&self) -> btree_map::Iter<'_, SnapshotKey, u32> {
        self.entries.iter()
    }

    /// Iterate the keys present in this snapshot.
    pub fn keys(&self) -> btree_map::Keys<'_, SnapshotKey, u32> {
        self.entries.keys()
    }

    /// Materialize the long-format records of this snapshot.
    pub fn records(&self) -> impl Iterator<Item = SnapshotRecord> + '_ {
        self.entries.iter().map(move |(key, quantity)| SnapshotRecord {
            stay_date: key.stay_date,
            room_type: key.room_type.clone(),
            quantity: *quantity,
            snapshot_date: self.date,
        })
    }

    /// Units on the books per room type across all stay dates.
    #[must_use]
    pub fn totals_by_room_type(&self) -> BTreeMap<RoomType, u64> {
        let mut totals = BTreeMap::new();
        for (key, quantity) in &self.entries {
            *totals.entry(key.room_type.clone()).or_insert(0) += u64::from(*quantity);
        }
        totals
    }

    /// First and last stay date present, if any.
    #[must_use]
    pub fn stay_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.entries.keys().map(|k| k.stay_date).min()?;
        let last = self.entries.keys().map(|k| k.stay_date).max()?;
        Some((first, last))
    }
}

/// Sort records the way every store returns them:
/// `(snapshot_date, stay_date, room_type)` ascending.
pub fn sort_history(records: &mut [SnapshotRecord]) {
    records.sort_by(|a, b| {
        a.snapshot_date
            .cmp(&b.snapshot_date)
            .then_with(|| a.stay_date.cmp(&b.stay_date))
            .then_with(|| a.room_type.cmp(&b.room_type))
    });
}

/// Distinct snapshot dates in a history, ascending.
#[must_use]
pub fn snapshot_dates(records: &[SnapshotRecord]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.snapshot_date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rt(code: &str) -> RoomType {
        RoomType::try_new(code).unwrap()
    }

    fn record(stay: NaiveDate, code: &str, quantity: u32, snap: NaiveDate) -> SnapshotRecord {
        SnapshotRecord {
            stay_date: stay,
            room_type: rt(code),
            quantity,
            snapshot_date: snap,
        }
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut snapshot = Snapshot::new(date(2025, 1, 1));
        assert_eq!(snapshot.insert(date(2025, 8, 1), rt("N-4"), 3), None);
        assert_eq!(snapshot.insert(date(2025, 8, 1), rt("N-4"), 7), Some(3));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn from_records_keeps_only_matching_snapshot_date() {
        let snap = date(2025, 1, 1);
        let other = date(2025, 1, 2);
        let history = vec![
            record(date(2025, 8, 1), "N-4", 4, snap),
            record(date(2025, 8, 1), "N-4", 9, other),
            record(date(2025, 8, 2), "ST2", 1, snap),
        ];

        let snapshot = Snapshot::from_records(snap, &history);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.quantity(&SnapshotKey::new(date(2025, 8, 1), rt("N-4"))),
            Some(4)
        );
        assert!(snapshot.records().all(|r| r.snapshot_date == snap));
    }

    #[test]
    fn totals_sum_across_stay_dates() {
        let mut snapshot = Snapshot::new(date(2025, 1, 1));
        snapshot.insert(date(2025, 8, 1), rt("N-4"), 4);
        snapshot.insert(date(2025, 8, 2), rt("N-4"), 6);
        snapshot.insert(date(2025, 8, 2), rt("ST2"), 1);

        let totals = snapshot.totals_by_room_type();
        assert_eq!(totals[&rt("N-4")], 10);
        assert_eq!(totals[&rt("ST2")], 1);
        assert_eq!(snapshot.stay_span(), Some((date(2025, 8, 1), date(2025, 8, 2))));
    }

    #[test]
    fn history_sorts_by_snapshot_then_stay_then_room() {
        let mut history = vec![
            record(date(2025, 8, 2), "N-4", 1, date(2025, 1, 10)),
            record(date(2025, 8, 1), "ST2", 1, date(2025, 1, 1)),
            record(date(2025, 8, 1), "N-4", 1, date(2025, 1, 1)),
        ];
        sort_history(&mut history);

        assert_eq!(history[0].room_type, rt("N-4"));
        assert_eq!(history[1].room_type, rt("ST2"));
        assert_eq!(history[2].snapshot_date, date(2025, 1, 10));
        assert_eq!(
            snapshot_dates(&history),
            vec![date(2025, 1, 1), date(2025, 1, 10)]
        );
    }
}
