//! Pick-up: net change in booked units between two snapshots.
//!
//! The comparison is a full outer join on `(stay_date, room_type)`. A key
//! missing on one side counts as zero units there, so cancellations of a
//! whole stay date show up as negative pick-up.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::room_type::RoomType;
use super::snapshot::{Snapshot, SnapshotKey};

/// Change for one `(stay_date, room_type)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickUpEntry {
    pub stay_date: NaiveDate,
    pub room_type: RoomType,
    pub old_quantity: u32,
    pub new_quantity: u32,
    /// `new_quantity - old_quantity`.
    pub delta: i64,
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickUpReport {
    /// Snapshot date of the older side.
    pub baseline_date: NaiveDate,
    /// Snapshot date of the newer side.
    pub current_date: NaiveDate,
    entries: Vec<PickUpEntry>,
}

/// Outcome of a pick-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickUp {
    /// Nothing to compare against yet. Expected on first use.
    NoPriorData,
    Compared(PickUpReport),
}

impl PickUp {
    /// The report, if a comparison was possible.
    #[must_use]
    pub fn report(&self) -> Option<&PickUpReport> {
        match self {
            PickUp::NoPriorData => None,
            PickUp::Compared(report) => Some(report),
        }
    }
}

/// Compare `new` against `old`.
///
/// Returns [`PickUp::NoPriorData`] when `old` holds no records.
#[must_use]
pub fn pickup(new: &Snapshot, old: &Snapshot) -> PickUp {
    if old.is_empty() {
        return PickUp::NoPriorData;
    }

    let keys: BTreeSet<&SnapshotKey> = new.keys().chain(old.keys()).collect();
    let entries = keys
        .into_iter()
        .map(|key| {
            let new_quantity = new.quantity(key).unwrap_or(0);
            let old_quantity = old.quantity(key).unwrap_or(0);
            PickUpEntry {
                stay_date: key.stay_date,
                room_type: key.room_type.clone(),
                old_quantity,
                new_quantity,
                delta: i64::from(new_quantity) - i64::from(old_quantity),
            }
        })
        .collect();

    PickUp::Compared(PickUpReport {
        baseline_date: old.date(),
        current_date: new.date(),
        entries,
    })
}

impl PickUpReport {
    /// Every joined key, including unchanged ones, in `(stay_date, room_type)` order.
    #[must_use]
    pub fn entries(&self) -> &[PickUpEntry] {
        &self.entries
    }

    /// Keys whose quantity moved. What the CLI shows by default.
    pub fn changed(&self) -> impl Iterator<Item = &PickUpEntry> {
        self.entries.iter().filter(|e| e.delta != 0)
    }

    /// Delta for a key; zero when the key is in neither snapshot.
    #[must_use]
    pub fn delta(&self, key: &SnapshotKey) -> i64 {
        self.entries
            .binary_search_by(|e| {
                e.stay_date
                    .cmp(&key.stay_date)
                    .then_with(|| e.room_type.cmp(&key.room_type))
            })
            .map(|idx| self.entries[idx].delta)
            .unwrap_or(0)
    }

    /// Sum of deltas over all stay dates, per room type.
    #[must_use]
    pub fn totals_by_room_type(&self) -> BTreeMap<RoomType, i64> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.room_type.clone()).or_insert(0) += entry.delta;
        }
        totals
    }

    /// Sum over all room types.
    #[must_use]
    pub fn grand_total(&self) -> i64 {
        self.entries.iter().map(|e| e.delta).sum()
    }

    /// Restrict the report to one room type.
    #[must_use]
    pub fn for_room_type(&self, room_type: &RoomType) -> Self {
        Self {
            baseline_date: self.baseline_date,
            current_date: self.current_date,
            entries: self
                .entries
                .iter()
                .filter(|e| &e.room_type == room_type)
                .cloned()
                .collect(),
        }
    }
}
