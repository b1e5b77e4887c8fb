//! Booking use cases over a snapshot store.
//!
//! A [`BookingService`] is built per user action around the store it works
//! on. It holds no state of its own between calls; everything persistent goes
//! through the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::ingest::NormalizedUpload;
use crate::domain::capacity::CapacityModel;
use crate::domain::curve::{booking_curve, booking_curves, CurveOutcome};
use crate::domain::error::DomainError;
use crate::domain::pickup::{pickup, PickUp};
use crate::domain::range::StayRange;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::{Snapshot, SnapshotRecord};
use crate::error::Result;
use crate::port::outbound::store::SnapshotStore;

/// What committing an upload would do.
#[derive(Debug, Clone)]
pub struct UploadPreview {
    pub upload: NormalizedUpload,
    /// Comparison against the latest stored snapshot older than the upload.
    pub pickup: PickUp,
    /// Records already stored under the upload's snapshot date.
    pub replaces: usize,
}

impl UploadPreview {
    #[must_use]
    pub fn snapshot_date(&self) -> NaiveDate {
        self.upload.snapshot.date()
    }
}

/// Per-date summary of the stored history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub date: NaiveDate,
    pub records: usize,
    pub first_stay: Option<NaiveDate>,
    pub last_stay: Option<NaiveDate>,
    /// Room-nights on the books per room type.
    pub totals: BTreeMap<RoomType, u64>,
}

impl SnapshotSummary {
    fn of(snapshot: &Snapshot) -> Self {
        let span = snapshot.stay_span();
        Self {
            date: snapshot.date(),
            records: snapshot.len(),
            first_stay: span.map(|(first, _)| first),
            last_stay: span.map(|(_, last)| last),
            totals: snapshot.totals_by_room_type(),
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.totals.values().sum()
    }
}

pub struct BookingService<'a, S: SnapshotStore + ?Sized> {
    store: &'a S,
    capacity: &'a CapacityModel,
}

impl<'a, S: SnapshotStore + ?Sized> BookingService<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, capacity: &'a CapacityModel) -> Self {
        Self { store, capacity }
    }

    #[must_use]
    pub fn capacity(&self) -> &CapacityModel {
        self.capacity
    }

    /// Compare an upload with the stored baseline without writing anything.
    ///
    /// The baseline is the latest snapshot strictly older than the upload's
    /// date, so re-uploading a corrected file for an already stored date
    /// still compares against the day before rather than against itself.
    pub fn preview(&self, upload: NormalizedUpload) -> Result<UploadPreview> {
        let date = upload.snapshot.date();
        let baseline = self
            .store
            .read_latest_before(date)?
            .unwrap_or_else(|| Snapshot::new(date));
        let replaces = self.store.read_snapshot(date)?.map_or(0, |s| s.len());

        debug!(
            snapshot_date = %date,
            baseline = %baseline.date(),
            replaces,
            "upload previewed"
        );
        Ok(UploadPreview {
            pickup: pickup(&upload.snapshot, &baseline),
            upload,
            replaces,
        })
    }

    /// Persist a previewed upload, replacing any snapshot with the same date.
    pub fn commit(&self, preview: &UploadPreview) -> Result<usize> {
        let written = self.store.write(&preview.upload.snapshot)?;
        info!(
            snapshot_date = %preview.snapshot_date(),
            records = written,
            replaced = preview.replaces,
            store = %self.store.describe(),
            "snapshot stored"
        );
        Ok(written)
    }

    /// Pick-up between the two most recent stored snapshots.
    pub fn compare_latest(&self) -> Result<PickUp> {
        let dates = self.store.snapshot_dates()?;
        let [.., previous, latest] = dates.as_slice() else {
            return Ok(PickUp::NoPriorData);
        };
        self.compare(*previous, *latest)
    }

    /// Pick-up between two stored snapshot dates (`to - from`).
    pub fn compare(&self, from: NaiveDate, to: NaiveDate) -> Result<PickUp> {
        let old = self
            .store
            .read_snapshot(from)?
            .ok_or(DomainError::SnapshotNotFound { date: from })?;
        let new = self
            .store
            .read_snapshot(to)?
            .ok_or(DomainError::SnapshotNotFound { date: to })?;
        Ok(pickup(&new, &old))
    }

    /// Booking curve for one room type.
    pub fn curve(&self, room_type: &RoomType, range: &StayRange) -> Result<CurveOutcome> {
        let history = self.store.read_all()?;
        Ok(booking_curve(&history, room_type, range))
    }

    /// Booking curves for every configured room type.
    pub fn curves(&self, range: &StayRange) -> Result<Vec<(RoomType, CurveOutcome)>> {
        let history = self.store.read_all()?;
        Ok(booking_curves(&history, range, self.capacity))
    }

    /// One summary per stored snapshot date, ascending.
    pub fn summaries(&self) -> Result<Vec<SnapshotSummary>> {
        let history: Vec<SnapshotRecord> = self.store.read_all()?;
        let dates = crate::domain::snapshot::snapshot_dates(&history);
        Ok(dates
            .into_iter()
            .map(|date| SnapshotSummary::of(&Snapshot::from_records(date, &history)))
            .collect())
    }
}
