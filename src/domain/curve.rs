//! Booking curve: how bookings for a fixed stay range built up across snapshots.
//!
//! Two values come out of a curve and they must not be confused:
//!
//! - the evolution series, one point per snapshot date, and
//! - the *current* figure, which is the point at the latest snapshot date only.
//!
//! Summing points across snapshots counts the same nights once per
//! observation and yields nonsense occupancy figures.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::capacity::CapacityModel;
use super::range::StayRange;
use super::room_type::RoomType;
use super::snapshot::SnapshotRecord;

/// Booked room-nights for the query range as observed on one snapshot date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingCurvePoint {
    pub snapshot_date: NaiveDate,
    pub quantity: u64,
}

/// Evolution series for one room type over one stay range.
///
/// Points are strictly ascending by snapshot date and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingCurve {
    pub room_type: RoomType,
    pub range: StayRange,
    points: Vec<BookingCurvePoint>,
}

/// Outcome of a curve query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveOutcome {
    /// No stored record matches the room type and range.
    NoDataInRange,
    Curve(BookingCurve),
}

impl CurveOutcome {
    #[must_use]
    pub fn curve(&self) -> Option<&BookingCurve> {
        match self {
            CurveOutcome::NoDataInRange => None,
            CurveOutcome::Curve(curve) => Some(curve),
        }
    }
}

/// Build the booking curve for `room_type` over `range` from the full history.
///
/// Filters by room type and inclusive stay range, sums quantities per
/// snapshot date, and orders points chronologically regardless of the order
/// of `history`.
#[must_use]
pub fn booking_curve(
    history: &[SnapshotRecord],
    room_type: &RoomType,
    range: &StayRange,
) -> CurveOutcome {
    let mut by_snapshot: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in history
        .iter()
        .filter(|r| &r.room_type == room_type && range.contains(r.stay_date))
    {
        *by_snapshot.entry(record.snapshot_date).or_insert(0) += u64::from(record.quantity);
    }

    if by_snapshot.is_empty() {
        return CurveOutcome::NoDataInRange;
    }

    let points = by_snapshot
        .into_iter()
        .map(|(snapshot_date, quantity)| BookingCurvePoint {
            snapshot_date,
            quantity,
        })
        .collect();

    CurveOutcome::Curve(BookingCurve {
        room_type: room_type.clone(),
        range: *range,
        points,
    })
}

/// One curve per configured room type, in room-type order.
#[must_use]
pub fn booking_curves(
    history: &[SnapshotRecord],
    range: &StayRange,
    capacity: &CapacityModel,
) -> Vec<(RoomType, CurveOutcome)> {
    capacity
        .room_types()
        .map(|rt| (rt.clone(), booking_curve(history, rt, range)))
        .collect()
}

impl BookingCurve {
    /// Points in ascending snapshot-date order.
    #[must_use]
    pub fn points(&self) -> &[BookingCurvePoint] {
        &self.points
    }

    /// Point at the most recent snapshot date: what is on the books now.
    #[must_use]
    pub fn current(&self) -> BookingCurvePoint {
        // Construction guarantees at least one point.
        self.points[self.points.len() - 1]
    }

    /// Room-nights on the books at the latest snapshot.
    #[must_use]
    pub fn current_quantity(&self) -> u64 {
        self.current().quantity
    }

    /// Current occupancy in percent: `current / (capacity * nights) * 100`.
    ///
    /// `None` when the capacity is zero.
    #[must_use]
    pub fn occupancy_pct(&self, capacity: u32) -> Option<f64> {
        let available = u64::from(capacity) * u64::from(self.range.days());
        if available == 0 {
            return None;
        }
        Some(self.current_quantity() as f64 / available as f64 * 100.0)
    }

    /// Quantity observed on a given snapshot date, if that date is on the curve.
    #[must_use]
    pub fn quantity_at(&self, snapshot_date: NaiveDate) -> Option<u64> {
        self.points
            .binary_search_by(|p| p.snapshot_date.cmp(&snapshot_date))
            .ok()
            .map(|idx| self.points[idx].quantity)
    }

    /// Pick-up between any two snapshot dates on the curve (`to - from`).
    #[must_use]
    pub fn change_between(&self, from: NaiveDate, to: NaiveDate) -> Option<i64> {
        let from = self.quantity_at(from)?;
        let to = self.quantity_at(to)?;
        Some(to as i64 - from as i64)
    }

    /// Change of each point relative to the previous one; `None` for the first.
    #[must_use]
    pub fn pickups(&self) -> Vec<(BookingCurvePoint, Option<i64>)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, point)| {
                let delta = idx
                    .checked_sub(1)
                    .map(|prev| point.quantity as i64 - self.points[prev].quantity as i64);
                (*point, delta)
            })
            .collect()
    }
}
