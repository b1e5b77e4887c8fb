//! Booking pace: reservations and revenue per arrival month, compared across years.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Short month label used by the reservation exports (`Ene` .. `Dic`).
#[must_use]
pub fn month_label(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_LABELS.get(idx).copied()
}

/// One input row: a reservation export line already reduced to year, month and amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaceRow {
    pub year: i32,
    pub month: u32,
    pub reservations: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacePoint {
    pub month: u32,
    pub label: &'static str,
    pub reservations: u64,
    pub revenue: Decimal,
}

/// Per-year series, months ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaceSeries {
    pub year: i32,
    pub points: Vec<PacePoint>,
}

impl PaceSeries {
    #[must_use]
    pub fn total_reservations(&self) -> u64 {
        self.points.iter().map(|p| p.reservations).sum()
    }

    #[must_use]
    pub fn total_revenue(&self) -> Decimal {
        self.points.iter().map(|p| p.revenue).sum()
    }

    #[must_use]
    pub fn point(&self, month: u32) -> Option<&PacePoint> {
        self.points.iter().find(|p| p.month == month)
    }
}

/// Group rows by `(year, month)`, summing reservations and revenue.
///
/// Rows with a month outside `1..=12` are dropped.
#[must_use]
pub fn monthly_pace(rows: &[PaceRow]) -> Vec<PaceSeries> {
    let mut grouped: BTreeMap<i32, BTreeMap<u32, (u64, Decimal)>> = BTreeMap::new();
    for row in rows {
        if month_label(row.month).is_none() {
            continue;
        }
        let slot = grouped
            .entry(row.year)
            .or_default()
            .entry(row.month)
            .or_insert((0, Decimal::ZERO));
        slot.0 += row.reservations;
        slot.1 += row.revenue;
    }

    grouped
        .into_iter()
        .map(|(year, months)| PaceSeries {
            year,
            points: months
                .into_iter()
                .filter_map(|(month, (reservations, revenue))| {
                    Some(PacePoint {
                        month,
                        label: month_label(month)?,
                        reservations,
                        revenue,
                    })
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(year: i32, month: u32, reservations: u64, revenue: Decimal) -> PaceRow {
        PaceRow {
            year,
            month,
            reservations,
            revenue,
        }
    }

    #[test]
    fn labels_cover_the_calendar() {
        assert_eq!(month_label(1), Some("Ene"));
        assert_eq!(month_label(8), Some("Ago"));
        assert_eq!(month_label(12), Some("Dic"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }

    #[test]
    fn groups_and_sums_per_year_month() {
        let rows = vec![
            row(2025, 8, 3, dec!(300)),
            row(2024, 7, 1, dec!(90.5)),
            row(2025, 7, 2, dec!(150)),
            row(2025, 8, 1, dec!(120)),
            row(2025, 14, 9, dec!(1)),
        ];
        let series = monthly_pace(&rows);

        assert_eq!(series.iter().map(|s| s.year).collect::<Vec<_>>(), vec![2024, 2025]);
        let current = &series[1];
        assert_eq!(current.points.iter().map(|p| p.month).collect::<Vec<_>>(), vec![7, 8]);
        let august = current.point(8).unwrap();
        assert_eq!(august.reservations, 4);
        assert_eq!(august.revenue, dec!(420));
        assert_eq!(august.label, "Ago");
        assert_eq!(current.total_reservations(), 6);
        assert_eq!(current.total_revenue(), dec!(570));
    }
}
