//! Reservation exports aggregated by arrival month.

use tracing::warn;

use super::columns::{MONTH, RESERVATIONS, REVENUE, YEAR};
use super::daily::{clean_number, parse_price};
use super::table::Table;
use crate::domain::pace::PaceRow;
use crate::error::SchemaError;

fn parse_whole(raw: &str) -> Option<i64> {
    let cleaned = clean_number(raw);
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    let float: f64 = cleaned.parse().ok()?;
    (float.is_finite() && float.fract() == 0.0).then_some(float as i64)
}

/// Read `(year, month, reservations, revenue)` rows.
///
/// `anio`, `mes` and `Total_Dep` are required, `Reservas` defaults to 0.
/// Rows without a usable year or month are dropped; an unreadable revenue
/// counts as zero.
///
/// # Errors
/// [`SchemaError::MissingColumn`] for a missing required column.
pub fn read_pace_rows(table: &Table) -> Result<Vec<PaceRow>, SchemaError> {
    let year_idx = table.require(&YEAR)?;
    let month_idx = table.require(&MONTH)?;
    let revenue_idx = table.require(&REVENUE)?;
    let reservations_idx = RESERVATIONS.locate(&table.headers);

    let mut rows = Vec::new();
    for row in 0..table.rows.len() {
        if table.is_blank_row(row) {
            continue;
        }
        let year = parse_whole(table.cell(row, year_idx)).and_then(|y| i32::try_from(y).ok());
        let month = parse_whole(table.cell(row, month_idx))
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m));
        let (Some(year), Some(month)) = (year, month) else {
            warn!(line = Table::line_of(row), "pace row dropped");
            continue;
        };

        let reservations = reservations_idx
            .and_then(|idx| parse_whole(table.cell(row, idx)))
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);
        let revenue = parse_price(table.cell(row, revenue_idx)).unwrap_or_default();

        rows.push(PaceRow {
            year,
            month,
            reservations,
            revenue,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| (*s).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| (*s).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn reads_rows_and_defaults_reservations() {
        let t = table(
            &["anio", "mes", "Total_Dep"],
            &[&["2025", "8", "1.200,50"], &["2025.0", "7.0", "300"], &["", "7", "1"]],
        );
        let rows = read_pace_rows(&t).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].revenue, dec!(1200.50));
        assert_eq!(rows[0].reservations, 0);
        assert_eq!(rows[1].month, 7);
    }

    #[test]
    fn out_of_range_months_are_dropped() {
        let t = table(
            &["anio", "mes", "Total_Dep", "Reservas"],
            &[&["2025", "13", "10", "1"], &["2025", "1", "10", "3"]],
        );
        let rows = read_pace_rows(&t).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reservations, 3);
    }

    #[test]
    fn revenue_column_is_required() {
        let t = table(&["anio", "mes", "Reservas"], &[]);
        assert!(matches!(
            read_pace_rows(&t),
            Err(SchemaError::MissingColumn { column: "Total_Dep", .. })
        ));
    }
}
