//! Daily price/occupancy history tables.
//!
//! Used by the price forecast and the annual KPI report. Cells come from
//! hand-maintained spreadsheets and may carry currency or percent signs and a
//! decimal comma.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::columns::{OCCUPANCY, PRICE, STAY_DATE};
use super::ingest::parse_stay_date;
use super::table::Table;
use crate::domain::forecast::DailyObservation;
use crate::error::SchemaError;

/// Observations read from one table, plus how many rows were unusable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyHistory {
    pub observations: Vec<DailyObservation>,
    /// Rows without a readable date.
    pub dropped_rows: usize,
    /// Rows kept with a readable date but no readable price.
    pub priceless_rows: usize,
}

/// Strip currency, percent and blanks, and turn a decimal comma into a point.
///
/// `1.234,50` reads as `1234.50`; `95,5` as `95.5`.
#[must_use]
pub fn clean_number(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '€' | '%' | '$') && !c.is_whitespace())
        .collect();
    if stripped.contains(',') && stripped.contains('.') {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped.replace(',', ".")
    }
}

/// Parse a money cell.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parse an occupancy cell (percent or fraction, as written).
#[must_use]
pub fn parse_ratio(raw: &str) -> Option<f64> {
    let cleaned = clean_number(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a daily history table.
///
/// Date, price and occupancy columns are all required. Rows without a
/// readable date are dropped. An unreadable price or occupancy leaves that
/// value empty, so each report can skip it where it would skew a mean.
///
/// # Errors
/// [`SchemaError::MissingColumn`] when any of the three columns is absent.
pub fn read_daily(table: &Table) -> Result<DailyHistory, SchemaError> {
    let date_idx = table.require(&STAY_DATE)?;
    let price_idx = table.require(&PRICE)?;
    let occ_idx = table.require(&OCCUPANCY)?;

    let mut history = DailyHistory::default();
    for row in 0..table.rows.len() {
        if table.is_blank_row(row) {
            continue;
        }
        let line = Table::line_of(row);
        let Ok(date) = parse_stay_date(table.cell(row, date_idx)) else {
            warn!(line, "daily row dropped");
            history.dropped_rows += 1;
            continue;
        };
        let price = parse_price(table.cell(row, price_idx));
        if price.is_none() {
            debug!(line, %date, "no readable price");
            history.priceless_rows += 1;
        }

        history.observations.push(DailyObservation {
            date,
            price,
            occupancy: parse_ratio(table.cell(row, occ_idx)),
        });
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
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
    fn cleans_spreadsheet_numbers() {
        assert_eq!(clean_number("1.234,50 €"), "1234.50");
        assert_eq!(clean_number("95,5%"), "95.5");
        assert_eq!(parse_price("€ 80"), Some(dec!(80)));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_ratio("87 %"), Some(87.0));
        assert_eq!(parse_ratio("n/a"), None);
    }

    #[test]
    fn reads_rows_through_synonyms() {
        let t = table(
            &["Date", "ADR", "% Ocupacion"],
            &[
                &["2025-07-01", "80,5 €", "90%"],
                &["bad", "10", "1"],
                &["2025-07-02", "", "50"],
                &["2025-07-03", "70", "?"],
            ],
        );
        let history = read_daily(&t).unwrap();

        assert_eq!(history.observations.len(), 3);
        assert_eq!(history.dropped_rows, 1);
        assert_eq!(history.priceless_rows, 1);
        assert_eq!(
            history.observations[0],
            DailyObservation {
                date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                price: Some(dec!(80.5)),
                occupancy: Some(90.0),
            }
        );
        assert_eq!(history.observations[1].price, None);
        assert_eq!(history.observations[1].occupancy, Some(50.0));
        assert_eq!(history.observations[2].occupancy, None);
    }

    #[test]
    fn occupancy_column_is_required() {
        let t = table(&["fecha", "precio"], &[&["2025-07-01", "80"]]);
        assert!(matches!(
            read_daily(&t),
            Err(SchemaError::MissingColumn { column: "ocupacion", .. })
        ));
    }

    #[test]
    fn price_column_is_required() {
        let t = table(&["fecha", "ocupacion"], &[]);
        assert!(matches!(
            read_daily(&t),
            Err(SchemaError::MissingColumn { column: "precio", .. })
        ));
    }
}
