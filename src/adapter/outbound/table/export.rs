//! CSV export of computed views.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::capacity::CapacityModel;
use crate::domain::curve::CurveOutcome;
use crate::domain::forecast::Forecast;
use crate::domain::kpi::KpiReport;
use crate::domain::pace::PaceSeries;
use crate::domain::pickup::PickUpReport;
use crate::domain::room_type::RoomType;
use crate::domain::snapshot::Snapshot;
use crate::error::Result;

#[derive(Serialize)]
struct PickUpCsvRow<'a> {
    stay_date: NaiveDate,
    room_type: &'a str,
    old_quantity: u32,
    new_quantity: u32,
    delta: i64,
}

#[derive(Serialize)]
struct CurveCsvRow<'a> {
    room_type: &'a str,
    snapshot_date: NaiveDate,
    quantity: u64,
    change: Option<i64>,
    occupancy_pct: Option<String>,
}

#[derive(Serialize)]
struct ForecastCsvRow<'a> {
    date: NaiveDate,
    weekday: &'a str,
    base_adr: Decimal,
    occupancy_pct: f64,
    recommended_price: Decimal,
    strategy: &'static str,
}

#[derive(Serialize)]
struct PaceCsvRow {
    year: i32,
    month: &'static str,
    reservations: u64,
    revenue: Decimal,
}

const PICKUP_LABELS: &[&str] = &["Stay date", "Room type", "Before", "Now", "Pick-up"];
const CURVE_LABELS: &[&str] = &[
    "Room type",
    "Snapshot date",
    "Room-nights",
    "Change",
    "Occupancy %",
];
const FORECAST_LABELS: &[&str] = &[
    "Date",
    "Day",
    "Base ADR",
    "Historical occupancy %",
    "Recommended price",
    "Strategy",
];
const PACE_LABELS: &[&str] = &["Year", "Month", "Reservations", "Revenue"];

/// Writer whose header row is already written, even if no row follows.
fn labelled<W: Write>(out: W, labels: &[&str]) -> Result<csv::Writer<W>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(labels)?;
    Ok(writer)
}

/// Create `path` and hand a writer to `write`.
pub fn to_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let mut file = File::create(path)?;
    write(&mut file)?;
    file.flush()?;
    Ok(())
}

/// One line per changed key, or per key with `all`.
pub fn write_pickup<W: Write>(report: &PickUpReport, all: bool, out: W) -> Result<()> {
    let mut writer = labelled(out, PICKUP_LABELS)?;
    for entry in report.entries().iter().filter(|e| all || e.delta != 0) {
        writer.serialize(PickUpCsvRow {
            stay_date: entry.stay_date,
            room_type: entry.room_type.as_str(),
            old_quantity: entry.old_quantity,
            new_quantity: entry.new_quantity,
            delta: entry.delta,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Long format: one line per curve point. Occupancy is filled on the current point only.
pub fn write_curves<W: Write>(
    curves: &[(RoomType, CurveOutcome)],
    capacity: &CapacityModel,
    out: W,
) -> Result<()> {
    let mut writer = labelled(out, CURVE_LABELS)?;
    for (room_type, outcome) in curves {
        let Some(curve) = outcome.curve() else {
            continue;
        };
        let current = curve.current().snapshot_date;
        let occupancy = capacity
            .capacity(room_type)
            .and_then(|c| curve.occupancy_pct(c))
            .map(|pct| format!("{pct:.1}"));

        for (point, change) in curve.pickups() {
            writer.serialize(CurveCsvRow {
                room_type: room_type.as_str(),
                snapshot_date: point.snapshot_date,
                quantity: point.quantity,
                change,
                occupancy_pct: (point.snapshot_date == current)
                    .then(|| occupancy.clone())
                    .flatten(),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_forecast<W: Write>(forecast: &Forecast, out: W) -> Result<()> {
    let mut writer = labelled(out, FORECAST_LABELS)?;
    for row in &forecast.rows {
        writer.serialize(ForecastCsvRow {
            date: row.date,
            weekday: &row.weekday,
            base_adr: row.base_adr,
            occupancy_pct: row.historical_occupancy_pct,
            recommended_price: row.recommended_price,
            strategy: row.strategy.label(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Month-by-month comparison matrix, one column group per year.
pub fn write_kpi<W: Write>(report: &KpiReport, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Month".to_string()];
    for year in &report.years {
        header.push(format!("Occupancy % {}", year.year));
        header.push(format!("ADR {}", year.year));
        header.push(format!("RevPAR {}", year.year));
    }
    header.push("Season".to_string());
    writer.write_record(&header)?;

    for row in report.comparison() {
        let mut record = vec![crate::domain::pace::month_label(row.month)
            .unwrap_or_default()
            .to_string()];
        for year in &report.years {
            match row.by_year.get(&year.year) {
                Some(m) => {
                    record.push(format!("{:.1}", m.occupancy_pct));
                    record.push(m.adr.to_string());
                    record.push(m.revpar.to_string());
                }
                None => record.extend(std::iter::repeat(String::new()).take(3)),
            }
        }
        let season = if row.high_season {
            "high"
        } else if row.low_season {
            "low"
        } else {
            ""
        };
        record.push(season.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_pace<W: Write>(series: &[PaceSeries], out: W) -> Result<()> {
    let mut writer = labelled(out, PACE_LABELS)?;
    for s in series {
        for point in &s.points {
            writer.serialize(PaceCsvRow {
                year: s.year,
                month: point.label,
                reservations: point.reservations,
                revenue: point.revenue,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Wide layout of one snapshot: `fecha` plus one column per room type.
///
/// Cells without a record stay empty, so reading the file back yields the
/// same record set.
pub fn write_wide_snapshot<W: Write>(
    snapshot: &Snapshot,
    room_types: &[RoomType],
    out: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["fecha".to_string()];
    header.extend(room_types.iter().map(ToString::to_string));
    writer.write_record(&header)?;

    let mut rows: std::collections::BTreeMap<NaiveDate, Vec<String>> =
        std::collections::BTreeMap::new();
    for (key, quantity) in snapshot.entries() {
        let Some(col) = room_types.iter().position(|rt| *rt == key.room_type) else {
            continue;
        };
        let row = rows
            .entry(key.stay_date)
            .or_insert_with(|| vec![String::new(); room_types.len()]);
        row[col] = quantity.to_string();
    }

    for (stay_date, cells) in rows {
        let mut record = vec![stay_date.format("%Y-%m-%d").to_string()];
        record.extend(cells);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
