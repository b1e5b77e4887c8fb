//! Handler for the `curve` command.

use serde_json::{json, Value};
use tabled::{Table, Tabled};

use super::command::CurveArgs;
use super::context::Context;
use super::output;
use super::pickup::signed;
use crate::adapter::outbound::table::export;
use crate::application::booking::BookingService;
use crate::domain::capacity::CapacityModel;
use crate::domain::curve::{BookingCurve, CurveOutcome};
use crate::domain::error::DomainError;
use crate::domain::range::StayRange;
use crate::domain::room_type::RoomType;
use crate::error::{ConfigError, Result};

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "Snapshot")]
    snapshot_date: String,
    #[tabled(rename = "On the books")]
    quantity: u64,
    #[tabled(rename = "Pick-up")]
    pickup: String,
}

/// Configured room type, or an ad-hoc one for codes only found in history.
fn room_type(capacity: &CapacityModel, code: &str) -> Result<RoomType> {
    match capacity.resolve(code) {
        Ok(room_type) => Ok(room_type),
        Err(DomainError::UnknownRoomType { .. }) => {
            output::warning(&format!(
                "room type '{code}' has no configured capacity, occupancy is not available"
            ));
            Ok(RoomType::try_new(code)?)
        }
        Err(e) => Err(e.into()),
    }
}

fn curve_json(room_type: &RoomType, outcome: &CurveOutcome, capacity: &CapacityModel) -> Value {
    let Some(curve) = outcome.curve() else {
        return json!({
            "room_type": room_type,
            "status": "no_data_in_range",
        });
    };
    let units = capacity.capacity(room_type);
    let points: Vec<Value> = curve
        .pickups()
        .into_iter()
        .map(|(point, pickup)| {
            json!({
                "snapshot_date": point.snapshot_date,
                "quantity": point.quantity,
                "pickup": pickup,
            })
        })
        .collect();
    json!({
        "room_type": room_type,
        "status": "ok",
        "points": points,
        "current": curve.current(),
        "capacity": units,
        "occupancy_pct": units.and_then(|u| curve.occupancy_pct(u)),
    })
}

fn show_curve(curve: &BookingCurve, capacity: Option<u32>) {
    let rows: Vec<CurveRow> = curve
        .pickups()
        .into_iter()
        .map(|(point, pickup)| CurveRow {
            snapshot_date: point.snapshot_date.to_string(),
            quantity: point.quantity,
            pickup: pickup.map_or_else(|| "-".to_string(), signed),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    let current = curve.current();
    output::field(
        "On the books",
        format!("{} (as of {})", current.quantity, current.snapshot_date),
    );
    match capacity.and_then(|units| curve.occupancy_pct(units).map(|pct| (units, pct))) {
        Some((units, pct)) => {
            let nights = curve.range.days();
            let available = u64::from(units) * u64::from(nights);
            output::field(
                "Available",
                format!("{available} ({units} units x {nights} nights)"),
            );
            output::field("Occupancy", output::highlight(format!("{pct:.1}%")));
        }
        None => output::field("Occupancy", output::muted("n/a")),
    }
}

/// Execute `curve`.
pub fn execute(ctx: &Context, args: &CurveArgs) -> Result<()> {
    let range = StayRange::try_new(args.from, args.to)?;
    let store = ctx.store()?;
    let service = BookingService::new(store.as_ref(), ctx.capacity());

    let curves = if args.all {
        service.curves(&range)?
    } else {
        let code = args
            .room_type
            .as_deref()
            .ok_or(ConfigError::MissingField { field: "room_type" })?;
        let room_type = room_type(ctx.capacity(), code)?;
        let outcome = service.curve(&room_type, &range)?;
        vec![(room_type, outcome)]
    };

    if let Some(path) = &args.output {
        export::to_file(path, |file| export::write_curves(&curves, ctx.capacity(), file))?;
    }

    if output::is_json() {
        let payload: Vec<Value> = curves
            .iter()
            .map(|(rt, outcome)| curve_json(rt, outcome, ctx.capacity()))
            .collect();
        output::json_output(json!({
            "command": "curve",
            "range": range,
            "curves": payload,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    for (room_type, outcome) in &curves {
        output::section(&format!("{room_type}  {range}"));
        match outcome {
            CurveOutcome::NoDataInRange => {
                output::warning(&format!("no stored bookings for {room_type} in {range}"));
            }
            CurveOutcome::Curve(curve) => show_curve(curve, ctx.capacity().capacity(room_type)),
        }
    }
    if curves.iter().all(|(_, outcome)| outcome.curve().is_none()) {
        output::hint("check the stay dates or run `revpace snapshots` to see what is stored");
    }
    if let Some(path) = &args.output {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curve::booking_curve;
    use crate::domain::snapshot::SnapshotRecord;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn json_reports_occupancy_against_capacity() {
        let n4 = RoomType::try_new("N-4").unwrap();
        let history = vec![
            SnapshotRecord {
                stay_date: date(2025, 8, 1),
                room_type: n4.clone(),
                quantity: 50,
                snapshot_date: date(2025, 1, 1),
            },
            SnapshotRecord {
                stay_date: date(2025, 8, 1),
                room_type: n4.clone(),
                quantity: 100,
                snapshot_date: date(2025, 1, 10),
            },
        ];
        let range = StayRange::try_new(date(2025, 8, 1), date(2025, 8, 5)).unwrap();
        let outcome = booking_curve(&history, &n4, &range);

        let value = curve_json(&n4, &outcome, &CapacityModel::default());
        assert_eq!(value["status"], "ok");
        assert_eq!(value["points"][1]["pickup"], 50);
        let pct = value["occupancy_pct"].as_f64().unwrap();
        assert!((pct - 66.666).abs() < 0.01);
    }

    #[test]
    fn empty_outcome_is_flagged() {
        let n4 = RoomType::try_new("N-4").unwrap();
        let value = curve_json(&n4, &CurveOutcome::NoDataInRange, &CapacityModel::default());
        assert_eq!(value["status"], "no_data_in_range");
    }
}
