//! Handler for the `pickup` command.

use serde_json::{json, Value};
use tabled::{Table, Tabled};

use super::command::PickupArgs;
use super::context::Context;
use super::import::load_upload;
use super::output;
use crate::adapter::outbound::table::export;
use crate::application::booking::BookingService;
use crate::domain::pickup::{PickUp, PickUpReport};
use crate::error::Result;

#[derive(Tabled)]
struct PickUpRow {
    #[tabled(rename = "Stay date")]
    stay_date: String,
    #[tabled(rename = "Room type")]
    room_type: String,
    #[tabled(rename = "Before")]
    before: u32,
    #[tabled(rename = "Now")]
    now: u32,
    #[tabled(rename = "Pick-up")]
    pickup: String,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Room type")]
    room_type: String,
    #[tabled(rename = "Pick-up")]
    pickup: String,
}

/// `+3`, `-2`, `0`.
pub(super) fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Print a pick-up report: changed (or all) entries, then per-room-type totals.
pub(super) fn show_report(report: &PickUpReport, all: bool) {
    output::field("Baseline", report.baseline_date);
    output::field("Current", report.current_date);

    let rows: Vec<PickUpRow> = report
        .entries()
        .iter()
        .filter(|e| all || e.delta != 0)
        .map(|e| PickUpRow {
            stay_date: e.stay_date.to_string(),
            room_type: e.room_type.to_string(),
            before: e.old_quantity,
            now: e.new_quantity,
            pickup: signed(e.delta),
        })
        .collect();
    if rows.is_empty() {
        output::note("no changes between the two snapshots");
        return;
    }
    output::lines(&Table::new(rows).to_string());

    let totals: Vec<TotalRow> = report
        .totals_by_room_type()
        .into_iter()
        .map(|(room_type, delta)| TotalRow {
            room_type: room_type.to_string(),
            pickup: signed(delta),
        })
        .collect();
    output::section("Totals by room type");
    output::lines(&Table::new(totals).to_string());
    output::field("Net pick-up", output::delta(report.grand_total()));
}

/// JSON form of a pick-up outcome.
pub(super) fn pickup_json(pickup: &PickUp, all: bool) -> Value {
    let Some(report) = pickup.report() else {
        return json!({ "status": "no_prior_data" });
    };
    let entries: Vec<_> = report
        .entries()
        .iter()
        .filter(|e| all || e.delta != 0)
        .collect();
    json!({
        "status": "compared",
        "baseline_date": report.baseline_date,
        "current_date": report.current_date,
        "entries": entries,
        "totals": report.totals_by_room_type(),
        "grand_total": report.grand_total(),
    })
}

/// Execute `pickup`.
pub fn execute(ctx: &Context, args: &PickupArgs) -> Result<()> {
    let store = ctx.store()?;
    let service = BookingService::new(store.as_ref(), ctx.capacity());

    let outcome = if let Some(file) = &args.file {
        let (upload, resolved) = load_upload(file, args.date, ctx.capacity())?;
        if let Some(warning) = resolved.warning {
            output::warning(&format!("{warning} ({})", resolved.date));
        }
        service.preview(upload)?.pickup
    } else if let (Some(from), Some(to)) = (args.from, args.to) {
        service.compare(from, to)?
    } else {
        service.compare_latest()?
    };

    let outcome = match (outcome, &args.room_type) {
        (PickUp::Compared(report), Some(code)) => {
            let room_type = ctx.capacity().resolve(code)?;
            PickUp::Compared(report.for_room_type(&room_type))
        }
        (outcome, _) => outcome,
    };

    if let (Some(path), Some(report)) = (&args.output, outcome.report()) {
        export::to_file(path, |file| export::write_pickup(report, args.all, file))?;
    }

    if output::is_json() {
        let mut payload = pickup_json(&outcome, args.all);
        payload["command"] = json!("pickup");
        output::json_output(payload);
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Pick-up");
    match &outcome {
        PickUp::NoPriorData => {
            output::warning("no earlier snapshot to compare against");
            output::hint("import at least two snapshots, e.g. `revpace import export_2025-01-10.csv`");
        }
        PickUp::Compared(report) => show_report(report, args.all),
    }
    if let (Some(path), Some(_)) = (&args.output, outcome.report()) {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
