//! Handler for the `snapshots` command.

use serde_json::json;
use tabled::builder::Builder;

use super::context::Context;
use super::output;
use crate::application::booking::{BookingService, SnapshotSummary};
use crate::domain::capacity::CapacityModel;
use crate::error::Result;

fn summary_table(summaries: &[SnapshotSummary], capacity: &CapacityModel) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["Snapshot".to_string(), "Records".into(), "Stays".into()];
    header.extend(capacity.room_types().map(ToString::to_string));
    header.push("Total".into());
    builder.push_record(header);

    for summary in summaries {
        let stays = match (summary.first_stay, summary.last_stay) {
            (Some(first), Some(last)) => format!("{first} .. {last}"),
            _ => "-".to_string(),
        };
        let mut row = vec![summary.date.to_string(), summary.records.to_string(), stays];
        row.extend(
            capacity
                .room_types()
                .map(|rt| summary.totals.get(rt).copied().unwrap_or(0).to_string()),
        );
        row.push(summary.total().to_string());
        builder.push_record(row);
    }
    builder.build().to_string()
}

/// Execute `snapshots`.
pub fn execute(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let service = BookingService::new(store.as_ref(), ctx.capacity());
    let summaries = service.summaries()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "snapshots",
            "store": store.describe(),
            "snapshots": summaries,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Stored snapshots");
    output::field("Store", store.describe());
    if summaries.is_empty() {
        output::note("(none)");
        output::hint("store one with `revpace import <export.csv>`");
        return Ok(());
    }
    output::lines(&summary_table(&summaries, ctx.capacity()));
    output::field("Snapshots", summaries.len());
    Ok(())
}
