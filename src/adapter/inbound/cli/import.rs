//! Handler for the `import` command.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{Local, NaiveDate};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::command::ImportArgs;
use super::context::Context;
use super::output;
use super::pickup::{pickup_json, show_report};
use crate::adapter::outbound::memory::MemorySnapshotStore;
use crate::adapter::outbound::table::reader::read_table_file;
use crate::application::booking::{BookingService, UploadPreview};
use crate::application::ingest::{
    normalize, resolve_snapshot_date, NormalizedUpload, ResolvedSnapshotDate,
};
use crate::domain::capacity::CapacityModel;
use crate::domain::pickup::PickUp;
use crate::error::{ConfigError, Result};
use crate::port::outbound::store::SnapshotStore;

/// Problems listed individually before the rest is summarised.
const LISTED_PROBLEMS: usize = 5;

/// Read and normalize one export, deciding its snapshot date.
pub(super) fn load_upload(
    path: &Path,
    explicit: Option<NaiveDate>,
    capacity: &CapacityModel,
) -> Result<(NormalizedUpload, ResolvedSnapshotDate)> {
    let resolved = resolve_snapshot_date(explicit, path, Local::now().date_naive());
    let table = read_table_file(path)?;
    let upload = normalize(&table, resolved.date, capacity)?;
    Ok((upload, resolved))
}

fn report_losses(upload: &NormalizedUpload) {
    if !upload.dropped_rows.is_empty() {
        output::warning(&format!(
            "{} row(s) dropped for an unreadable stay date",
            upload.dropped_rows.len()
        ));
        for row in upload.dropped_rows.iter().take(LISTED_PROBLEMS) {
            output::note(&format!("line {}: {}", row.line, row.error));
        }
    }
    if !upload.skipped_cells.is_empty() {
        output::warning(&format!(
            "{} cell(s) skipped for an unreadable quantity",
            upload.skipped_cells.len()
        ));
        for cell in upload.skipped_cells.iter().take(LISTED_PROBLEMS) {
            output::note(&format!(
                "line {} ({} {}): {}",
                cell.line, cell.stay_date, cell.room_type, cell.error
            ));
        }
    }
    let hidden = upload.dropped_rows.len().saturating_sub(LISTED_PROBLEMS)
        + upload.skipped_cells.len().saturating_sub(LISTED_PROBLEMS);
    if hidden > 0 {
        output::note(&format!("... and {hidden} more, run with -v for the full list"));
    }
    if upload.duplicate_rows > 0 {
        output::warning(&format!(
            "{} stay date(s) repeated, the later row was kept",
            upload.duplicate_rows
        ));
    }
    if !upload.ignored_columns.is_empty() {
        output::note(&format!(
            "ignored columns: {}",
            upload.ignored_columns.join(", ")
        ));
    }
}

fn confirm_store(preview: &UploadPreview, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if output::is_json() || !std::io::stdin().is_terminal() {
        output::warning("not stored: pass --yes to store without a prompt");
        return Ok(false);
    }
    let prompt = if preview.replaces > 0 {
        format!(
            "Replace the {} records stored for {}?",
            preview.replaces,
            preview.snapshot_date()
        )
    } else {
        format!("Store snapshot {}?", preview.snapshot_date())
    };
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

fn file_json(
    path: &Path,
    resolved: &ResolvedSnapshotDate,
    preview: &UploadPreview,
    stored: bool,
) -> Value {
    let upload = &preview.upload;
    json!({
        "file": path.display().to_string(),
        "snapshot_date": resolved.date,
        "date_source": resolved.source,
        "date_warning": resolved.warning.map(|w| w.to_string()),
        "records": upload.snapshot.len(),
        "room_types": upload.room_types,
        "ignored_columns": upload.ignored_columns,
        "dropped_rows": upload.dropped_rows,
        "skipped_cells": upload.skipped_cells,
        "duplicate_rows": upload.duplicate_rows,
        "replaces": preview.replaces,
        "pickup": pickup_json(&preview.pickup, false),
        "stored": stored,
    })
}

fn import_file<S: SnapshotStore + ?Sized>(
    service: &BookingService<'_, S>,
    path: &Path,
    args: &ImportArgs,
) -> Result<Value> {
    let pb = output::spinner(&format!("Reading {}", path.display()));
    let (upload, resolved) = match load_upload(path, args.date, service.capacity()) {
        Ok(loaded) => loaded,
        Err(e) => {
            output::spinner_fail(&pb, &format!("{}: {e}", path.display()));
            return Err(e);
        }
    };
    output::spinner_success(
        &pb,
        &format!(
            "{}: {} records for snapshot {}",
            path.display(),
            upload.snapshot.len(),
            resolved.date
        ),
    );
    if let Some(warning) = resolved.warning {
        warn!(file = %path.display(), snapshot_date = %resolved.date, "snapshot date guessed");
        output::warning(&format!("{warning} ({})", resolved.date));
    }
    report_losses(&upload);

    let preview = service.preview(upload)?;
    if preview.replaces > 0 {
        output::warning(&format!(
            "{} records already stored for {} will be replaced",
            preview.replaces,
            preview.snapshot_date()
        ));
    }
    if !output::is_json() {
        match &preview.pickup {
            PickUp::NoPriorData => output::note("first snapshot, nothing to compare against yet"),
            PickUp::Compared(report) => show_report(report, false),
        }
    }

    let stored = args.dry_run || confirm_store(&preview, args.yes)?;
    if stored {
        let written = service.commit(&preview)?;
        let verb = if args.dry_run { "Would store" } else { "Stored" };
        output::success(&format!(
            "{verb} {written} records for {}",
            preview.snapshot_date()
        ));
    } else {
        info!(snapshot_date = %preview.snapshot_date(), "upload not stored");
    }
    Ok(file_json(path, &resolved, &preview, stored))
}

/// Execute `import`.
pub fn execute(ctx: &Context, args: &ImportArgs) -> Result<()> {
    if args.date.is_some() && args.files.len() > 1 {
        return Err(ConfigError::InvalidValue {
            field: "date",
            reason: "--date applies to a single file".to_string(),
        }
        .into());
    }

    let store = ctx.store()?;
    let scratch = if args.dry_run {
        Some(MemorySnapshotStore::seeded_from(store.as_ref())?)
    } else {
        None
    };
    let target: &dyn SnapshotStore = match &scratch {
        Some(memory) => memory,
        None => store.as_ref(),
    };
    let service = BookingService::new(target, ctx.capacity());

    output::section(if args.dry_run { "Import (dry run)" } else { "Import" });
    output::field("Store", store.describe());

    let mut results = Vec::with_capacity(args.files.len());
    for path in &args.files {
        output::section(&path.display().to_string());
        results.push(import_file(&service, path, args)?);
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "import",
            "dry_run": args.dry_run,
            "store": store.describe(),
            "files": results,
        }));
    } else if args.dry_run {
        output::hint("dry run: nothing was written, drop --dry-run to store");
    }
    Ok(())
}
