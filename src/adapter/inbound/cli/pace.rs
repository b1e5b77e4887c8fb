//! Handler for the `pace` command.

use rust_decimal::Decimal;
use serde_json::json;
use tabled::builder::Builder;
use tracing::warn;

use super::command::ReportArgs;
use super::output;
use crate::adapter::outbound::table::{export, reader::read_table_file};
use crate::application::monthly::read_pace_rows;
use crate::domain::pace::{month_label, monthly_pace, PaceRow, PaceSeries};
use crate::error::{Error, Result};

fn pace_table(series: &[PaceSeries]) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["Month".to_string()];
    for s in series {
        header.push(format!("Reservas {}", s.year));
        header.push(format!("Revenue {}", s.year));
    }
    builder.push_record(header);

    for month in 1..=12 {
        if series.iter().all(|s| s.point(month).is_none()) {
            continue;
        }
        let mut row = vec![month_label(month).unwrap_or("?").to_string()];
        for s in series {
            match s.point(month) {
                Some(point) => {
                    row.push(point.reservations.to_string());
                    row.push(point.revenue.to_string());
                }
                None => row.extend(["-".to_string(), "-".into()]),
            }
        }
        builder.push_record(row);
    }

    let mut totals = vec!["Total".to_string()];
    for s in series {
        totals.push(s.total_reservations().to_string());
        totals.push(s.total_revenue().to_string());
    }
    builder.push_record(totals);
    builder.build().to_string()
}

/// Rows from every readable file. Files without the required columns are
/// skipped with a warning; read failures abort.
fn load_rows(args: &ReportArgs) -> Result<(Vec<PaceRow>, Vec<String>)> {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for path in &args.files {
        let table = read_table_file(path)?;
        match read_pace_rows(&table) {
            Ok(file_rows) => rows.extend(file_rows),
            Err(e) => {
                let e = Error::from(e);
                warn!(file = %path.display(), error = %e, "pace file skipped");
                output::warning(&format!("{}: {e}, skipped", path.display()));
                skipped.push(path.display().to_string());
            }
        }
    }
    Ok((rows, skipped))
}

/// Execute `pace`.
pub fn execute(args: &ReportArgs) -> Result<()> {
    let (rows, skipped) = load_rows(args)?;
    let series = monthly_pace(&rows);

    if let Some(path) = &args.output {
        export::to_file(path, |file| export::write_pace(&series, file))?;
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "pace",
            "series": series,
            "skipped_files": skipped,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Monthly pace");
    if series.is_empty() {
        output::warning("no usable rows in the given files");
        return Ok(());
    }
    output::lines(&pace_table(&series));
    if let [.., previous, latest] = series.as_slice() {
        let diff = latest.total_revenue() - previous.total_revenue();
        let shown = if diff < Decimal::ZERO {
            output::negative(diff)
        } else {
            output::positive(format!("+{diff}"))
        };
        output::field(&format!("Revenue {} vs {}", latest.year, previous.year), shown);
    }
    if let Some(path) = &args.output {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
