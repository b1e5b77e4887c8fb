//! Handler for the `kpi` command.

use serde_json::json;
use tabled::builder::Builder;
use tabled::{Table, Tabled};
use tracing::warn;

use super::command::ReportArgs;
use super::output;
use crate::adapter::outbound::table::{export, reader::read_table_file};
use crate::application::daily::read_daily;
use crate::domain::forecast::DailyObservation;
use crate::domain::kpi::{dominant_year, kpi_report, KpiReport, YearKpi};
use crate::domain::pace::month_label;
use crate::error::Result;

#[derive(Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Occupancy %")]
    occupancy: String,
    #[tabled(rename = "ADR")]
    adr: String,
    #[tabled(rename = "RevPAR")]
    revpar: String,
    #[tabled(rename = "High season")]
    high: String,
    #[tabled(rename = "Low season")]
    low: String,
}

fn month_list(months: impl Iterator<Item = u32>) -> String {
    let labels: Vec<&str> = months.filter_map(month_label).collect();
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(" ")
    }
}

fn year_row(year: &YearKpi) -> YearRow {
    YearRow {
        year: year.year,
        occupancy: format!("{:.1}", year.occupancy_pct),
        adr: year.adr.to_string(),
        revpar: year.revpar.to_string(),
        high: month_list(year.high_season()),
        low: month_list(year.low_season()),
    }
}

fn comparison_table(report: &KpiReport) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["Month".to_string()];
    for year in &report.years {
        header.push(format!("Occ. {}", year.year));
        header.push(format!("ADR {}", year.year));
        header.push(format!("RevPAR {}", year.year));
    }
    header.push("Season".into());
    builder.push_record(header);

    for month in report.comparison() {
        let mut row = vec![month_label(month.month).unwrap_or("?").to_string()];
        for year in &report.years {
            match month.by_year.get(&year.year) {
                Some(kpi) => {
                    row.push(format!("{:.1}", kpi.occupancy_pct));
                    row.push(kpi.adr.to_string());
                    row.push(kpi.revpar.to_string());
                }
                None => row.extend(["-".to_string(), "-".into(), "-".into()]),
            }
        }
        let season = if month.high_season {
            "high"
        } else if month.low_season {
            "low"
        } else {
            ""
        };
        row.push(season.to_string());
        builder.push_record(row);
    }
    builder.build().to_string()
}

/// Read one daily table per file, keyed by the year most of its rows fall in.
fn load_years(args: &ReportArgs) -> Result<Vec<(i32, Vec<DailyObservation>)>> {
    let mut tables: Vec<(i32, Vec<DailyObservation>)> = Vec::new();
    for path in &args.files {
        let history = read_daily(&read_table_file(path)?)?;
        if history.dropped_rows > 0 {
            output::warning(&format!(
                "{}: {} row(s) dropped",
                path.display(),
                history.dropped_rows
            ));
        }
        let Some(year) = dominant_year(&history.observations) else {
            output::warning(&format!("{}: no dated rows, skipped", path.display()));
            continue;
        };
        if let Some(slot) = tables.iter_mut().find(|(y, _)| *y == year) {
            warn!(year, file = %path.display(), "year loaded twice, keeping the later file");
            output::warning(&format!("{}: replaces the earlier table for {year}", path.display()));
            slot.1 = history.observations;
        } else {
            tables.push((year, history.observations));
        }
    }
    Ok(tables)
}

/// Execute `kpi`.
pub fn execute(args: &ReportArgs) -> Result<()> {
    let report = kpi_report(&load_years(args)?);

    if let Some(path) = &args.output {
        export::to_file(path, |file| export::write_kpi(&report, file))?;
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "kpi",
            "years": report.years,
            "comparison": report.comparison(),
            "adr_change_pct": report.adr_change_pct(),
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Annual KPIs");
    if report.years.is_empty() {
        output::warning("no usable daily data in the given files");
        return Ok(());
    }
    let rows: Vec<YearRow> = report.years.iter().map(year_row).collect();
    output::lines(&Table::new(rows).to_string());
    if let Some(change) = report.adr_change_pct() {
        let shown = format!("{change:+.1}%");
        let shown = if change < 0.0 {
            output::negative(shown)
        } else {
            output::positive(shown)
        };
        output::field("ADR change", shown);
    }

    output::section("Month by month");
    output::lines(&comparison_table(&report));
    if let Some(path) = &args.output {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn later_file_for_the_same_year_wins() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "fecha,precio,ocupacion\n2024-07-01,50,0.5\n").unwrap();
        fs::write(&b, "fecha,precio,ocupacion\n2024-07-01,70,0.9\n").unwrap();
        let args = ReportArgs {
            files: vec![a, b],
            output: None,
        };

        let years = load_years(&args).unwrap();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].1[0].price, Some(rust_decimal_macros::dec!(70)));
    }

    #[test]
    fn days_without_a_price_still_count_for_occupancy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2024.csv");
        fs::write(
            &path,
            "fecha,precio,ocupacion\n2024-07-01,100,80\n2024-07-02,,40\n",
        )
        .unwrap();
        let args = ReportArgs {
            files: vec![path],
            output: None,
        };

        let years = load_years(&args).unwrap();
        let kpi = crate::domain::kpi::year_kpi(2024, &years[0].1).unwrap();
        assert_eq!(kpi.occupancy_pct, 60.0);
        assert_eq!(kpi.adr, rust_decimal_macros::dec!(100));
    }

    #[test]
    fn comparison_marks_season_of_latest_year() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2024.csv");
        fs::write(
            &path,
            "fecha,precio,ocupacion\n2024-08-01,90,0.95\n2024-01-10,40,0.10\n",
        )
        .unwrap();
        let report = kpi_report(
            &load_years(&ReportArgs {
                files: vec![PathBuf::from(&path)],
                output: None,
            })
            .unwrap(),
        );
        let table = comparison_table(&report);
        assert!(table.contains("Ago"));
        assert!(table.contains("high"));
        assert!(table.contains("low"));
    }

    #[test]
    fn empty_month_lists_show_a_dash() {
        assert_eq!(month_list(std::iter::empty()), "-");
        assert_eq!(month_list([7, 8].into_iter()), "Jul Ago");
    }
}
