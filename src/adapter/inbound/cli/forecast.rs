//! Handler for the `forecast` command.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::ForecastArgs;
use super::context::Context;
use super::output;
use crate::adapter::outbound::table::{export, reader::read_table_file};
use crate::application::daily::read_daily;
use crate::domain::forecast::{project, Forecast, ForecastOutcome};
use crate::error::Result;
use crate::infrastructure::config::settings::ForecastConfig;

#[derive(Tabled)]
struct ForecastRowView {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    weekday: String,
    #[tabled(rename = "Base ADR")]
    base_adr: String,
    #[tabled(rename = "Occ. %")]
    occupancy: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rule")]
    strategy: &'static str,
}

fn settings(base: &ForecastConfig, args: &ForecastArgs) -> ForecastConfig {
    let mut settings = base.clone();
    if let Some(method) = args.method {
        settings.method = method.into();
    }
    if let Some(high) = args.high {
        settings.high_threshold = high;
    }
    if let Some(low) = args.low {
        settings.low_threshold = low;
    }
    if let Some(from) = args.from {
        settings.season_start = from;
    }
    if let Some(to) = args.to {
        settings.season_end = to;
    }
    settings
}

fn weights_label(forecast_weights: &std::collections::BTreeMap<i32, u32>) -> String {
    forecast_weights
        .iter()
        .map(|(year, weight)| format!("{year} x{weight}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_forecast(forecast: &Forecast) {
    let rows: Vec<ForecastRowView> = forecast
        .rows
        .iter()
        .map(|row| ForecastRowView {
            date: row.date.to_string(),
            weekday: row.weekday.clone(),
            base_adr: row.base_adr.to_string(),
            occupancy: format!("{:.1}", row.historical_occupancy_pct),
            price: row.recommended_price.to_string(),
            strategy: row.strategy.label(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    output::section("Summary");
    output::field("Days", forecast.rows.len());
    output::field("Method", forecast.method);
    output::field("Weights", weights_label(&forecast.weights));
    output::field("Mean price", forecast.mean_recommended());
    output::field("Mean base ADR", forecast.mean_base());
    let variation = forecast.variation();
    let shown = if variation.is_sign_negative() {
        output::negative(variation)
    } else {
        output::positive(format!("+{variation}"))
    };
    output::field("Variation", shown);
    output::field("Mean occ.", format!("{:.1}%", forecast.mean_occupancy_pct()));
}

/// Execute `forecast`.
pub fn execute(ctx: &Context, args: &ForecastArgs) -> Result<()> {
    let settings = settings(&ctx.config.forecast, args);
    let thresholds = settings.thresholds()?;
    let season = settings.season()?;

    let table = read_table_file(&args.file)?;
    let history = read_daily(&table)?;
    if history.dropped_rows > 0 {
        output::warning(&format!(
            "{} row(s) dropped for an unreadable date",
            history.dropped_rows
        ));
    }
    if history.priceless_rows > 0 {
        output::warning(&format!(
            "{} row(s) without a readable price left out of the averages",
            history.priceless_rows
        ));
    }

    let outcome = project(&history.observations, settings.method, &thresholds, &season);
    let forecast = match outcome {
        ForecastOutcome::NoMatchingDates { weights } => {
            if output::is_json() {
                output::json_output(json!({
                    "command": "forecast",
                    "status": "no_matching_dates",
                    "season": season,
                    "weights": weights,
                }));
                return Ok(());
            }
            output::warning(&format!("no history for any day of {season}"));
            output::hint("the history needs rows for the same calendar days in earlier years");
            return Ok(());
        }
        ForecastOutcome::Forecast(forecast) => forecast,
    };

    if let Some(path) = &args.output {
        export::to_file(path, |file| export::write_forecast(&forecast, file))?;
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "forecast",
            "status": "ok",
            "season": season,
            "thresholds": thresholds,
            "forecast": forecast,
            "mean_recommended": forecast.mean_recommended(),
            "variation": forecast.variation(),
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section(&format!("Recommended prices {season}"));
    show_forecast(&forecast);
    if let Some(path) = &args.output {
        output::success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::WeightingMethod;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn flags_override_configured_settings() {
        let args = ForecastArgs {
            file: PathBuf::from("h.csv"),
            method: Some(super::super::command::MethodArg::Simple),
            high: Some(95),
            low: None,
            from: None,
            to: None,
            output: None,
        };
        let merged = settings(&ForecastConfig::default(), &args);
        assert_eq!(merged.method, WeightingMethod::Simple);
        assert_eq!(merged.high_threshold, 95);
        assert_eq!(merged.low_threshold, 50);
    }

    #[test]
    fn weights_are_listed_by_year() {
        let weights = BTreeMap::from([(2023, 1), (2024, 2)]);
        assert_eq!(weights_label(&weights), "2023 x1, 2024 x2");
    }
}
