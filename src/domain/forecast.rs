//! Seasonal price forecast from multi-year daily history.
//!
//! History is folded onto the calendar (`MM-DD`), averaged across years with
//! optional recency weighting, and each date of the target season gets a
//! recommended price from the historical ADR and a yield rule driven by the
//! historical occupancy of that calendar day.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::range::StayRange;

/// One day of price/occupancy history.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    /// Average daily rate charged that day.
    pub price: Option<Decimal>,
    /// Occupancy, either a fraction (0.83) or a percentage (83).
    pub occupancy: Option<f64>,
}

/// How years are weighted when averaging the same calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingMethod {
    /// Oldest year weighs 1, the next 2, ..., the newest N.
    #[default]
    Weighted,
    /// Every year weighs 1.
    Simple,
}

impl std::fmt::Display for WeightingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightingMethod::Weighted => write!(f, "weighted"),
            WeightingMethod::Simple => write!(f, "simple"),
        }
    }
}

/// Occupancy bands (percent) that drive the yield rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YieldThresholds {
    high: u8,
    low: u8,
}

/// Occupancy level from which increases stop being moderate.
const MODERATE_FLOOR: f64 = 0.75;

impl YieldThresholds {
    /// Validate `0 < low < 75 <= high <= 100`.
    pub fn try_new(high: u8, low: u8) -> Result<Self, DomainError> {
        if low == 0 || high > 100 || low >= 75 || high < 75 {
            return Err(DomainError::InvalidThresholds { low, high });
        }
        Ok(Self { high, low })
    }

    #[must_use]
    pub fn high(&self) -> u8 {
        self.high
    }

    #[must_use]
    pub fn low(&self) -> u8 {
        self.low
    }
}

impl Default for YieldThresholds {
    fn default() -> Self {
        Self { high: 90, low: 50 }
    }
}

/// Price action chosen for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    AggressiveIncrease,
    ModerateIncrease,
    InflationAdjustment,
    StimulusDiscount,
}

impl PricingStrategy {
    /// Multiplier applied to the historical ADR.
    #[must_use]
    pub fn multiplier(self) -> Decimal {
        match self {
            PricingStrategy::AggressiveIncrease => dec!(1.15),
            PricingStrategy::ModerateIncrease => dec!(1.08),
            PricingStrategy::InflationAdjustment => dec!(1.03),
            PricingStrategy::StimulusDiscount => dec!(0.95),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PricingStrategy::AggressiveIncrease => "aggressive increase",
            PricingStrategy::ModerateIncrease => "moderate increase",
            PricingStrategy::InflationAdjustment => "inflation adjustment",
            PricingStrategy::StimulusDiscount => "stimulus discount",
        }
    }
}

/// Weighted historical averages for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDayStats {
    pub mean_price: Decimal,
    /// Fraction, 0..=1.
    pub mean_occupancy: f64,
    pub total_weight: u32,
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub weekday: String,
    pub base_adr: Decimal,
    pub historical_occupancy_pct: f64,
    pub recommended_price: Decimal,
    pub strategy: PricingStrategy,
}

/// Projection over a season window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub method: WeightingMethod,
    pub weights: BTreeMap<i32, u32>,
    pub rows: Vec<ForecastRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// No day of the window has history for its calendar day.
    NoMatchingDates { weights: BTreeMap<i32, u32> },
    Forecast(Forecast),
}

/// Rescale occupancy to fractions when the data is expressed in percent.
///
/// The whole series is treated as percent as soon as one value exceeds 1.5.
/// Missing occupancy becomes 0.
pub fn normalize_occupancy(observations: &mut [DailyObservation]) {
    let max = observations
        .iter()
        .filter_map(|o| o.occupancy)
        .fold(f64::NEG_INFINITY, f64::max);
    let percent = max > 1.5;
    for obs in observations.iter_mut() {
        let value = obs.occupancy.unwrap_or(0.0);
        obs.occupancy = Some(if percent { value / 100.0 } else { value });
    }
}

/// Per-year weights for the chosen method.
#[must_use]
pub fn year_weights(observations: &[DailyObservation], method: WeightingMethod) -> BTreeMap<i32, u32> {
    let years: BTreeSet<i32> = observations.iter().map(|o| o.date.year()).collect();
    years
        .into_iter()
        .enumerate()
        .map(|(idx, year)| {
            let weight = match method {
                WeightingMethod::Weighted => u32::try_from(idx + 1).unwrap_or(u32::MAX),
                WeightingMethod::Simple => 1,
            };
            (year, weight)
        })
        .collect()
}

/// Weighted mean price and occupancy per `(month, day)`.
///
/// Rows without a price do not contribute. Occupancy is expected to be
/// normalized already (see [`normalize_occupancy`]).
#[must_use]
pub fn calendar_stats(
    observations: &[DailyObservation],
    weights: &BTreeMap<i32, u32>,
) -> BTreeMap<(u32, u32), CalendarDayStats> {
    struct Acc {
        price: Decimal,
        occupancy: f64,
        weight: u32,
    }

    let mut acc: BTreeMap<(u32, u32), Acc> = BTreeMap::new();
    for obs in observations {
        let Some(price) = obs.price else { continue };
        let weight = weights.get(&obs.date.year()).copied().unwrap_or(1);
        let slot = acc.entry((obs.date.month(), obs.date.day())).or_insert(Acc {
            price: Decimal::ZERO,
            occupancy: 0.0,
            weight: 0,
        });
        slot.price += price * Decimal::from(weight);
        slot.occupancy += obs.occupancy.unwrap_or(0.0) * f64::from(weight);
        slot.weight += weight;
    }

    acc.into_iter()
        .filter(|(_, a)| a.weight > 0)
        .map(|(key, a)| {
            let stats = CalendarDayStats {
                mean_price: a.price / Decimal::from(a.weight),
                mean_occupancy: a.occupancy / f64::from(a.weight),
                total_weight: a.weight,
            };
            (key, stats)
        })
        .collect()
}

/// Pick the yield rule for a historical occupancy and apply it.
#[must_use]
pub fn apply_yield(base: Decimal, occupancy: f64, thresholds: &YieldThresholds) -> (Decimal, PricingStrategy) {
    let occupancy = if occupancy > 1.0 { occupancy / 100.0 } else { occupancy };
    let high = f64::from(thresholds.high) / 100.0;
    let low = f64::from(thresholds.low) / 100.0;

    let strategy = if occupancy >= high {
        PricingStrategy::AggressiveIncrease
    } else if occupancy >= MODERATE_FLOOR {
        PricingStrategy::ModerateIncrease
    } else if occupancy >= low {
        PricingStrategy::InflationAdjustment
    } else {
        PricingStrategy::StimulusDiscount
    };
    (base * strategy.multiplier(), strategy)
}

/// Project recommended prices for every date of `window`.
///
/// Dates whose calendar day never appears in the history are skipped.
#[must_use]
pub fn project(
    history: &[DailyObservation],
    method: WeightingMethod,
    thresholds: &YieldThresholds,
    window: &StayRange,
) -> ForecastOutcome {
    let mut observations = history.to_vec();
    normalize_occupancy(&mut observations);
    let weights = year_weights(&observations, method);
    let stats = calendar_stats(&observations, &weights);

    let rows: Vec<ForecastRow> = window
        .start()
        .iter_days()
        .take_while(|d| *d <= window.end())
        .filter_map(|date| {
            let day = stats.get(&(date.month(), date.day()))?;
            let (price, strategy) = apply_yield(day.mean_price, day.mean_occupancy, thresholds);
            Some(ForecastRow {
                date,
                weekday: date.format("%A").to_string(),
                base_adr: day.mean_price.round_dp(2),
                historical_occupancy_pct: (day.mean_occupancy * 1000.0).round() / 10.0,
                recommended_price: price.round_dp(2),
                strategy,
            })
        })
        .collect();

    if rows.is_empty() {
        return ForecastOutcome::NoMatchingDates { weights };
    }
    ForecastOutcome::Forecast(Forecast {
        method,
        weights,
        rows,
    })
}

impl Forecast {
    /// Mean recommended price over the projected days.
    #[must_use]
    pub fn mean_recommended(&self) -> Decimal {
        mean(self.rows.iter().map(|r| r.recommended_price))
    }

    /// Mean historical ADR over the projected days.
    #[must_use]
    pub fn mean_base(&self) -> Decimal {
        mean(self.rows.iter().map(|r| r.base_adr))
    }

    /// Mean recommended price minus mean base ADR.
    #[must_use]
    pub fn variation(&self) -> Decimal {
        (self.mean_recommended() - self.mean_base()).round_dp(2)
    }

    /// Mean historical occupancy of the projected days, percent.
    #[must_use]
    pub fn mean_occupancy_pct(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.rows.iter().map(|r| r.historical_occupancy_pct).sum();
        sum / self.rows.len() as f64
    }
}

fn mean(values: impl Iterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count)).round_dp(2)
}

/// Convert an `f64` ratio to `Decimal`, saturating to zero on NaN.
#[must_use]
pub fn ratio_to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a `Decimal` to `f64` for percentage arithmetic.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(y: i32, m: u32, d: u32, price: Decimal, occupancy: f64) -> DailyObservation {
        DailyObservation {
            date: date(y, m, d),
            price: Some(price),
            occupancy: Some(occupancy),
        }
    }

    #[test]
    fn percent_series_is_rescaled() {
        let mut series = vec![obs(2024, 7, 1, dec!(50), 80.0), obs(2024, 7, 2, dec!(50), 1.0)];
        series.push(DailyObservation {
            date: date(2024, 7, 3),
            price: Some(dec!(50)),
            occupancy: None,
        });
        normalize_occupancy(&mut series);
        assert_eq!(series[0].occupancy, Some(0.8));
        assert_eq!(series[1].occupancy, Some(0.01));
        assert_eq!(series[2].occupancy, Some(0.0));
    }

    #[test]
    fn fraction_series_is_left_alone() {
        let mut series = vec![obs(2024, 7, 1, dec!(50), 0.8), obs(2024, 7, 2, dec!(50), 1.2)];
        normalize_occupancy(&mut series);
        assert_eq!(series[0].occupancy, Some(0.8));
        assert_eq!(series[1].occupancy, Some(1.2));
    }

    #[test]
    fn newest_year_weighs_most() {
        let series = vec![
            obs(2025, 7, 1, dec!(1), 0.5),
            obs(2023, 7, 1, dec!(1), 0.5),
            obs(2024, 7, 1, dec!(1), 0.5),
        ];
        let weighted = year_weights(&series, WeightingMethod::Weighted);
        assert_eq!(weighted.into_iter().collect::<Vec<_>>(), vec![(2023, 1), (2024, 2), (2025, 3)]);

        let simple = year_weights(&series, WeightingMethod::Simple);
        assert!(simple.values().all(|w| *w == 1));
    }

    #[test]
    fn weighted_mean_per_calendar_day() {
        let series = vec![obs(2024, 7, 1, dec!(40), 0.5), obs(2025, 7, 1, dec!(70), 0.8)];
        let weights = year_weights(&series, WeightingMethod::Weighted);
        let stats = calendar_stats(&series, &weights);

        let day = &stats[&(7, 1)];
        // (40*1 + 70*2) / 3 = 60
        assert_eq!(day.mean_price, dec!(60));
        assert!((day.mean_occupancy - 0.7).abs() < 1e-9);
        assert_eq!(day.total_weight, 3);
    }

    #[test]
    fn yield_bands() {
        let t = YieldThresholds::default();
        assert_eq!(apply_yield(dec!(100), 0.95, &t), (dec!(115.00), PricingStrategy::AggressiveIncrease));
        assert_eq!(apply_yield(dec!(100), 0.80, &t).1, PricingStrategy::ModerateIncrease);
        assert_eq!(apply_yield(dec!(100), 0.60, &t).1, PricingStrategy::InflationAdjustment);
        assert_eq!(apply_yield(dec!(100), 0.20, &t), (dec!(95.00), PricingStrategy::StimulusDiscount));
        // percent input is tolerated
        assert_eq!(apply_yield(dec!(100), 92.0, &t).1, PricingStrategy::AggressiveIncrease);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        assert!(YieldThresholds::try_new(90, 50).is_ok());
        assert!(YieldThresholds::try_new(70, 50).is_err());
        assert!(YieldThresholds::try_new(90, 80).is_err());
        assert!(YieldThresholds::try_new(101, 50).is_err());
    }

    #[test]
    fn projection_covers_days_with_history() {
        let series = vec![
            obs(2024, 7, 1, dec!(40), 95.0),
            obs(2025, 7, 1, dec!(70), 95.0),
            obs(2025, 7, 3, dec!(50), 10.0),
        ];
        let window = StayRange::try_new(date(2026, 7, 1), date(2026, 7, 3)).unwrap();
        let outcome = project(&series, WeightingMethod::Weighted, &YieldThresholds::default(), &window);

        let ForecastOutcome::Forecast(forecast) = outcome else {
            panic!("expected forecast");
        };
        assert_eq!(forecast.rows.len(), 2);
        let first = &forecast.rows[0];
        assert_eq!(first.date, date(2026, 7, 1));
        assert_eq!(first.weekday, "Wednesday");
        assert_eq!(first.base_adr, dec!(60.00));
        assert_eq!(first.recommended_price, dec!(69.00));
        assert_eq!(first.historical_occupancy_pct, 95.0);
        assert_eq!(forecast.rows[1].strategy, PricingStrategy::StimulusDiscount);
        assert_eq!(forecast.mean_base(), dec!(55.00));
    }

    #[test]
    fn projection_without_overlap_reports_no_dates() {
        let series = vec![obs(2025, 1, 1, dec!(40), 0.5)];
        let window = StayRange::single(date(2026, 7, 1));
        let outcome = project(&series, WeightingMethod::Simple, &YieldThresholds::default(), &window);
        assert!(matches!(outcome, ForecastOutcome::NoMatchingDates { .. }));
    }
}
