//! Annual KPI report: occupancy, ADR and RevPAR per year with monthly seasonality.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::forecast::{decimal_to_f64, ratio_to_decimal, DailyObservation};

/// Monthly mean occupancy above which a month counts as high season.
pub const HIGH_SEASON_PCT: f64 = 80.0;
/// Monthly mean occupancy below which a month counts as low season.
pub const LOW_SEASON_PCT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    High,
    Shoulder,
    Low,
}

impl Season {
    fn classify(occupancy_pct: f64) -> Self {
        if occupancy_pct > HIGH_SEASON_PCT {
            Season::High
        } else if occupancy_pct < LOW_SEASON_PCT {
            Season::Low
        } else {
            Season::Shoulder
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthKpi {
    pub month: u32,
    pub occupancy_pct: f64,
    pub adr: Decimal,
    /// `occupancy / 100 * adr` on the monthly means.
    pub revpar: Decimal,
    pub season: Season,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearKpi {
    pub year: i32,
    pub occupancy_pct: f64,
    pub adr: Decimal,
    /// Mean of the daily `occupancy / 100 * price`.
    pub revpar: Decimal,
    pub months: Vec<MonthKpi>,
}

impl YearKpi {
    pub fn high_season(&self) -> impl Iterator<Item = u32> + '_ {
        self.months
            .iter()
            .filter(|m| m.season == Season::High)
            .map(|m| m.month)
    }

    pub fn low_season(&self) -> impl Iterator<Item = u32> + '_ {
        self.months
            .iter()
            .filter(|m| m.season == Season::Low)
            .map(|m| m.month)
    }

    #[must_use]
    pub fn month(&self, month: u32) -> Option<&MonthKpi> {
        self.months.iter().find(|m| m.month == month)
    }
}

/// One row of the month-by-month comparison across years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub month: u32,
    pub by_year: BTreeMap<i32, MonthKpi>,
    /// Season flags taken from the most recent year.
    pub high_season: bool,
    pub low_season: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub years: Vec<YearKpi>,
}

/// Most common calendar year among the observations.
///
/// Ties resolve to the later year.
#[must_use]
pub fn dominant_year(observations: &[DailyObservation]) -> Option<i32> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for obs in observations {
        *counts.entry(obs.date.year()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(year, _)| year)
}

/// Express occupancy in percent; a series with no value above 1.5 is read as fractions.
fn occupancy_in_percent(observations: &[DailyObservation]) -> Vec<Option<f64>> {
    let fractions = observations
        .iter()
        .filter_map(|o| o.occupancy)
        .all(|v| v <= 1.5);
    observations
        .iter()
        .map(|o| o.occupancy.map(|v| if fractions { v * 100.0 } else { v }))
        .collect()
}

/// KPIs for one year of daily history. `None` if no row has a usable value.
#[must_use]
pub fn year_kpi(year: i32, observations: &[DailyObservation]) -> Option<YearKpi> {
    let occupancy = occupancy_in_percent(observations);

    let occ_values: Vec<f64> = occupancy.iter().flatten().copied().collect();
    let prices: Vec<Decimal> = observations.iter().filter_map(|o| o.price).collect();
    if occ_values.is_empty() && prices.is_empty() {
        return None;
    }

    let daily_revpar: Vec<Decimal> = observations
        .iter()
        .zip(&occupancy)
        .filter_map(|(o, occ)| Some(ratio_to_decimal((*occ)? / 100.0) * o.price?))
        .collect();

    let mut by_month: BTreeMap<u32, (Vec<f64>, Vec<Decimal>)> = BTreeMap::new();
    for (obs, occ) in observations.iter().zip(&occupancy) {
        let slot = by_month.entry(obs.date.month()).or_default();
        if let Some(occ) = occ {
            slot.0.push(*occ);
        }
        if let Some(price) = obs.price {
            slot.1.push(price);
        }
    }

    let months = by_month
        .into_iter()
        .map(|(month, (occ, prices))| {
            let occupancy_pct = mean_f64(&occ);
            let adr = mean_decimal(&prices);
            MonthKpi {
                month,
                occupancy_pct,
                adr,
                revpar: (ratio_to_decimal(occupancy_pct / 100.0) * adr).round_dp(2),
                season: Season::classify(occupancy_pct),
            }
        })
        .collect();

    Some(YearKpi {
        year,
        occupancy_pct: (mean_f64(&occ_values) * 100.0).round() / 100.0,
        adr: mean_decimal(&prices),
        revpar: mean_decimal(&daily_revpar),
        months,
    })
}

/// Build the report from `(year, observations)` tables, ordered by year.
#[must_use]
pub fn kpi_report(tables: &[(i32, Vec<DailyObservation>)]) -> KpiReport {
    let mut years: Vec<YearKpi> = tables
        .iter()
        .filter_map(|(year, obs)| year_kpi(*year, obs))
        .collect();
    years.sort_by_key(|y| y.year);
    KpiReport { years }
}

impl KpiReport {
    /// Month-by-month matrix over every month seen in any year.
    #[must_use]
    pub fn comparison(&self) -> Vec<MonthComparison> {
        let latest = self.years.last();
        let mut months: Vec<u32> = self
            .years
            .iter()
            .flat_map(|y| y.months.iter().map(|m| m.month))
            .collect();
        months.sort_unstable();
        months.dedup();

        months
            .into_iter()
            .map(|month| {
                let by_year = self
                    .years
                    .iter()
                    .filter_map(|y| y.month(month).map(|m| (y.year, m.clone())))
                    .collect();
                let season = latest.and_then(|y| y.month(month)).map(|m| m.season);
                MonthComparison {
                    month,
                    by_year,
                    high_season: season == Some(Season::High),
                    low_season: season == Some(Season::Low),
                }
            })
            .collect()
    }

    /// Year-over-year change of mean ADR between the last two years.
    #[must_use]
    pub fn adr_change_pct(&self) -> Option<f64> {
        let [.., prev, last] = self.years.as_slice() else {
            return None;
        };
        let prev = decimal_to_f64(prev.adr);
        if prev == 0.0 {
            return None;
        }
        Some((decimal_to_f64(last.adr) - prev) / prev * 100.0)
    }
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_decimal(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().sum();
    (sum / Decimal::from(values.len())).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn obs(y: i32, m: u32, d: u32, price: Decimal, occupancy: f64) -> DailyObservation {
        DailyObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price: Some(price),
            occupancy: Some(occupancy),
        }
    }

    fn year_2025() -> Vec<DailyObservation> {
        vec![
            obs(2025, 7, 1, dec!(100), 90.0),
            obs(2025, 7, 2, dec!(80), 86.0),
            obs(2025, 10, 1, dec!(40), 20.0),
            obs(2025, 5, 1, dec!(60), 60.0),
        ]
    }

    #[test]
    fn year_kpis_and_seasons() {
        let kpi = year_kpi(2025, &year_2025()).unwrap();
        assert_eq!(kpi.occupancy_pct, 64.0);
        assert_eq!(kpi.adr, dec!(70));
        // (0.9*100 + 0.86*80 + 0.2*40 + 0.6*60) / 4 = (90 + 68.8 + 8 + 36) / 4
        assert_eq!(kpi.revpar, dec!(50.70));

        let july = kpi.month(7).unwrap();
        assert_eq!(july.occupancy_pct, 88.0);
        assert_eq!(july.adr, dec!(90));
        assert_eq!(july.revpar, dec!(79.20));
        assert_eq!(kpi.high_season().collect::<Vec<_>>(), vec![7]);
        assert_eq!(kpi.low_season().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn fraction_occupancy_is_read_as_percent() {
        let series = vec![obs(2024, 7, 1, dec!(50), 0.5)];
        let kpi = year_kpi(2024, &series).unwrap();
        assert_eq!(kpi.occupancy_pct, 50.0);
    }

    #[test]
    fn dominant_year_picks_mode() {
        let mut series = year_2025();
        series.push(obs(2024, 12, 31, dec!(1), 1.0));
        assert_eq!(dominant_year(&series), Some(2025));
        assert_eq!(dominant_year(&[]), None);
    }

    #[test]
    fn comparison_uses_latest_year_for_seasons() {
        let older = vec![obs(2024, 7, 1, dec!(90), 30.0), obs(2024, 8, 1, dec!(90), 85.0)];
        let report = kpi_report(&[(2025, year_2025()), (2024, older)]);

        assert_eq!(report.years[0].year, 2024);
        let rows = report.comparison();
        assert_eq!(rows.iter().map(|r| r.month).collect::<Vec<_>>(), vec![5, 7, 8, 10]);

        let july = rows.iter().find(|r| r.month == 7).unwrap();
        assert!(july.high_season);
        assert_eq!(july.by_year.len(), 2);
        let august = rows.iter().find(|r| r.month == 8).unwrap();
        assert!(!august.high_season, "august only exists in 2024");
        assert_eq!(august.by_year.len(), 1);
    }

    #[test]
    fn adr_change_needs_two_years() {
        let single = kpi_report(&[(2025, year_2025())]);
        assert_eq!(single.adr_change_pct(), None);

        let older = vec![obs(2024, 7, 1, dec!(56), 50.0)];
        let both = kpi_report(&[(2024, older), (2025, year_2025())]);
        let change = both.adr_change_pct().unwrap();
        assert!((change - 25.0).abs() < 1e-9);
    }
}
