//! Synthetic well inputs for demo mode.
//!
//! The generated history follows an exponential decline with a weekly
//! operating pattern, occasional downtime, and a rising water cut. The
//! forecast table overlaps the tail of the history and extends past it, so
//! the merged series has historical-only, shared, and forecast-only dates.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::domain::{
    ForecastRecord, ForecastTable, Forecasts, HistoricalRecord, HistoricalTable, LoadReport, Measurements,
};

/// Initial oil rate (m³/day).
const OIL_RATE_0: f64 = 120.0;
/// Nominal exponential decline rate (1/year).
const DECLINE_PER_YEAR: f64 = 0.25;
/// Gas-oil ratio (m³ gas per m³ oil).
const GAS_OIL_RATIO: f64 = 85.0;
/// Additive weekly effect on the oil rate, indexed by days since the start date.
const WEEKLY_EFFECT: [f64; 7] = [2.0, 3.0, 1.0, 0.0, -1.5, -3.0, -1.5];
/// Days the forecast extends past the last historical date.
const FORECAST_HORIZON_DAYS: usize = 30;
/// Probability that a day has partial downtime.
const DOWNTIME_PROB: f64 = 0.04;

pub fn demo_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Generate a historical table of `days` daily rows and a matching forecast table.
///
/// Output is fully determined by `seed`.
pub fn generate_demo_inputs(seed: u64, days: usize) -> (HistoricalTable, ForecastTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = demo_start_date();

    let mut historical = Vec::with_capacity(days);
    for day in 0..days {
        let date = start + Duration::days(day as i64);
        let t = day as f64;

        let work_hours = if rng.gen_bool(DOWNTIME_PROB) {
            rng.gen_range(12.0..22.0)
        } else {
            24.0
        };
        let uptime = work_hours / 24.0;

        let rate = decline_rate(t) + WEEKLY_EFFECT[day % 7] + 2.0 * gauss(&mut rng);
        let oil = (rate * uptime).max(0.0);

        let water_cut = 0.2 + 0.4 * t / (days.max(1) as f64);
        let water = oil * water_cut / (1.0 - water_cut);
        let gas = oil * GAS_OIL_RATIO * (1.0 + 0.03 * gauss(&mut rng));

        let values = Measurements {
            oil_vol: Some(round2(oil)),
            gas_vol: Some(round2(gas.max(0.0))),
            water_vol: Some(round2(water)),
            work_hours: Some(round2(work_hours)),
            vol_liq: Some(round2(oil + water)),
            water_cut: Some(round2(water_cut * 100.0)),
            dnmc_lvl: Some(round2(800.0 + 0.2 * t + 5.0 * gauss(&mut rng))),
            pressure: Some(round2(95.0 - 0.02 * t + 0.5 * gauss(&mut rng))),
        };

        historical.push(HistoricalRecord {
            fecha: date.format("%Y-%m-%d").to_string(),
            values,
        });
    }

    let overlap = days / 5;
    let first_forecast_day = days - overlap;
    let mut forecast = Vec::with_capacity(overlap + FORECAST_HORIZON_DAYS);
    for day in first_forecast_day..days + FORECAST_HORIZON_DAYS {
        let date = start + Duration::days(day as i64);
        let t = day as f64;
        let oil = decline_rate(t);
        let water_cut = (0.2 + 0.4 * t / (days.max(1) as f64)).min(0.95);

        forecast.push(ForecastRecord {
            fecha: date.format("%Y-%m-%d").to_string(),
            values: Forecasts {
                oil_vol: Some(round2(oil)),
                gas_vol: Some(round2(oil * GAS_OIL_RATIO)),
                water_vol: Some(round2(oil * water_cut / (1.0 - water_cut))),
            },
        });
    }

    let historical = HistoricalTable {
        report: demo_report(historical.len()),
        rows: historical,
    };
    let forecast = ForecastTable {
        report: demo_report(forecast.len()),
        rows: forecast,
    };
    (historical, forecast)
}

fn gauss(rng: &mut StdRng) -> f64 {
    rng.sample(StandardNormal)
}

fn decline_rate(day: f64) -> f64 {
    OIL_RATE_0 * (-DECLINE_PER_YEAR * day / 365.0).exp()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn demo_report(rows: usize) -> LoadReport {
    LoadReport {
        source: "demo".to_string(),
        rows_read: rows,
        duplicates_resolved: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_inputs() {
        let a = generate_demo_inputs(11, 100);
        let b = generate_demo_inputs(11, 100);
        assert_eq!(a, b);

        let c = generate_demo_inputs(12, 100);
        assert_ne!(a.0.rows, c.0.rows);
    }

    #[test]
    fn forecast_overlaps_and_extends_history() {
        let (historical, forecast) = generate_demo_inputs(1, 100);
        assert_eq!(historical.rows.len(), 100);
        assert_eq!(forecast.rows.len(), 20 + FORECAST_HORIZON_DAYS);
        assert_eq!(forecast.rows[0].fecha, historical.rows[80].fecha);
        assert_eq!(historical.rows[0].fecha, "2019-01-01");
    }

    #[test]
    fn volumes_are_non_negative_and_hours_bounded() {
        let (historical, _) = generate_demo_inputs(3, 400);
        for row in &historical.rows {
            assert!(row.values.oil_vol.unwrap() >= 0.0);
            assert!(row.values.water_vol.unwrap() >= 0.0);
            let hours = row.values.work_hours.unwrap();
            assert!((0.0..=24.0).contains(&hours));
        }
    }
}
