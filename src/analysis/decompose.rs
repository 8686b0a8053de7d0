//! Classical additive seasonal decomposition.
//!
//! `observed = trend + seasonal + residual`, where:
//!
//! - trend: centered moving average over one period (a 2×period filter with
//!   half weights at both ends when the period is even)
//! - seasonal: mean detrended value per phase (`i % period`), shifted to zero mean
//! - residual: whatever is left
//!
//! The trend (and so the residual) is undefined for the first and last
//! `period / 2` observations.

use chrono::{Datelike, NaiveDate};

use crate::domain::{Cadence, Column, DecomposeConfig, DecomposedRow, DecomposedSeries, MergedSeries};
use crate::error::PipelineError;

/// Decompose one column of the series.
///
/// Leading and trailing nulls are trimmed (e.g. forecast-only dates after the
/// last measurement). What remains must be at least two periods long, have no
/// interior nulls, and follow a single sampling cadence.
pub fn decompose(series: &MergedSeries, config: &DecomposeConfig) -> Result<DecomposedSeries, PipelineError> {
    let column = config.column;
    let observed = trim_nulls(series.column(column).collect());
    let dates: Vec<NaiveDate> = observed.iter().map(|&(d, _)| d).collect();

    let cadence = infer_cadence(&dates);
    let period = config.period.unwrap_or_else(|| cadence.seasonal_period()).max(1);
    tracing::debug!(%column, ?cadence, period, n = observed.len(), "decomposition period resolved");

    let required = 2 * period;
    if observed.len() < required {
        return Err(PipelineError::InsufficientData {
            column,
            period,
            required,
            available: observed.len(),
        });
    }

    let values = check_regular(&observed, cadence, column)?;
    let trend = centered_moving_average(&values, period);
    let seasonal = seasonal_profile(&values, &trend, period);

    let rows = observed
        .iter()
        .enumerate()
        .map(|(i, &(date, _))| {
            let seasonal = seasonal[i % period];
            DecomposedRow {
                date,
                observed: values[i],
                trend: trend[i],
                seasonal,
                residual: trend[i].map(|t| values[i] - t - seasonal),
            }
        })
        .collect();

    Ok(DecomposedSeries {
        column,
        period,
        cadence,
        rows,
    })
}

/// Dominant spacing between consecutive dates.
///
/// Uses the most frequent day-difference (ties go to the smaller step), so a
/// single gap does not change the detected cadence. Fewer than two dates are
/// treated as daily.
pub fn infer_cadence(dates: &[NaiveDate]) -> Cadence {
    let mut diffs: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    if diffs.is_empty() {
        return Cadence::Daily;
    }
    diffs.sort_unstable();

    let mut best = (diffs[0], 0usize);
    let mut run = (diffs[0], 0usize);
    for &d in &diffs {
        if d == run.0 {
            run.1 += 1;
        } else {
            run = (d, 1);
        }
        if run.1 > best.1 {
            best = run;
        }
    }

    match best.0 {
        1 => Cadence::Daily,
        7 => Cadence::Weekly,
        28..=31 => Cadence::Monthly,
        89..=92 => Cadence::Quarterly,
        365 | 366 => Cadence::Yearly,
        d => Cadence::Days(d),
    }
}

fn trim_nulls(observed: Vec<(NaiveDate, Option<f64>)>) -> Vec<(NaiveDate, Option<f64>)> {
    let Some(first) = observed.iter().position(|(_, v)| v.is_some()) else {
        return Vec::new();
    };
    let last = observed.iter().rposition(|(_, v)| v.is_some()).unwrap_or(first);
    observed[first..=last].to_vec()
}

fn check_regular(
    observed: &[(NaiveDate, Option<f64>)],
    cadence: Cadence,
    column: Column,
) -> Result<Vec<f64>, PipelineError> {
    let mut values = Vec::with_capacity(observed.len());
    for (i, &(date, value)) in observed.iter().enumerate() {
        if i > 0 {
            let prev = observed[i - 1].0;
            if !is_one_step(cadence, prev, date) {
                return Err(PipelineError::IrregularSeries {
                    column,
                    at: date,
                    reason: format!("expected one {} step after {prev}", cadence_label(cadence)),
                });
            }
        }
        let v = value.ok_or_else(|| PipelineError::IrregularSeries {
            column,
            at: date,
            reason: "missing value inside the observed range".to_string(),
        })?;
        values.push(v);
    }
    Ok(values)
}

fn is_one_step(cadence: Cadence, a: NaiveDate, b: NaiveDate) -> bool {
    let month_index = |d: NaiveDate| d.year() * 12 + d.month0() as i32;
    let days = (b - a).num_days();
    match cadence {
        Cadence::Daily => days == 1,
        Cadence::Weekly => days == 7,
        Cadence::Days(step) => days == step,
        Cadence::Monthly => month_index(b) - month_index(a) == 1,
        Cadence::Quarterly => month_index(b) - month_index(a) == 3,
        Cadence::Yearly => b.year() - a.year() == 1,
    }
}

fn cadence_label(cadence: Cadence) -> String {
    match cadence {
        Cadence::Daily => "daily".to_string(),
        Cadence::Weekly => "weekly".to_string(),
        Cadence::Monthly => "monthly".to_string(),
        Cadence::Quarterly => "quarterly".to_string(),
        Cadence::Yearly => "yearly".to_string(),
        Cadence::Days(d) => format!("{d}-day"),
    }
}

fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];
    if n < 2 * half + 1 {
        return trend;
    }

    for i in half..n - half {
        let window = &values[i - half..=i + half];
        let avg = if period % 2 == 1 {
            window.iter().sum::<f64>() / period as f64
        } else {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            (0.5 * window[0] + inner + 0.5 * window[window.len() - 1]) / period as f64
        };
        trend[i] = Some(avg);
    }
    trend
}

fn seasonal_profile(values: &[f64], trend: &[Option<f64>], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (&y, t)) in values.iter().zip(trend).enumerate() {
        if let Some(t) = t {
            sums[i % period] += y - t;
            counts[i % period] += 1;
        }
    }

    let mut profile: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let center = profile.iter().sum::<f64>() / period as f64;
    for s in &mut profile {
        *s -= center;
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecasts, Measurements, SeriesRow};

    fn daily(start: NaiveDate, oil: &[Option<f64>]) -> MergedSeries {
        dated(
            oil.iter()
                .enumerate()
                .map(|(i, &v)| (start + chrono::Duration::days(i as i64), v))
                .collect(),
        )
    }

    fn dated(points: Vec<(NaiveDate, Option<f64>)>) -> MergedSeries {
        MergedSeries {
            rows: points
                .into_iter()
                .map(|(date, v)| SeriesRow {
                    date,
                    measurements: Measurements {
                        oil_vol: v,
                        ..Measurements::default()
                    },
                    forecasts: Forecasts::default(),
                })
                .collect(),
        }
    }

    fn jan1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    const WEEKLY: [f64; 7] = [3.0, -1.0, 2.0, 0.0, -2.0, -3.0, 1.0];

    #[test]
    fn ten_days_with_weekly_period_is_insufficient() {
        let oil: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let config = DecomposeConfig {
            column: Column::OilVol,
            period: Some(7),
        };
        let err = decompose(&daily(jan1(), &oil), &config).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InsufficientData {
                column: Column::OilVol,
                period: 7,
                required: 14,
                available: 10,
            }
        );
    }

    #[test]
    fn recovers_linear_trend_and_weekly_pattern() {
        let oil: Vec<Option<f64>> = (0..56)
            .map(|i| Some(100.0 - 0.5 * i as f64 + WEEKLY[i % 7]))
            .collect();
        let out = decompose(&daily(jan1(), &oil), &DecomposeConfig::default()).unwrap();

        assert_eq!(out.period, 7);
        assert_eq!(out.cadence, Cadence::Daily);
        assert_eq!(out.rows.len(), 56);
        assert!(out.rows[..3].iter().all(|r| r.trend.is_none() && r.residual.is_none()));
        assert!(out.rows[53..].iter().all(|r| r.trend.is_none()));

        for (i, row) in out.rows.iter().enumerate() {
            assert!((row.seasonal - WEEKLY[i % 7]).abs() < 1e-9);
            if let Some(t) = row.trend {
                assert!((t - (100.0 - 0.5 * i as f64)).abs() < 1e-9);
                assert!(row.residual.unwrap().abs() < 1e-9);
            }
        }
    }

    #[test]
    fn even_period_components_add_back_up() {
        let oil: Vec<Option<f64>> = (0..24)
            .map(|i| Some(50.0 + (i as f64).sqrt() + if i % 4 == 0 { 5.0 } else { -1.0 }))
            .collect();
        let config = DecomposeConfig {
            column: Column::OilVol,
            period: Some(4),
        };
        let out = decompose(&daily(jan1(), &oil), &config).unwrap();

        let seasonal_sum: f64 = out.rows[..4].iter().map(|r| r.seasonal).sum();
        assert!(seasonal_sum.abs() < 1e-9);
        for row in &out.rows {
            if let (Some(t), Some(r)) = (row.trend, row.residual) {
                assert!((t + row.seasonal + r - row.observed).abs() < 1e-9);
            }
        }
        assert_eq!(out.rows.iter().filter(|r| r.trend.is_none()).count(), 4);
    }

    #[test]
    fn monthly_cadence_infers_yearly_period() {
        let points = (0..36)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2018 + i / 12, (i % 12) as u32 + 1, 1).unwrap();
                (date, Some(10.0 + (i % 12) as f64))
            })
            .collect();
        let out = decompose(&dated(points), &DecomposeConfig::default()).unwrap();
        assert_eq!(out.cadence, Cadence::Monthly);
        assert_eq!(out.period, 12);
    }

    #[test]
    fn surrounding_nulls_are_trimmed() {
        let mut oil = vec![None, None];
        oil.extend((0..21).map(|i| Some(10.0 + WEEKLY[i % 7])));
        oil.extend([None, None, None]);
        let out = decompose(&daily(jan1(), &oil), &DecomposeConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 21);
        assert_eq!(out.rows[0].date, jan1() + chrono::Duration::days(2));
    }

    #[test]
    fn interior_gaps_are_rejected() {
        let mut oil: Vec<Option<f64>> = (0..20).map(|i| Some(i as f64)).collect();
        oil[9] = None;
        let err = decompose(&daily(jan1(), &oil), &DecomposeConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::IrregularSeries { at, .. } if at == jan1() + chrono::Duration::days(9)));

        let mut points: Vec<(NaiveDate, Option<f64>)> = (0..20)
            .map(|i| (jan1() + chrono::Duration::days(i), Some(i as f64)))
            .collect();
        points.remove(12);
        let err = decompose(&dated(points), &DecomposeConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::IrregularSeries { .. }));
    }

    #[test]
    fn cadence_follows_the_dominant_step() {
        let d = |days: i64| jan1() + chrono::Duration::days(days);
        assert_eq!(infer_cadence(&[d(0), d(1), d(2), d(5)]), Cadence::Daily);
        assert_eq!(infer_cadence(&[d(0), d(7), d(14)]), Cadence::Weekly);
        assert_eq!(infer_cadence(&[d(0), d(10), d(20)]), Cadence::Days(10));
        assert_eq!(infer_cadence(&[d(0)]), Cadence::Daily);
    }
}
