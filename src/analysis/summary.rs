//! Header metrics: mean / max / min per column.

use crate::domain::{Column, ColumnSummary, MergedSeries, SummaryMetrics};
use crate::error::PipelineError;

/// Aggregate one column over its non-null values.
pub fn summarize(series: &MergedSeries, column: Column) -> Result<ColumnSummary, PipelineError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;

    for (_, value) in series.column(column) {
        let Some(v) = value else { continue };
        sum += v;
        count += 1;
        max = max.max(v);
        min = min.min(v);
    }

    if count == 0 {
        return Err(PipelineError::EmptyColumn { column });
    }

    // Clamp against float rounding so `min <= mean <= max` always holds.
    let mean = (sum / count as f64).clamp(min, max);

    Ok(ColumnSummary {
        column,
        mean,
        max,
        min,
        count,
    })
}

/// Summaries for every header column. Fails if any column is empty.
pub fn summary_metrics(series: &MergedSeries, columns: &[Column]) -> Result<SummaryMetrics, PipelineError> {
    let columns = columns
        .iter()
        .map(|&c| summarize(series, c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SummaryMetrics { columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecasts, Measurements, SeriesRow};
    use chrono::NaiveDate;

    fn series(oil: &[Option<f64>]) -> MergedSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        MergedSeries {
            rows: oil
                .iter()
                .enumerate()
                .map(|(i, &v)| SeriesRow {
                    date: start + chrono::Duration::days(i as i64),
                    measurements: Measurements {
                        oil_vol: v,
                        ..Measurements::default()
                    },
                    forecasts: Forecasts::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn three_day_scenario() {
        let s = series(&[Some(10.0), Some(20.0), Some(30.0)]);
        let summary = summarize(&s, Column::OilVol).unwrap();
        assert!((summary.mean - 20.0).abs() < 1e-12);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn nulls_are_skipped() {
        let s = series(&[None, Some(4.0), None, Some(8.0)]);
        let summary = summarize(&s, Column::OilVol).unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.mean - 6.0).abs() < 1e-12);
    }

    #[test]
    fn all_null_column_is_an_error() {
        let s = series(&[None, None]);
        assert_eq!(
            summarize(&s, Column::OilVol).unwrap_err(),
            PipelineError::EmptyColumn {
                column: Column::OilVol
            }
        );
        assert!(summarize(&MergedSeries::default(), Column::GasVol).is_err());
    }

    #[test]
    fn mean_lies_between_min_and_max() {
        let values = [0.1, 0.2, 0.3, 1e9, -4.5, 0.1 + 0.2, 7.0];
        for n in 1..=values.len() {
            let s = series(&values[..n].iter().copied().map(Some).collect::<Vec<_>>());
            let summary = summarize(&s, Column::OilVol).unwrap();
            assert!(summary.min <= summary.mean && summary.mean <= summary.max);
        }
    }

    #[test]
    fn header_metrics_are_all_or_nothing() {
        let s = series(&[Some(1.0), Some(2.0)]);
        let metrics = summary_metrics(&s, &[Column::OilVol]).unwrap();
        assert_eq!(metrics.get(Column::OilVol).unwrap().max, 2.0);

        let err = summary_metrics(&s, &[Column::OilVol, Column::WorkHours]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::EmptyColumn {
                column: Column::WorkHours
            }
        );
    }
}
