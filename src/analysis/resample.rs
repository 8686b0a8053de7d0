//! Calendar-year resampling for the annual comparison chart.

use chrono::Datelike;

use crate::domain::{AnnualAggregate, AnnualRow, Column, MergedSeries};

/// Mean of each requested column per calendar year.
///
/// Emits one row for every year from the first to the last date, so a year
/// with no rows (or only nulls) still appears with `None` means.
pub fn resample_annual(series: &MergedSeries, columns: &[Column]) -> AnnualAggregate {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return AnnualAggregate {
            columns: columns.to_vec(),
            rows: Vec::new(),
        };
    };

    let first_year = first.year();
    let years = (last.year() - first_year + 1) as usize;
    let mut sums = vec![vec![0.0; columns.len()]; years];
    let mut counts = vec![vec![0usize; columns.len()]; years];

    for row in &series.rows {
        let y = (row.date.year() - first_year) as usize;
        for (c, &column) in columns.iter().enumerate() {
            if let Some(v) = row.value(column) {
                sums[y][c] += v;
                counts[y][c] += 1;
            }
        }
    }

    let rows = (0..years)
        .map(|y| AnnualRow {
            year: first_year + y as i32,
            means: sums[y]
                .iter()
                .zip(&counts[y])
                .map(|(&s, &n)| (n > 0).then(|| s / n as f64))
                .collect(),
        })
        .collect();

    AnnualAggregate {
        columns: columns.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecasts, Measurements, SeriesRow};
    use chrono::NaiveDate;

    fn row(y: i32, m: u32, d: u32, oil: Option<f64>, water: Option<f64>) -> SeriesRow {
        SeriesRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            measurements: Measurements {
                oil_vol: oil,
                water_vol: water,
                ..Measurements::default()
            },
            forecasts: Forecasts::default(),
        }
    }

    #[test]
    fn one_row_per_calendar_year() {
        let series = MergedSeries {
            rows: vec![
                row(2019, 12, 30, Some(2.0), None),
                row(2019, 12, 31, Some(4.0), Some(1.0)),
                row(2020, 1, 1, Some(10.0), Some(3.0)),
                row(2020, 6, 1, Some(20.0), Some(5.0)),
                row(2021, 2, 1, None, Some(7.0)),
            ],
        };
        let annual = resample_annual(&series, &[Column::OilVol, Column::WaterVol]);

        let years: Vec<i32> = annual.rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2019, 2020, 2021]);
        assert_eq!(annual.value(2019, Column::OilVol), Some(3.0));
        assert_eq!(annual.value(2019, Column::WaterVol), Some(1.0));
        assert_eq!(annual.value(2020, Column::OilVol), Some(15.0));
        assert_eq!(annual.value(2021, Column::OilVol), None);
        assert_eq!(annual.value(2021, Column::WaterVol), Some(7.0));
    }

    #[test]
    fn years_without_rows_are_still_spanned() {
        let series = MergedSeries {
            rows: vec![row(2018, 3, 1, Some(1.0), None), row(2020, 3, 1, Some(3.0), None)],
        };
        let annual = resample_annual(&series, &[Column::OilVol]);
        assert_eq!(annual.rows.len(), 3);
        assert_eq!(annual.rows[1].year, 2019);
        assert_eq!(annual.rows[1].means, vec![None]);
    }

    #[test]
    fn empty_series_has_no_years() {
        let annual = resample_annual(&MergedSeries::default(), &[Column::GasVol]);
        assert!(annual.rows.is_empty());
        assert_eq!(annual.columns, vec![Column::GasVol]);
    }
}
