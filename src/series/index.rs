//! Date parsing and indexing.
//!
//! Raw `Fecha` keys are parsed per input (see [`key_by_date`]) before the
//! merge, so both inputs are joined on the calendar date and never on the
//! spelling of the date.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{ColumnValues, DuplicatePolicy, MergedSeries, MergedTable, SeriesRow};
use crate::error::PipelineError;
use crate::series::duplicates::resolve_duplicates;

/// Parse the raw keys of one input and make the calendar date unique within it.
///
/// Distinct raw keys that land on the same date (e.g. `2020-01-05` and
/// `2020-01-05 00:00:00`) are collapsed with `policy`. Input order is kept.
pub fn key_by_date<V: ColumnValues>(
    rows: Vec<(String, V)>,
    policy: DuplicatePolicy,
    input: &str,
) -> Result<Vec<(NaiveDate, V)>, PipelineError> {
    let keyed = rows
        .into_iter()
        .map(|(fecha, values)| Ok((parse_date(&fecha)?, values)))
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(resolve_duplicates(keyed, policy, input)?.rows)
}

/// Sort the merged table ascending by date.
///
/// The merge already keys rows by date; a repeated date here means the table
/// was built by hand and is rejected.
pub fn index(table: MergedTable) -> Result<MergedSeries, PipelineError> {
    let mut rows: Vec<SeriesRow> = table
        .rows
        .into_iter()
        .map(|row| SeriesRow {
            date: row.date,
            measurements: row.measurements,
            forecasts: row.forecasts,
        })
        .collect();
    rows.sort_by_key(|r| r.date);

    if let Some(w) = rows.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(PipelineError::DuplicateDate {
            input: "merged".to_string(),
            key: w[0].date.to_string(),
        });
    }

    Ok(MergedSeries { rows })
}

/// Parse a raw `Fecha` value.
///
/// Numeric dates with the year last are read month first (`04/03/2021` is
/// April 3rd) and day first only when the first number cannot be a month
/// (`25/03/2021`). A time component is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate, PipelineError> {
    const DATE_FMTS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

    let s = raw.trim();
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(PipelineError::DateParse {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Forecasts, Measurements, MergedRow};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: NaiveDate, oil: Option<f64>) -> MergedRow {
        MergedRow {
            date,
            measurements: Measurements {
                oil_vol: oil,
                ..Measurements::default()
            },
            forecasts: Forecasts::default(),
        }
    }

    fn oil(v: f64) -> Measurements {
        Measurements {
            oil_vol: Some(v),
            ..Measurements::default()
        }
    }

    #[test]
    fn accepts_common_spreadsheet_formats() {
        assert_eq!(parse_date("2021-03-04").unwrap(), ymd(2021, 3, 4));
        assert_eq!(parse_date("2021/03/04").unwrap(), ymd(2021, 3, 4));
        assert_eq!(parse_date(" 2021-03-04 00:00:00 ").unwrap(), ymd(2021, 3, 4));
        assert_eq!(parse_date("2021-03-04T00:00:00").unwrap(), ymd(2021, 3, 4));
    }

    #[test]
    fn ambiguous_numeric_dates_read_month_first() {
        assert_eq!(parse_date("04/03/2021").unwrap(), ymd(2021, 4, 3));
        assert_eq!(parse_date("04-03-2021").unwrap(), ymd(2021, 4, 3));
        // 25 cannot be a month, so the only valid reading is day first.
        assert_eq!(parse_date("25/03/2021").unwrap(), ymd(2021, 3, 25));
        assert_eq!(parse_date("25-03-2021").unwrap(), ymd(2021, 3, 25));
        assert!(parse_date("13/13/2021").is_err());
    }

    #[test]
    fn unparseable_value_is_a_date_error() {
        let err = parse_date("yesterday").unwrap_err();
        assert_eq!(
            err,
            PipelineError::DateParse {
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn output_is_strictly_ascending() {
        let table = MergedTable {
            rows: vec![
                row(ymd(2020, 1, 3), Some(3.0)),
                row(ymd(2020, 1, 1), Some(1.0)),
                row(ymd(2019, 12, 31), None),
                row(ymd(2020, 1, 2), Some(2.0)),
            ],
        };
        let series = index(table).unwrap();
        assert_eq!(series.len(), 4);
        assert!(series.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.first_date(), Some(ymd(2019, 12, 31)));
        assert_eq!(series.get(ymd(2020, 1, 2)).unwrap().measurements.oil_vol, Some(2.0));
    }

    #[test]
    fn repeated_date_in_a_hand_built_table_is_rejected() {
        let table = MergedTable {
            rows: vec![row(ymd(2020, 1, 1), Some(1.0)), row(ymd(2020, 1, 1), Some(2.0))],
        };
        assert!(matches!(index(table), Err(PipelineError::DuplicateDate { .. })));
    }

    #[test]
    fn keys_that_parse_to_the_same_date_follow_the_policy() {
        let rows = vec![
            ("2020-01-05".to_string(), oil(4.0)),
            ("2020-01-05 00:00:00".to_string(), oil(6.0)),
        ];
        let err = key_by_date(rows.clone(), DuplicatePolicy::Reject, "historical").unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateDate { ref input, .. } if input == "historical"));

        let keyed = key_by_date(rows, DuplicatePolicy::Mean, "historical").unwrap();
        assert_eq!(keyed, vec![(ymd(2020, 1, 5), oil(5.0))]);
    }

    #[test]
    fn bad_key_aborts_keying() {
        let rows = vec![("2020-01-01".to_string(), oil(1.0)), ("n/a".to_string(), oil(2.0))];
        assert!(matches!(
            key_by_date(rows, DuplicatePolicy::Reject, "historical"),
            Err(PipelineError::DateParse { .. })
        ));
    }
}
