//! Full outer join of the historical and forecast tables on the calendar date.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{DuplicatePolicy, Forecasts, ForecastTable, HistoricalTable, Measurements, MergedRow, MergedTable};
use crate::error::PipelineError;
use crate::series::index::key_by_date;

/// Outer-join both inputs on `Fecha`.
///
/// Each input's keys are parsed first, so `2020-01-05` in one file and
/// `01/05/2020` in the other land in the same row. A date repeated within one
/// input is resolved with `policy`. Fields of the side without a matching row
/// stay null. Output order: historical dates first, then forecast-only dates,
/// each in input order.
pub fn merge(
    historical: &HistoricalTable,
    forecast: &ForecastTable,
    policy: DuplicatePolicy,
) -> Result<MergedTable, PipelineError> {
    let historical_rows = key_by_date(
        historical.rows.iter().map(|r| (r.fecha.clone(), r.values)).collect(),
        policy,
        "historical",
    )?;
    let forecast_rows = key_by_date(
        forecast.rows.iter().map(|r| (r.fecha.clone(), r.values)).collect(),
        policy,
        "forecast",
    )?;

    let mut slots: HashMap<NaiveDate, usize> = HashMap::with_capacity(historical_rows.len() + forecast_rows.len());
    let mut rows: Vec<MergedRow> = Vec::with_capacity(historical_rows.len() + forecast_rows.len());

    for (date, measurements) in historical_rows {
        slots.insert(date, rows.len());
        rows.push(MergedRow {
            date,
            measurements,
            forecasts: Forecasts::default(),
        });
    }

    let mut overlap = 0usize;
    for (date, forecasts) in forecast_rows {
        match slots.get(&date) {
            Some(&slot) => {
                rows[slot].forecasts = forecasts;
                overlap += 1;
            }
            None => {
                slots.insert(date, rows.len());
                rows.push(MergedRow {
                    date,
                    measurements: Measurements::default(),
                    forecasts,
                });
            }
        }
    }

    tracing::info!(
        historical = historical.rows.len(),
        forecast = forecast.rows.len(),
        overlap,
        merged = rows.len(),
        "merged inputs on date"
    );

    Ok(MergedTable { rows })
}
