//! Exports of the prepared tables.
//!
//! - merged series as CSV (same column names as the input spreadsheets)
//! - the whole dashboard as one JSON document

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::Dashboard;
use crate::domain::{AnnualAggregate, Column, DATE_COLUMN, DecomposedSeries, LoadReport, MergedSeries, SummaryMetrics};
use crate::error::AppError;

/// JSON document written by `owd export --json`.
///
/// A derivation that failed is exported as its error message instead of data.
#[derive(Debug, Serialize)]
pub struct DashboardFile<'a> {
    pub tool: &'static str,
    pub historical: &'a LoadReport,
    pub forecast: &'a LoadReport,
    pub merged: &'a MergedSeries,
    pub summary: Option<&'a SummaryMetrics>,
    pub summary_error: Option<String>,
    pub decomposition: Option<&'a DecomposedSeries>,
    pub decomposition_error: Option<String>,
    pub annual: &'a AnnualAggregate,
}

impl<'a> DashboardFile<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self {
            tool: "owd",
            historical: &dashboard.historical,
            forecast: &dashboard.forecast,
            merged: &dashboard.merged,
            summary: dashboard.summary.as_ref().ok(),
            summary_error: dashboard.summary.as_ref().err().map(|e| e.to_string()),
            decomposition: dashboard.decomposition.as_ref().ok(),
            decomposition_error: dashboard.decomposition.as_ref().err().map(|e| e.to_string()),
            annual: &dashboard.annual,
        }
    }
}

/// Write the merged series to CSV. Null values are empty cells.
pub fn write_merged_csv(path: &Path, series: &MergedSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let header = std::iter::once(DATE_COLUMN).chain(Column::all().map(Column::name));
    writer
        .write_record(header)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for row in &series.rows {
        let record = std::iter::once(row.date.format("%Y-%m-%d").to_string()).chain(
            Column::all().map(|c| row.value(c).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(record)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write every prepared table to a pretty-printed JSON file.
pub fn write_dashboard_json(path: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create dashboard JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &DashboardFile::new(dashboard))
        .map_err(|e| AppError::new(4, format!("Failed to write dashboard JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_dashboard;
    use crate::data::sample::generate_demo_inputs;
    use crate::domain::DashboardConfig;
    use crate::io::ingest::load_historical;
    use crate::domain::DuplicatePolicy;

    #[test]
    fn merged_csv_reloads_as_historical_input() {
        let (historical, forecast) = generate_demo_inputs(7, 60);
        let dashboard = build_dashboard(historical, forecast, &DashboardConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        write_merged_csv(&path, &dashboard.merged).unwrap();

        // Forecast-only dates have no measurements but still form valid rows.
        let reloaded = load_historical(&path, DuplicatePolicy::Reject).unwrap();
        assert_eq!(reloaded.rows.len(), dashboard.merged.len());
        let first = &dashboard.merged.rows[0];
        assert_eq!(reloaded.rows[0].values.oil_vol, first.measurements.oil_vol);
    }

    #[test]
    fn json_export_carries_failed_derivations_as_messages() {
        let (historical, forecast) = generate_demo_inputs(7, 10);
        let dashboard = build_dashboard(historical, forecast, &DashboardConfig::default()).unwrap();
        assert!(dashboard.decomposition.is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        write_dashboard_json(&path, &dashboard).unwrap();

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "owd");
        assert!(value["decomposition"].is_null());
        assert!(value["decomposition_error"].as_str().unwrap().contains("OilVol"));
        assert!(value["summary"]["columns"].is_array());
    }
}
