//! Shared dashboard pipeline used by every front-end (report, plot, export, TUI).
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> merge -> index -> (summary | decomposition | annual)
//!
//! The pipeline is a pure function of its inputs and config: calling it twice
//! gives the same result, and nothing is cached between calls.

use crate::analysis::{decompose, resample_annual, summary_metrics};
use crate::data::sample::generate_demo_inputs;
use crate::domain::{
    AnnualAggregate, DashboardConfig, DecomposedSeries, ForecastTable, HistoricalTable, InputSource, LoadReport,
    MergedSeries, SummaryMetrics,
};
use crate::error::PipelineError;
use crate::io::ingest::{load_forecast, load_historical};
use crate::series::{index, merge};

/// All prepared tables of one run.
///
/// Load, merge, and index failures abort the run. The summary and the
/// decomposition are independent derivations: each either succeeded
/// completely or carries the error that stopped it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub historical: LoadReport,
    pub forecast: LoadReport,
    pub merged: MergedSeries,
    pub summary: Result<SummaryMetrics, PipelineError>,
    pub decomposition: Result<DecomposedSeries, PipelineError>,
    pub annual: AnnualAggregate,
}

/// Load the configured inputs and run the full pipeline.
pub fn run_dashboard(config: &DashboardConfig) -> Result<Dashboard, PipelineError> {
    let (historical, forecast) = load_inputs(config)?;
    build_dashboard(historical, forecast, config)
}

/// Read both input tables (or generate them in demo mode).
pub fn load_inputs(config: &DashboardConfig) -> Result<(HistoricalTable, ForecastTable), PipelineError> {
    match &config.source {
        InputSource::Files { historical, forecast } => {
            let historical = load_historical(historical, config.duplicates)?;
            let forecast = load_forecast(forecast, config.duplicates)?;
            Ok((historical, forecast))
        }
        InputSource::Demo { seed, days } => Ok(generate_demo_inputs(*seed, *days)),
    }
}

/// Run the pipeline on already-loaded inputs.
pub fn build_dashboard(
    historical: HistoricalTable,
    forecast: ForecastTable,
    config: &DashboardConfig,
) -> Result<Dashboard, PipelineError> {
    let _span = tracing::info_span!("dashboard").entered();

    let merged = merge(&historical, &forecast, config.duplicates)?;
    let merged = index(merged)?;

    let summary = summary_metrics(&merged, &config.summary_columns);
    let decomposition = decompose(&merged, &config.decompose);
    let annual = resample_annual(&merged, &config.annual_columns);

    if let Err(err) = &summary {
        tracing::warn!(%err, "summary metrics unavailable");
    }
    if let Err(err) = &decomposition {
        tracing::warn!(%err, "seasonal decomposition unavailable");
    }

    Ok(Dashboard {
        historical: historical.report,
        forecast: forecast.report,
        merged,
        summary,
        decomposition,
        annual,
    })
}
