//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed set of numeric columns (`Column`)
//! - per-input rows (`HistoricalRecord`, `ForecastRecord`) and the merged tables
//! - derived outputs (`SummaryMetrics`, `DecomposedSeries`, `AnnualAggregate`)
//! - run configuration (`DashboardConfig`, `DuplicatePolicy`, `DecomposeConfig`)

pub mod types;

pub use types::*;
