//! Input/output helpers.
//!
//! - CSV/spreadsheet ingest + validation (`ingest`)
//! - merged series and dashboard exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
