//! `oilwell-dash` library crate.
//!
//! The binary (`owd`) is a thin wrapper around this library so that:
//!
//! - the data-preparation pipeline is testable without spawning processes
//! - every front-end (text report, ASCII plot, export, TUI) consumes the same
//!   prepared tables
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
