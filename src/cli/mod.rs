//! Command-line parsing for the oil-well production dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code. Input paths fall back to `OWD_HISTORICAL`
//! and `OWD_FORECAST`, which may also come from a `.env` file.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartKind, Column, DuplicatePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "owd", version, about = "Oil Production Dashboard (ARIMA forecasts)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the load overview and the key indicators.
    Summary(SummaryArgs),
    /// Render ASCII charts.
    Plot(PlotArgs),
    /// Write the merged series and/or the full dashboard to disk.
    Export(ExportArgs),
    /// Print the variable guide.
    Glossary,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as the other subcommands, but
    /// renders results in a terminal UI using Ratatui.
    Tui(InputArgs),
}

/// Options shared by every subcommand that runs the pipeline.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Historical production spreadsheet (CSV, XLSX, XLS or ODS).
    #[arg(long, env = "OWD_HISTORICAL", value_name = "PATH")]
    pub historical: Option<PathBuf>,

    /// ARIMA forecast spreadsheet (CSV, XLSX, XLS or ODS).
    #[arg(long, env = "OWD_FORECAST", value_name = "PATH")]
    pub forecast: Option<PathBuf>,

    /// Use seeded synthetic well data instead of files.
    ///
    /// Also used when neither input path is given.
    #[arg(long)]
    pub demo: bool,

    /// Random seed for demo data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of daily rows of demo history.
    #[arg(long, default_value_t = 1095)]
    pub demo_days: usize,

    /// Seasonal period for the decomposition (inferred from the cadence when omitted).
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub period: Option<usize>,

    /// How to resolve dates that occur more than once.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Reject)]
    pub duplicates: DuplicatePolicy,

    /// Column to decompose.
    #[arg(long, value_enum, default_value_t = Column::OilVol, value_name = "COLUMN")]
    pub decompose: Column,
}

/// Options for `owd summary`.
#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also print the decomposition overview and the annual table.
    #[arg(long)]
    pub full: bool,
}

/// Options for `owd plot`.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Which chart to render.
    #[arg(long, value_enum, default_value_t = ChartKind::All)]
    pub chart: ChartKind,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `owd export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the merged series to CSV.
    #[arg(long, value_name = "PATH")]
    pub merged_csv: Option<PathBuf>,

    /// Write every prepared table to JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}
