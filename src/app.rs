//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the dashboard pipeline
//! - prints reports/plots or writes exports

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, InputArgs, PlotArgs, SummaryArgs};
use crate::domain::{Column, DashboardConfig, DecomposeConfig, InputSource};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable holding the log filter (e.g. `info`, `oilwell_dash=debug`).
pub const LOG_ENV: &str = "OWD_LOG";

/// Entry point for the `owd` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; real environment variables win over it.
    dotenvy::dotenv().ok();

    // We want `owd` and `owd --demo` to behave like `owd tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines on stderr would tear the TUI's alternate screen.
    let default_level = if matches!(cli.command, Command::Tui(_)) { "off" } else { "warn" };
    init_tracing(default_level);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Glossary => {
            println!("{}", crate::report::format_glossary());
            Ok(())
        }
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.input)?;
    let dashboard = pipeline::run_dashboard(&config)?;

    if args.full {
        println!("{}", crate::report::format_report(&dashboard));
        return Ok(());
    }

    println!("{}", crate::report::format_load_overview(&dashboard));
    match &dashboard.summary {
        Ok(summary) => println!("{}", crate::report::format_summary(summary)),
        Err(err) => return Err(err.clone().into()),
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.input)?;
    let dashboard = pipeline::run_dashboard(&config)?;

    let plot = crate::plot::render_chart(&dashboard, args.chart, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.merged_csv.is_none() && args.json.is_none() {
        return Err(AppError::new(2, "Nothing to export: pass --merged-csv and/or --json."));
    }

    let config = config_from_args(&args.input)?;
    let dashboard = pipeline::run_dashboard(&config)?;

    if let Some(path) = &args.merged_csv {
        crate::io::export::write_merged_csv(path, &dashboard.merged)?;
        tracing::info!(path = %path.display(), rows = dashboard.merged.len(), "wrote merged CSV");
    }
    if let Some(path) = &args.json {
        crate::io::export::write_dashboard_json(path, &dashboard)?;
        tracing::info!(path = %path.display(), "wrote dashboard JSON");
    }

    Ok(())
}

fn handle_tui(args: InputArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    crate::tui::run(config)
}

/// Resolve CLI/env input options into a pipeline config.
///
/// Demo mode is used when `--demo` is set or when neither input path is given.
pub fn config_from_args(args: &InputArgs) -> Result<DashboardConfig, AppError> {
    let source = match (&args.historical, &args.forecast, args.demo) {
        (_, _, true) | (None, None, false) => InputSource::Demo {
            seed: args.seed,
            days: args.demo_days,
        },
        (Some(historical), Some(forecast), false) => InputSource::Files {
            historical: historical.clone(),
            forecast: forecast.clone(),
        },
        (Some(_), None, false) => {
            return Err(AppError::new(2, "Missing forecast input: pass --forecast or set OWD_FORECAST."));
        }
        (None, Some(_), false) => {
            return Err(AppError::new(2, "Missing historical input: pass --historical or set OWD_HISTORICAL."));
        }
    };

    Ok(DashboardConfig {
        source,
        duplicates: args.duplicates,
        decompose: DecomposeConfig {
            column: args.decompose,
            period: args.period,
        },
        summary_columns: Column::REQUIRED_HISTORICAL.to_vec(),
        annual_columns: vec![Column::OilVol, Column::WaterVol, Column::GasVol],
    })
}

/// Rewrite argv so `owd` defaults to `owd tui`.
///
/// Rules:
/// - `owd`                      -> `owd tui`
/// - `owd --demo ...`           -> `owd tui --demo ...`
/// - `owd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "plot" | "export" | "glossary" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DuplicatePolicy;
    use std::path::PathBuf;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn input_args() -> InputArgs {
        InputArgs {
            historical: None,
            forecast: None,
            demo: false,
            seed: 7,
            demo_days: 100,
            period: None,
            duplicates: DuplicatePolicy::Reject,
            decompose: Column::OilVol,
        }
    }

    #[test]
    fn bare_invocation_becomes_tui() {
        assert_eq!(rewrite_args(argv(&["owd"])), argv(&["owd", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["owd", "--demo", "--seed", "3"])),
            argv(&["owd", "tui", "--demo", "--seed", "3"])
        );
        assert_eq!(rewrite_args(argv(&["owd", "--help"])), argv(&["owd", "--help"]));
        assert_eq!(rewrite_args(argv(&["owd", "plot"])), argv(&["owd", "plot"]));
    }

    #[test]
    fn no_paths_means_demo() {
        let config = config_from_args(&input_args()).unwrap();
        assert_eq!(config.source, InputSource::Demo { seed: 7, days: 100 });
    }

    #[test]
    fn both_paths_mean_files_and_one_path_is_an_error() {
        let mut args = input_args();
        args.historical = Some(PathBuf::from("h.csv"));
        assert_eq!(config_from_args(&args).unwrap_err().exit_code(), 2);

        args.forecast = Some(PathBuf::from("f.csv"));
        args.period = Some(12);
        let config = config_from_args(&args).unwrap();
        assert!(matches!(config.source, InputSource::Files { .. }));
        assert_eq!(config.decompose.period, Some(12));

        args.demo = true;
        assert!(matches!(
            config_from_args(&args).unwrap().source,
            InputSource::Demo { .. }
        ));
    }
}
