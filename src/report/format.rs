//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::Dashboard;
use crate::domain::{AnnualAggregate, Column, DecomposedSeries, SummaryMetrics};
use crate::error::PipelineError;

/// Inputs, row counts and date range of the merged series.
pub fn format_load_overview(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    out.push_str("=== owd - Oil Production Dashboard (ARIMA forecasts) ===\n");
    for (label, report) in [("Historical", &dashboard.historical), ("Forecast", &dashboard.forecast)] {
        out.push_str(&format!("{label:<11} {} | rows={}", report.source, report.rows_read));
        if report.duplicates_resolved > 0 {
            out.push_str(&format!(" | duplicates folded={}", report.duplicates_resolved));
        }
        out.push('\n');
    }

    let merged = &dashboard.merged;
    match (merged.first_date(), merged.last_date()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("Merged      n={} | {first} → {last}\n", merged.len()));
        }
        _ => out.push_str("Merged      n=0\n"),
    }

    out
}

/// The key-indicator header.
pub fn format_summary(summary: &SummaryMetrics) -> String {
    let mut out = String::new();
    out.push_str("Key indicators:\n");
    for s in &summary.columns {
        out.push_str(&format!(
            "  {:<11} mean={:>12} max={:>12} min={:>12} {:<7} (n={})\n",
            s.column.name(),
            fmt_thousands(s.mean),
            fmt_thousands(s.max),
            fmt_thousands(s.min),
            s.column.unit(),
            s.count,
        ));
    }
    out
}

/// Period, cadence and component ranges of a decomposition.
pub fn format_decomposition(decomposition: &DecomposedSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Seasonal decomposition of {} (additive, period={}, cadence={:?}, n={}):\n",
        decomposition.column,
        decomposition.period,
        decomposition.cadence,
        decomposition.rows.len()
    ));

    let trend: Vec<f64> = decomposition.rows.iter().filter_map(|r| r.trend).collect();
    if let (Some(first), Some(last)) = (trend.first(), trend.last()) {
        out.push_str(&format!("  trend     {} → {}\n", fmt_thousands(*first), fmt_thousands(*last)));
    }

    let seasonal = decomposition.rows.iter().take(decomposition.period).map(|r| r.seasonal);
    let (lo, hi) = min_max(seasonal);
    out.push_str(&format!("  seasonal  amplitude {}\n", fmt_thousands(hi - lo)));

    let residuals: Vec<f64> = decomposition.rows.iter().filter_map(|r| r.residual).collect();
    if !residuals.is_empty() {
        let n = residuals.len() as f64;
        let mean = residuals.iter().sum::<f64>() / n;
        let std = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();
        out.push_str(&format!("  residual  std {}\n", fmt_thousands(std)));
    }

    out
}

/// Year-by-year means, one column per requested series.
pub fn format_annual(annual: &AnnualAggregate) -> String {
    let mut out = String::new();
    out.push_str("Annual production comparison (mean per year):\n");
    out.push_str(&format!("  {:<6}", "Year"));
    for c in &annual.columns {
        out.push_str(&format!(" {:>14}", c.name()));
    }
    out.push('\n');

    for row in &annual.rows {
        out.push_str(&format!("  {:<6}", row.year));
        for v in &row.means {
            let cell = v.map(fmt_thousands).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {cell:>14}"));
        }
        out.push('\n');
    }
    out
}

/// Variable guide with units.
pub fn format_glossary() -> String {
    let mut out = String::new();
    out.push_str("Variable guide:\n");
    for (i, c) in Column::MEASUREMENTS.iter().enumerate() {
        out.push_str(&format!("  {}. {}: {} - {}\n", i + 1, c.name(), c.unit(), c.description()));
    }
    out.push_str("  Pronosticos*: ARIMA forecasts of OilVol, GasVol and WaterVol, same units.\n");
    out
}

/// A derivation that could not be produced.
pub fn format_unavailable(what: &str, err: &PipelineError) -> String {
    format!("{what}: unavailable ({err})\n")
}

/// Full text report: overview, indicators, decomposition, annual table.
pub fn format_report(dashboard: &Dashboard) -> String {
    let mut out = format_load_overview(dashboard);
    out.push('\n');

    match &dashboard.summary {
        Ok(summary) => out.push_str(&format_summary(summary)),
        Err(err) => out.push_str(&format_unavailable("Key indicators", err)),
    }
    out.push('\n');

    match &dashboard.decomposition {
        Ok(d) => out.push_str(&format_decomposition(d)),
        Err(err) => out.push_str(&format_unavailable("Seasonal decomposition", err)),
    }
    out.push('\n');

    out.push_str(&format_annual(&dashboard.annual));
    out
}

/// `1234567.891` → `1,234,567.89`.
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let s = format!("{:.2}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
