//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - measured values: `*`
//! - forecasts: `+`
//! - decomposition components: `-`
//!
//! A null value breaks the line, so gaps in the data stay visible.

use chrono::{Datelike, NaiveDate};

use crate::app::pipeline::Dashboard;
use crate::domain::{AnnualAggregate, ChartKind, Column, DecomposedSeries, MergedSeries};
use crate::report::{fmt_thousands, format_unavailable};

/// One line of a date chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub marker: char,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl LineSeries {
    pub fn new(label: impl Into<String>, marker: char, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        Self {
            label: label.into(),
            marker,
            points,
        }
    }
}

/// Render the selected chart(s) of a dashboard.
pub fn render_chart(dashboard: &Dashboard, chart: ChartKind, width: usize, height: usize) -> String {
    match chart {
        ChartKind::Oil | ChartKind::Water | ChartKind::Gas => match chart.volume_column() {
            Some(column) => render_volume_chart(&dashboard.merged, column, width, height),
            None => String::new(),
        },
        ChartKind::Decomposition => match &dashboard.decomposition {
            Ok(d) => render_decomposition(d, width, height),
            Err(err) => format_unavailable("Seasonal decomposition", err),
        },
        ChartKind::Annual => render_annual_bars(&dashboard.annual, width),
        ChartKind::All => [
            ChartKind::Oil,
            ChartKind::Water,
            ChartKind::Gas,
            ChartKind::Decomposition,
            ChartKind::Annual,
        ]
        .into_iter()
        .map(|c| render_chart(dashboard, c, width, height))
        .collect::<Vec<_>>()
        .join("\n"),
    }
}

/// Measured volume and its forecast over the whole merged date range.
pub fn render_volume_chart(series: &MergedSeries, column: Column, width: usize, height: usize) -> String {
    let mut lines = Vec::with_capacity(2);
    if let Some(forecast) = column.forecast() {
        lines.push(LineSeries::new(forecast.name(), '+', series.column(forecast).collect()));
    }
    lines.push(LineSeries::new(column.name(), '*', series.column(column).collect()));

    let title = format!("{} vs forecast ({})", column.name(), column.unit());
    render_line_chart(&title, &lines, width, height)
}

/// Observed, trend, seasonal and residual panels stacked vertically.
pub fn render_decomposition(decomposition: &DecomposedSeries, width: usize, height: usize) -> String {
    let panel_height = (height / 4).max(3);
    let rows = &decomposition.rows;

    let panels = [
        ("observed", rows.iter().map(|r| (r.date, Some(r.observed))).collect::<Vec<_>>()),
        ("trend", rows.iter().map(|r| (r.date, r.trend)).collect()),
        ("seasonal", rows.iter().map(|r| (r.date, Some(r.seasonal))).collect()),
        ("residual", rows.iter().map(|r| (r.date, r.residual)).collect()),
    ];

    let mut out = format!(
        "Seasonal decomposition of {} (period={})\n",
        decomposition.column, decomposition.period
    );
    for (label, points) in panels {
        let series = [LineSeries::new(label, '-', points)];
        out.push_str(&render_line_chart(label, &series, width, panel_height));
    }
    out
}

/// Horizontal bars of yearly means. Each column is scaled to its own maximum.
pub fn render_annual_bars(annual: &AnnualAggregate, width: usize) -> String {
    let bar_width = width.saturating_sub(30).max(10);

    let mut out = String::from("Annual production comparison (mean per year, bars scaled per column)\n");
    if annual.rows.is_empty() {
        out.push_str("  no data\n");
        return out;
    }

    let maxima: Vec<f64> = (0..annual.columns.len())
        .map(|i| {
            annual
                .rows
                .iter()
                .filter_map(|r| r.means.get(i).copied().flatten())
                .fold(0.0, f64::max)
        })
        .collect();

    for row in &annual.rows {
        for (i, column) in annual.columns.iter().enumerate() {
            let label = if i == 0 { row.year.to_string() } else { String::new() };
            let value = row.means.get(i).copied().flatten();

            let len = match value {
                Some(v) if maxima[i] > 0.0 => ((v.max(0.0) / maxima[i]) * bar_width as f64).round() as usize,
                _ => 0,
            };
            let bar = "#".repeat(len.min(bar_width));
            let text = value.map(fmt_thousands).unwrap_or_else(|| "-".to_string());

            out.push_str(&format!("{label:<5} {:<10}|{bar:<bar_width$} {text}\n", column.name()));
        }
    }
    out
}

/// Render one or more date series onto a shared grid.
///
/// Series are drawn in order; a later series' markers overwrite earlier lines.
pub fn render_line_chart(title: &str, series: &[LineSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(3);

    let Some((x_min, x_max)) = x_range(series) else {
        return format!("{title} | no data\n");
    };
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for s in series {
        let mut prev: Option<(usize, usize)> = None;
        for &(date, value) in &s.points {
            let Some(y) = value.filter(|v| v.is_finite()) else {
                prev = None;
                continue;
            };
            let x = map_x(day_number(date), x_min, x_max, width);
            let yy = map_y(y, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, yy, s.marker);
            }
            grid[yy][x] = s.marker;
            prev = Some((x, yy));
        }
    }

    let first = from_day_number(x_min);
    let last = from_day_number(x_max);

    let mut out = String::new();
    out.push_str(&format!("{title} | {first} → {last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.marker, s.label)).collect();
    out.push_str(&format!("  {}\n", legend.join("  ")));
    out
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn from_day_number(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
        .map(|d| d.to_string())
        .unwrap_or_default()
}

/// Date range covered by non-null points. A single date is widened by a day each side.
fn x_range(series: &[LineSeries]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for s in series {
        for &(date, value) in &s.points {
            if value.is_some_and(f64::is_finite) {
                let x = day_number(date);
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
    }
    if !min_x.is_finite() || !max_x.is_finite() {
        return None;
    }
    if max_x > min_x {
        Some((min_x, max_x))
    } else {
        Some((min_x - 1.0, max_x + 1.0))
    }
}

fn y_range(series: &[LineSeries]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for y in series.iter().flat_map(|s| s.points.iter().filter_map(|p| p.1)) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
