//! Ratatui-based terminal UI.
//!
//! The TUI shows the key indicators in a header, one chart per tab (oil,
//! water and gas against their forecasts, the seasonal decomposition, and the
//! annual comparison) and an optional glossary sidebar. `r` re-runs the whole
//! pipeline from the inputs.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::pipeline::{Dashboard, run_dashboard};
use crate::domain::{ChartKind, Column, DashboardConfig, DecomposedSeries};
use crate::error::AppError;
use crate::report::fmt_thousands;

mod plotters_chart;

use plotters_chart::{ChartLine, DashboardPlottersChart};

/// Chart tabs, in display order.
const TABS: [ChartKind; 5] = [
    ChartKind::Oil,
    ChartKind::Water,
    ChartKind::Gas,
    ChartKind::Decomposition,
    ChartKind::Annual,
];

/// (plotters color, ratatui color) pairs; the legend must match the lines.
const ACTUAL_COLOR: (RGBColor, Color) = (RGBColor(0, 255, 255), Color::Cyan);
const FORECAST_COLOR: (RGBColor, Color) = (RGBColor(255, 255, 0), Color::Yellow);
const COMPONENT_COLOR: (RGBColor, Color) = (RGBColor(0, 255, 0), Color::Green);

/// Start the TUI.
///
/// The first pipeline run happens before the terminal is switched over, so a
/// bad input is reported like in the other subcommands.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let dashboard = run_dashboard(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, dashboard);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: DashboardConfig,
    dashboard: Dashboard,
    tab: usize,
    show_glossary: bool,
    reloads: usize,
    status: String,
}

impl App {
    fn new(config: DashboardConfig, dashboard: Dashboard) -> Self {
        let status = format!("Loaded {} rows.", dashboard.merged.len());
        Self {
            config,
            dashboard,
            tab: 0,
            show_glossary: false,
            reloads: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => self.tab = (self.tab + 1) % TABS.len(),
            KeyCode::Left | KeyCode::BackTab => self.tab = (self.tab + TABS.len() - 1) % TABS.len(),
            KeyCode::Char(c @ '1'..='5') => self.tab = c as usize - '1' as usize,
            KeyCode::Char('g') => self.show_glossary = !self.show_glossary,
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    /// Re-run the pipeline. On failure the previous tables stay on screen.
    fn reload(&mut self) {
        match run_dashboard(&self.config) {
            Ok(dashboard) => {
                self.reloads += 1;
                self.status = format!("Reloaded {} rows (reload #{}).", dashboard.merged.len(), self.reloads);
                self.dashboard = dashboard;
            }
            Err(err) => {
                tracing::warn!(%err, "reload failed");
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let summary_rows = self.config.summary_columns.len().max(1) as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(summary_rows + 3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let merged = &self.dashboard.merged;
        let range = match (merged.first_date(), merged.last_date()) {
            (Some(first), Some(last)) => format!("{first} → {last}"),
            _ => "-".to_string(),
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("owd", Style::default().fg(Color::Cyan)),
            Span::raw(" - Oil Production Dashboard (ARIMA forecasts)"),
            Span::styled(
                format!("  | {} | {} | n={}", self.dashboard.historical.source, range, merged.len()),
                Style::default().fg(Color::Gray),
            ),
        ]));

        match &self.dashboard.summary {
            Ok(summary) => {
                for s in &summary.columns {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{:<10}", s.column.name()), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(format!(
                            " mean {:>12}  max {:>12}  min {:>12}  {}",
                            fmt_thousands(s.mean),
                            fmt_thousands(s.max),
                            fmt_thousands(s.min),
                            s.column.unit(),
                        )),
                    ]));
                }
            }
            Err(err) => lines.push(Line::from(Span::styled(
                format!("Key indicators unavailable: {err}"),
                Style::default().fg(Color::Red),
            ))),
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = TABS
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, tab_title(*t))))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart_area = if self.show_glossary {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(42)])
                .split(area);
            draw_glossary(frame, chunks[1]);
            chunks[0]
        } else {
            area
        };

        let tab = TABS[self.tab];
        match tab {
            ChartKind::Decomposition => self.draw_decomposition(frame, chart_area),
            ChartKind::Annual => self.draw_annual(frame, chart_area),
            _ => self.draw_volume(frame, chart_area, tab),
        }
    }

    fn draw_volume(&self, frame: &mut ratatui::Frame<'_>, area: Rect, tab: ChartKind) {
        let Some(column) = tab.volume_column() else {
            return;
        };

        let mut lines = Vec::with_capacity(2);
        if let Some(forecast) = column.forecast() {
            lines.push(PreparedLine::new(forecast.name(), FORECAST_COLOR, self.dashboard.merged.column(forecast)));
        }
        lines.push(PreparedLine::new(column.name(), ACTUAL_COLOR, self.dashboard.merged.column(column)));

        let title = format!("{} vs forecast", column.name());
        draw_line_chart(frame, area, &title, &lines, column.unit());
    }

    fn draw_decomposition(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let decomposition = match &self.dashboard.decomposition {
            Ok(d) => d,
            Err(err) => {
                let block = Block::default().title("Seasonal decomposition").borders(Borders::ALL);
                let msg = Paragraph::new(format!("Unavailable: {err}"))
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(msg, area);
                return;
            }
        };

        let panels = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (i, (label, points)) in decomposition_panels(decomposition).into_iter().enumerate() {
            let title = if i == 0 {
                format!(
                    "{label} ({}, additive, period={})",
                    decomposition.column, decomposition.period
                )
            } else {
                label.to_string()
            };
            let line = [PreparedLine::new(label, COMPONENT_COLOR, points)];
            draw_line_chart(frame, panels[i], &title, &line, decomposition.column.unit());
        }
    }

    fn draw_annual(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let annual = &self.dashboard.annual;
        let block = Block::default()
            .title("Annual production comparison (mean per year)")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if annual.rows.is_empty() || annual.columns.is_empty() {
            frame.render_widget(Paragraph::new("No data.").style(Style::default().fg(Color::Yellow)), inner);
            return;
        }

        // One chart per column: gas volumes dwarf oil and water on a shared axis.
        let n = annual.columns.len() as u32;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, n); annual.columns.len()])
            .split(inner);

        let bar_width = annual_bar_width(inner.width, annual.columns.len(), annual.rows.len());

        for (i, column) in annual.columns.iter().enumerate() {
            let bars: Vec<Bar> = annual_bars(annual, i)
                .into_iter()
                .map(|(year, value)| {
                    Bar::default()
                        .label(Line::from(year.to_string()))
                        .value(value.map(|v| v.max(0.0).round() as u64).unwrap_or(0))
                        .text_value(value.map(compact).unwrap_or_else(|| "-".to_string()))
                })
                .collect();

            let chart = BarChart::default()
                .block(
                    Block::default()
                        .title(format!("{} ({})", column.name(), column.unit()))
                        .borders(Borders::ALL),
                )
                .data(BarGroup::default().bars(&bars))
                .bar_width(bar_width)
                .bar_gap(1)
                .bar_style(Style::default().fg(ACTUAL_COLOR.1))
                .value_style(Style::default().fg(Color::Black).bg(ACTUAL_COLOR.1));

            frame.render_widget(chart, chunks[i]);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ tab  1-5 jump  g glossary  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn tab_title(tab: ChartKind) -> &'static str {
    match tab {
        ChartKind::Oil => "Oil",
        ChartKind::Water => "Water",
        ChartKind::Gas => "Gas",
        ChartKind::Decomposition => "Decomposition",
        ChartKind::Annual => "Annual",
        ChartKind::All => "All",
    }
}

fn draw_glossary(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for c in Column::MEASUREMENTS {
        lines.push(Line::from(vec![
            Span::styled(c.name(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" ({})", c.unit()), Style::default().fg(Color::Gray)),
        ]));
        lines.push(Line::from(c.description()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Pronosticos*: ARIMA forecasts, same units.",
        Style::default().fg(Color::Gray),
    )));

    let p = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Variable guide").borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(p, area);
}

/// A chart line with its legend entry, split at null values.
struct PreparedLine {
    label: String,
    color: (RGBColor, Color),
    segments: Vec<Vec<(f64, f64)>>,
}

impl PreparedLine {
    fn new(
        label: &str,
        color: (RGBColor, Color),
        points: impl IntoIterator<Item = (NaiveDate, Option<f64>)>,
    ) -> Self {
        Self {
            label: label.to_string(),
            color,
            segments: segments(points),
        }
    }
}

fn draw_line_chart(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, lines: &[PreparedLine], y_label: &str) {
    let mut spans = vec![Span::raw(format!("{title} "))];
    for line in lines {
        spans.push(Span::styled(format!("── {} ", line.label), Style::default().fg(line.color.1)));
    }
    let block = Block::default().title(Line::from(spans)).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let all: Vec<&[Vec<(f64, f64)>]> = lines.iter().map(|l| l.segments.as_slice()).collect();
    let Some((x_bounds, y_bounds)) = bounds(&all) else {
        let msg = Paragraph::new("No data.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    };

    let chart_lines: Vec<ChartLine> = lines
        .iter()
        .map(|l| ChartLine {
            segments: &l.segments,
            color: l.color.0,
        })
        .collect();

    let widget = DashboardPlottersChart {
        lines: &chart_lines,
        x_bounds,
        y_bounds,
        y_label,
        fmt_x: fmt_axis_date,
        fmt_y: fmt_axis_value,
    };
    frame.render_widget(widget, inner);
}

fn decomposition_panels(d: &DecomposedSeries) -> [(&'static str, Vec<(NaiveDate, Option<f64>)>); 4] {
    [
        ("observed", d.rows.iter().map(|r| (r.date, Some(r.observed))).collect()),
        ("trend", d.rows.iter().map(|r| (r.date, r.trend)).collect()),
        ("seasonal", d.rows.iter().map(|r| (r.date, Some(r.seasonal))).collect()),
        ("residual", d.rows.iter().map(|r| (r.date, r.residual)).collect()),
    ]
}

fn annual_bars(annual: &crate::domain::AnnualAggregate, column_index: usize) -> Vec<(i32, Option<f64>)> {
    annual
        .rows
        .iter()
        .map(|r| (r.year, r.means.get(column_index).copied().flatten()))
        .collect()
}

/// Bar width that fits every year of every column side by side, between 3 and 9 cells.
fn annual_bar_width(inner_width: u16, columns: usize, years: usize) -> u16 {
    let slots = columns.saturating_mul(years.max(1)).saturating_add(1);
    let width = usize::from(inner_width) / slots;
    u16::try_from(width).unwrap_or(u16::MAX).clamp(3, 9)
}

/// Chart x coordinate of a date.
fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Split a series into runs of consecutive non-null, finite values.
fn segments(points: impl IntoIterator<Item = (NaiveDate, Option<f64>)>) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (date, value) in points {
        match value.filter(|v| v.is_finite()) {
            Some(y) => current.push((day_number(date), y)),
            None => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// X/Y bounds over every point, with 5% y padding. `None` when there is nothing to draw.
fn bounds(lines: &[&[Vec<(f64, f64)>]]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in lines.iter().flat_map(|l| l.iter()).flatten() {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !y_min.is_finite() {
        return None;
    }
    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    compact(v)
}

/// Short number for tick and bar labels: `1234.5` → `1.2k`.
fn compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else if a >= 10.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}
