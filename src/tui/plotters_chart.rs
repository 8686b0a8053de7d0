//! Plotters-powered time-series chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - broken lines (null gaps) are just separate line series
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One plotted line, already split into contiguous non-null segments.
///
/// X values are day numbers (see `tui::day_number`).
pub struct ChartLine<'a> {
    pub segments: &'a [Vec<(f64, f64)>],
    pub color: RGBColor,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct DashboardPlottersChart<'a> {
    pub lines: &'a [ChartLine<'a>],
    /// X bounds (day numbers).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DashboardPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                for segment in line.segments {
                    if segment.len() == 1 {
                        chart.draw_series(segment.iter().map(|&p| Pixel::new(p, line.color)))?;
                    } else {
                        chart.draw_series(plotters::series::LineSeries::new(segment.iter().copied(), &line.color))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
