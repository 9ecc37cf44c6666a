//! Price chart rendering
//!
//! [`ChartRenderer`] is the seam between request handling and the drawing
//! backend; [`PlottersChartRenderer`] draws PNG images with `plotters`.

pub mod render;

pub use render::PlottersChartRenderer;

use crate::error::Result;
use crate::model::{PricePoint, PriceSeries};

/// Line colors of a comparison, by request position (blue, orange, green, red)
pub const PALETTE: [(u8, u8, u8); 4] = [(0, 0, 255), (255, 165, 0), (0, 128, 0), (255, 0, 0)];

/// Rendered image plus the caption it should be sent with
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub png: Vec<u8>,
    pub caption: String,
}

/// Draws price series to an in-memory image
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send + Sync {
    /// Recent window of one series
    fn render_single(&self, series: &PriceSeries) -> Result<Chart>;

    /// All series on a shared date axis; `None` when no series has data
    fn render_comparison(&self, series: &[PriceSeries]) -> Result<Option<Chart>>;
}

/// One labelled line of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine<'a> {
    pub label: &'a str,
    pub color: (u8, u8, u8),
    pub points: &'a [PricePoint],
}

/// Lines of a comparison; colors follow request position even when a series is skipped
pub fn comparison_lines(series: &[PriceSeries]) -> Vec<ChartLine<'_>> {
    series
        .iter()
        .zip(PALETTE.iter().cycle())
        .filter(|(s, _)| !s.is_empty())
        .map(|(s, color)| ChartLine {
            label: s.symbol(),
            color: *color,
            points: s.points(),
        })
        .collect()
}

/// "3-Month" for the default 90 points, otherwise "N-Session"
pub fn window_label(points: usize) -> String {
    match points {
        90 => "3-Month".to_string(),
        n => format!("{n}-Session"),
    }
}

/// "1-Year" style label for a history range
pub fn range_label(range: &str) -> String {
    match range {
        "1d" => "1-Day".to_string(),
        "5d" => "5-Day".to_string(),
        "1mo" => "1-Month".to_string(),
        "3mo" => "3-Month".to_string(),
        "6mo" => "6-Month".to_string(),
        "1y" => "1-Year".to_string(),
        "2y" => "2-Year".to_string(),
        "5y" => "5-Year".to_string(),
        "10y" => "10-Year".to_string(),
        "ytd" => "Year-to-Date".to_string(),
        "max" => "All-Time".to_string(),
        other => other.to_string(),
    }
}
