//! PNG price charts drawn with plotters

use std::io::Cursor;
use std::ops::Range;

use chrono::{Duration, NaiveDate};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;

use super::{
    Chart, ChartLine, ChartRenderer, PALETTE, comparison_lines, range_label, window_label,
};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::model::PriceSeries;

const FONT_FAMILY: &str = "sans-serif";

/// Renders line charts into an in-memory bitmap and encodes them as PNG
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    single_size: (u32, u32),
    compare_size: (u32, u32),
    chart_points: usize,
    history_range: String,
}

impl PlottersChartRenderer {
    pub fn new(config: &StockConfig) -> Self {
        Self {
            single_size: config.single_chart_size,
            compare_size: config.compare_chart_size,
            chart_points: config.chart_points,
            history_range: config.history_range.clone(),
        }
    }

    pub fn single_title(&self, symbol: &str) -> String {
        format!("{symbol} - {} Price Chart", window_label(self.chart_points))
    }

    pub fn single_caption(&self, symbol: &str) -> String {
        format!("📉 {symbol} {} Chart", window_label(self.chart_points))
    }

    pub fn comparison_title(&self, symbols: &[&str]) -> String {
        format!(
            "{} - {} Price Chart",
            symbols.join(" vs "),
            range_label(&self.history_range)
        )
    }

    pub fn comparison_caption(&self, symbols: &[&str]) -> String {
        format!(
            "📉 Price comparison {} ({})",
            symbols.join(", "),
            range_label(&self.history_range)
        )
    }

    fn draw(
        &self,
        (width, height): (u32, u32),
        title: &str,
        lines: &[ChartLine<'_>],
    ) -> Result<Vec<u8>> {
        let (x_range, y_range) = axis_ranges(lines)
            .ok_or_else(|| StockError::ChartError("no price data to draw".to_string()))?;

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(chart_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT_FAMILY, 28).into_font())
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d(x_range, y_range)
                .map_err(chart_error)?;

            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Price (USD)")
                .x_labels(8)
                .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
                .y_label_formatter(&|v: &f64| format!("{v:.2}"))
                .bold_line_style(BLACK.mix(0.15))
                .light_line_style(BLACK.mix(0.05))
                .draw()
                .map_err(chart_error)?;

            for line in lines {
                let color = RGBColor(line.color.0, line.color.1, line.color.2);
                chart
                    .draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p.date, p.close)),
                        color.stroke_width(2),
                    ))
                    .map_err(chart_error)?
                    .label(line.label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_error)?;

            root.present().map_err(chart_error)?;
        }

        encode_png(buffer, width, height)
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render_single(&self, series: &PriceSeries) -> Result<Chart> {
        let window = series.tail(self.chart_points);
        if window.is_empty() {
            return Err(StockError::ChartError(format!(
                "no price data for {}",
                series.symbol()
            )));
        }

        let line = ChartLine {
            label: series.symbol(),
            color: PALETTE[0],
            points: window,
        };
        let png = self.draw(
            self.single_size,
            &self.single_title(series.symbol()),
            &[line],
        )?;

        Ok(Chart {
            png,
            caption: self.single_caption(series.symbol()),
        })
    }

    fn render_comparison(&self, series: &[PriceSeries]) -> Result<Option<Chart>> {
        let lines = comparison_lines(series);
        if lines.is_empty() {
            return Ok(None);
        }

        let symbols: Vec<&str> = series.iter().map(PriceSeries::symbol).collect();
        let png = self.draw(self.compare_size, &self.comparison_title(&symbols), &lines)?;

        Ok(Some(Chart {
            png,
            caption: self.comparison_caption(&symbols),
        }))
    }
}

/// Shared date axis and padded price axis covering every line
fn axis_ranges(lines: &[ChartLine<'_>]) -> Option<(Range<NaiveDate>, Range<f64>)> {
    let mut points = lines.iter().flat_map(|l| l.points.iter());
    let first = points.next()?;

    let (start, end, low, high) = points.fold(
        (first.date, first.date, first.close, first.close),
        |(start, end, low, high), p| {
            (start.min(p.date), end.max(p.date), low.min(p.close), high.max(p.close))
        },
    );

    let end = if end > start { end } else { start + Duration::days(1) };
    let pad = if high > low {
        (high - low) * 0.05
    } else {
        (high.abs() * 0.05).max(1.0)
    };

    Some((start..end, (low - pad)..(high + pad)))
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        StockError::ChartError("pixel buffer does not match chart size".to_string())
    })?;

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(chart_error)?;
    Ok(png.into_inner())
}

fn chart_error(e: impl std::fmt::Display) -> StockError {
    StockError::ChartError(e.to_string())
}
