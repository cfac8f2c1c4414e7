use std::io::Cursor;
use std::ops::Range;
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use tracing::debug;

use orthostat_core::models::chart::ChartPoint;

use crate::error::ExportError;

const LINE: RGBColor = RGBColor(220, 38, 38);
const PRE_TEST: RGBColor = RGBColor(37, 99, 235);
const TREND: RGBColor = RGBColor(22, 163, 74);
const GRID: RGBColor = RGBColor(225, 225, 225);

/// Upper bound on raster area, in pixels.
pub const MAX_CHART_PIXELS: u64 = 4096 * 4096;

const FONT_FAMILY: &str = "sans-serif";
static FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Register the bundled face under [`FONT_FAMILY`] once per process.
fn ensure_font() -> Result<(), ExportError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered =
        *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT).is_ok());
    if registered {
        Ok(())
    } else {
        Err(ExportError::Chart("bundled chart font could not be loaded".to_string()))
    }
}

/// Chart as an SVG document with caption and axis labels.
pub fn render_svg(points: &[ChartPoint], width: u32, height: u32) -> Result<String, ExportError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, points, WHITE)?;
        root.present().map_err(chart_err)?;
    }
    debug!(points = points.len(), bytes = svg.len(), "chart rendered as SVG");
    Ok(svg)
}

/// The same labelled chart rasterized to PNG bytes.
pub fn render_png(
    points: &[ChartPoint],
    width: u32,
    height: u32,
    background: [u8; 3],
) -> Result<Vec<u8>, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::Chart(format!("empty canvas {width}x{height}")));
    }
    if u64::from(width) * u64::from(height) > MAX_CHART_PIXELS {
        return Err(ExportError::Chart(format!(
            "canvas {width}x{height} exceeds {MAX_CHART_PIXELS} pixels"
        )));
    }

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        let [r, g, b] = background;
        draw_chart(&root, points, RGBColor(r, g, b))?;
        root.present().map_err(chart_err)?;
    }

    let raster = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| ExportError::Chart("pixel buffer does not match canvas".to_string()))?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(raster)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)?;

    debug!(points = points.len(), bytes = png.len(), "chart rendered as PNG");
    Ok(png)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[ChartPoint],
    background: RGBColor,
) -> Result<(), ExportError> {
    ensure_font()?;
    root.fill(&background).map_err(chart_err)?;

    let (x_range, y_range) = axis_ranges(points);
    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .caption("Heart Rate Response", (FONT_FAMILY, 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range.clone())
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .light_line_style(GRID)
        .label_style((FONT_FAMILY, 12))
        .axis_desc_style((FONT_FAMILY, 14))
        .x_desc("Time (minutes)")
        .y_desc("Heart Rate (bpm)")
        .draw()
        .map_err(chart_err)?;

    // Standing starts at zero.
    chart
        .draw_series(LineSeries::new([(0.0, y_range.start), (0.0, y_range.end)], GRID.stroke_width(2)))
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.time, f64::from(p.heart_rate))),
            LINE.stroke_width(2),
        ))
        .map_err(chart_err)?;

    let trend: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.trend_value.map(|v| (p.time, v)))
        .collect();
    if !trend.is_empty() {
        chart
            .draw_series(LineSeries::new(trend, TREND.stroke_width(2)))
            .map_err(chart_err)?;
    }

    chart
        .draw_series(points.iter().map(|p| {
            let colour = if p.is_pre_test { PRE_TEST } else { LINE };
            Circle::new((p.time, f64::from(p.heart_rate)), 4, colour.filled())
        }))
        .map_err(chart_err)?;

    Ok(())
}

/// Time axis always spans the pre-test slots and the full ten minutes;
/// the rate axis pads the observed values by 10 bpm.
fn axis_ranges(points: &[ChartPoint]) -> (Range<f64>, Range<f64>) {
    let x_min = points.iter().map(|p| p.time).fold(-2.0, f64::min) - 0.5;
    let x_max = points.iter().map(|p| p.time).fold(10.0, f64::max) + 0.5;

    let values = points
        .iter()
        .map(|p| f64::from(p.heart_rate))
        .chain(points.iter().filter_map(|p| p.trend_value));
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let y_range = if lo.is_finite() && hi.is_finite() {
        (lo - 10.0).max(0.0)..hi + 10.0
    } else {
        40.0..140.0
    };

    (x_min..x_max, y_range)
}

fn chart_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Chart(e.to_string())
}
