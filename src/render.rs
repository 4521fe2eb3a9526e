//! PNG rendering of prepared charts with plotters
//!
//! Every function here only draws what [`crate::chart`] already computed.
//! Styling comes from the [`RenderConfig`] passed with each request; there
//! is no shared plotting state between calls.

use crate::chart::{Chart, DensityChart, HeatmapChart, HistogramChart, LineChart};
use crate::config::RenderConfig;
use crate::error::{AnalysisError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::panic;
use std::path::Path;
use tracing::debug;

/// Line colors for multi-series charts, cycled in series order
const SERIES_PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(23, 190, 207),
];

const KDE_COLOR: RGBColor = RGBColor(40, 40, 40);

/// Cell color for undefined correlations
const UNDEFINED_COLOR: RGBColor = RGBColor(200, 200, 200);

/// Diverging palette stops over `[-1, 1]`
const COOLWARM: [(f64, (u8, u8, u8)); 3] = [
    (0.0, (59, 76, 192)),
    (0.5, (221, 221, 221)),
    (1.0, (180, 4, 38)),
];

/// Sequential palette stops over `[0, 1]`, dark for sparse cells
const INFERNO: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (0, 0, 4)),
    (0.25, (87, 16, 110)),
    (0.5, (188, 55, 84)),
    (0.75, (249, 142, 9)),
    (1.0, (252, 255, 164)),
];

/// Pixel size of the image for `chart`
pub fn image_size(chart: &Chart, style: &RenderConfig) -> (u32, u32) {
    match chart {
        Chart::Histogram(_) => (style.width, style.height),
        Chart::Lines(_) => (style.wide_width, style.height),
        Chart::Density(_) => (style.width, style.width * 4 / 5),
        Chart::Heatmap(_) => (style.heatmap_size, style.heatmap_size),
    }
}

/// Render `chart` to a PNG file at `path`
///
/// Backend panics (missing system fonts, mostly) are caught and reported as
/// [`AnalysisError::Render`].
pub fn render_png(path: &Path, chart: &Chart, style: &RenderConfig) -> Result<()> {
    let artifact = path.display().to_string();
    let render = || -> anyhow::Result<()> {
        let root = BitMapBackend::new(path, image_size(chart, style)).into_drawing_area();
        draw_chart(root, chart, style)
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| AnalysisError::Render {
            artifact: artifact.clone(),
            message: "plotting backend panicked".to_string(),
        })?
        .map_err(|e| AnalysisError::Render {
            artifact: artifact.clone(),
            message: format!("plotting error: {}", e),
        })?;

    debug!(artifact = %artifact, title = chart.title(), "chart rendered");
    Ok(())
}

/// Draw `chart` onto any plotters backend
pub fn draw_chart<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    chart: &Chart,
    style: &RenderConfig,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match chart {
        Chart::Histogram(c) => draw_histogram(&root, c, style)?,
        Chart::Lines(c) => draw_lines(&root, c, style)?,
        Chart::Density(c) => draw_density(&root, c, style)?,
        Chart::Heatmap(c) => draw_heatmap(&root, c, style)?,
    }
    root.present()?;
    Ok(())
}

fn draw_histogram<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    hist: &HistogramChart,
    style: &RenderConfig,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (lo, hi) = match (hist.bins.first(), hist.bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => return Ok(()),
    };
    let kde_peak = hist.kde.iter().map(|p| p.1).fold(0.0, f64::max);
    let y_max = (hist.max_count() as f64).max(kde_peak).max(1.0) * 1.1;
    let color = rgb(hist.color);

    let mut chart = ChartBuilder::on(root)
        .caption(&hist.title, (style.font_family.as_str(), style.title_font_size))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(hist.x_label.as_str())
        .y_desc("Count")
        .draw()?;

    chart.draw_series(hist.bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], color.mix(0.7).filled())
    }))?;
    chart.draw_series(hist.bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], color.stroke_width(1))
    }))?;

    if !hist.kde.is_empty() {
        chart.draw_series(LineSeries::new(hist.kde.iter().copied(), KDE_COLOR.stroke_width(2)))?;
    }
    Ok(())
}

fn draw_lines<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    lines: &LineChart,
    style: &RenderConfig,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let ((x0, x1), (y0, y1)) = match lines.bounds() {
        Some(((x0, x1), (y0, y1))) => (padded(x0, x1, 0.0), padded(y0, y1, 0.05)),
        None => return Ok(()),
    };

    let mut chart = ChartBuilder::on(root)
        .caption(&lines.title, (style.font_family.as_str(), style.title_font_size))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(lines.x_label.as_str())
        .y_desc(lines.y_label.as_str())
        .draw()?;

    for (i, series) in lines.series.iter().enumerate() {
        let color = SERIES_PALETTE[i % SERIES_PALETTE.len()].mix(lines.opacity);
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), color))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if let Some(markers) = &lines.markers {
        let color = rgb(style.flick_color);
        chart
            .draw_series(
                markers
                    .points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(markers.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.7))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_density<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    density: &DensityChart,
    style: &RenderConfig,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // screen coordinates grow downwards: plot -y and relabel
    let flip = if density.invert_y { -1.0 } else { 1.0 };
    let (ya, yb) = (flip * density.y_range.0, flip * density.y_range.1);
    let y_axis = ya.min(yb)..ya.max(yb);
    let max = density.max_count().max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(&density.title, (style.font_family.as_str(), style.title_font_size))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(density.x_range.0..density.x_range.1, y_axis)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(density.x_label.as_str())
        .y_desc(density.y_label.as_str())
        .y_label_formatter(&|v| format!("{:.0}", flip * v))
        .draw()?;

    chart.draw_series(density.occupied_cells().map(|((x0, y0), (x1, y1), count)| {
        let color = interpolate(&INFERNO, count as f64 / max);
        Rectangle::new([(x0, flip * y0), (x1, flip * y1)], color.filled())
    }))?;
    Ok(())
}

fn draw_heatmap<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    heatmap: &HeatmapChart,
    style: &RenderConfig,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = heatmap.labels.len();
    if n == 0 {
        return Ok(());
    }
    // cell k spans [k - 0.5, k + 0.5], so integer ticks sit on cell centers
    let span = -0.5..n as f64 - 0.5;
    let label_at = |v: &f64, flip: bool| cell_label(&heatmap.labels, *v, flip);

    let mut chart = ChartBuilder::on(root)
        .caption(&heatmap.title, (style.font_family.as_str(), style.title_font_size))
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(180)
        .build_cartesian_2d(span.clone(), span)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(2 * n + 1)
        .y_labels(2 * n + 1)
        .x_label_formatter(&|v| label_at(v, false))
        .y_label_formatter(&|v| label_at(v, true))
        .x_label_style(
            (style.font_family.as_str(), 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style((style.font_family.as_str(), 12))
        .draw()?;

    let cells = heatmap.values.iter().enumerate().flat_map(|(i, row)| {
        row.iter()
            .enumerate()
            .map(move |(j, &v)| (j as f64, (n - 1 - i) as f64, v))
    });

    chart.draw_series(cells.clone().map(|(x, y, v)| {
        let color = if v.is_finite() {
            interpolate(&COOLWARM, (v.clamp(-1.0, 1.0) + 1.0) / 2.0)
        } else {
            UNDEFINED_COLOR
        };
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    let annotation = TextStyle::from((style.font_family.as_str(), 11).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.filter(|(_, _, v)| v.is_finite()).map(|(x, y, v)| {
        Text::new(format!("{:.2}", v), (x, y), annotation.clone())
    }))?;
    Ok(())
}

/// Category label for an axis position; blank between cell centers
///
/// With `flip`, position 0 is the last label (row 0 is drawn at the top).
fn cell_label(labels: &[String], v: f64, flip: bool) -> String {
    let k = v.round();
    if (v - k).abs() > 1e-6 || k < 0.0 {
        return String::new();
    }
    let i = k as usize;
    let i = if flip {
        labels.len().wrapping_sub(i + 1)
    } else {
        i
    };
    labels.get(i).cloned().unwrap_or_default()
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Linear interpolation between palette stops, `t` clamped to `[0, 1]`
fn interpolate(stops: &[(f64, (u8, u8, u8))], t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let upper = stops
        .iter()
        .position(|(at, _)| *at >= t)
        .unwrap_or(stops.len() - 1)
        .max(1);
    let (a, ca) = stops[upper - 1];
    let (b, cb) = stops[upper];
    let w = if b > a { (t - a) / (b - a) } else { 0.0 };
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * w).round() as u8;
    RGBColor(mix(ca.0, cb.0), mix(ca.1, cb.1), mix(ca.2, cb.2))
}

/// Axis range with `margin` of the span added on both ends
fn padded(lo: f64, hi: f64, margin: f64) -> (f64, f64) {
    let (lo, hi) = crate::chart::widen(lo, hi);
    let pad = (hi - lo) * margin;
    (lo - pad, hi + pad)
}
