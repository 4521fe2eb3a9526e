//! Chart requests with fully prepared data
//!
//! The analysis side computes everything a chart shows (bins, density
//! curves, grids, series); a renderer only draws. This keeps the decision
//! logic testable without a drawing backend.

use crate::stats::{sample_std, ColumnStats};
use crate::table::SessionTable;

/// Points sampled along a histogram's density curve
pub const KDE_POINTS: usize = 200;

/// A renderable chart
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Histogram(HistogramChart),
    Lines(LineChart),
    Density(DensityChart),
    Heatmap(HeatmapChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Histogram(c) => &c.title,
            Chart::Lines(c) => &c.title,
            Chart::Density(c) => &c.title,
            Chart::Heatmap(c) => &c.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Distribution of one column with a count-scaled density curve
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub bins: Vec<HistogramBin>,
    /// Gaussian KDE scaled to bin counts; empty when it cannot be estimated
    pub kde: Vec<(f64, f64)>,
    pub color: [u8; 3],
}

impl HistogramChart {
    /// Equal-width bins over `[min, max]`, or `None` without values
    pub fn from_values(
        title: impl Into<String>,
        x_label: impl Into<String>,
        values: &[f64],
        bin_count: usize,
        color: [u8; 3],
    ) -> Option<Self> {
        let stats = ColumnStats::from_values(values);
        if values.is_empty() || bin_count == 0 || !stats.min.is_finite() || !stats.max.is_finite() {
            return None;
        }

        let (lo, hi) = widen(stats.min, stats.max);
        let width = (hi - lo) / bin_count as f64;
        let mut counts = vec![0usize; bin_count];
        for &v in values {
            // the last bin is closed on the right
            let idx = (((v - lo) / width) as usize).min(bin_count - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + i as f64 * width,
                end: lo + (i + 1) as f64 * width,
                count,
            })
            .collect();

        Some(Self {
            title: title.into(),
            x_label: x_label.into(),
            bins,
            kde: kde_curve(values, lo, hi, width),
            color,
        })
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Gaussian KDE with Scott's bandwidth, scaled by `n * bin_width`
fn kde_curve(values: &[f64], lo: f64, hi: f64, bin_width: f64) -> Vec<(f64, f64)> {
    let n = values.len();
    let std = sample_std(values);
    if n < 2 || !(std > 0.0) {
        return Vec::new();
    }
    let h = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n as f64 * bin_width;

    (0..KDE_POINTS)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (KDE_POINTS - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let u = (x - v) / h;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}

/// One labelled polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// `(timestamp, column)` points, skipping rows missing either value
    ///
    /// Boolean-like columns are plotted as 0/1. Returns `None` when the
    /// column is absent or textual.
    pub fn timeline(table: &SessionTable, column: &str, label: impl Into<String>) -> Option<Self> {
        let values = table.column(column)?.as_f64()?;
        let points = table
            .timestamps()
            .iter()
            .zip(values)
            .filter_map(|(t, v)| Some(((*t)?, v?)))
            .collect();
        Some(Self {
            label: label.into(),
            points,
        })
    }
}

/// Time-series chart, optionally with highlighted marker points
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub markers: Option<Series>,
    /// Line opacity in `[0, 1]`
    pub opacity: f64,
}

impl LineChart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        series: Vec<Series>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series,
            markers: None,
            opacity: 1.0,
        }
    }

    pub fn with_markers(mut self, markers: Series) -> Self {
        self.markers = Some(markers);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Bounding box over every series and marker point
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let points = self
            .series
            .iter()
            .chain(self.markers.iter())
            .flat_map(|s| s.points.iter());
        bounding_box(points.copied())
    }
}

/// 2D count grid over point positions
#[derive(Debug, Clone, PartialEq)]
pub struct DensityChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub nx: usize,
    pub ny: usize,
    /// Row-major counts, `counts[iy * nx + ix]`
    pub counts: Vec<u32>,
    /// Draw y growing downwards (screen coordinates)
    pub invert_y: bool,
}

impl DensityChart {
    pub fn from_points(
        title: impl Into<String>,
        points: &[(f64, f64)],
        gridsize: usize,
    ) -> Option<Self> {
        if gridsize == 0 {
            return None;
        }
        let ((x0, x1), (y0, y1)) = bounding_box(points.iter().copied())?;
        let x_range = widen(x0, x1);
        let y_range = widen(y0, y1);
        let (nx, ny) = (gridsize, gridsize);
        let mut counts = vec![0u32; nx * ny];

        let cell = |v: f64, (lo, hi): (f64, f64), n: usize| {
            (((v - lo) / (hi - lo) * n as f64) as usize).min(n - 1)
        };
        for &(x, y) in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let ix = cell(x, x_range, nx);
            let iy = cell(y, y_range, ny);
            counts[iy * nx + ix] += 1;
        }

        Some(Self {
            title: title.into(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            x_range,
            y_range,
            nx,
            ny,
            counts,
            invert_y: true,
        })
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Occupied cells as `((x0, y0), (x1, y1), count)`
    pub fn occupied_cells(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64), u32)> + '_ {
        let dx = (self.x_range.1 - self.x_range.0) / self.nx as f64;
        let dy = (self.y_range.1 - self.y_range.0) / self.ny as f64;
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c >= 1)
            .map(move |(i, &c)| {
                let (ix, iy) = (i % self.nx, i / self.nx);
                let x0 = self.x_range.0 + ix as f64 * dx;
                let y0 = self.y_range.0 + iy as f64 * dy;
                ((x0, y0), (x0 + dx, y0 + dy), c)
            })
    }
}

/// Annotated square matrix, e.g. correlations
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

fn bounding_box(points: impl Iterator<Item = (f64, f64)>) -> Option<((f64, f64), (f64, f64))> {
    points
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .fold(None, |acc, (x, y)| match acc {
            None => Some(((x, x), (y, y))),
            Some(((x0, x1), (y0, y1))) => Some(((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y)))),
        })
}

/// Give a degenerate range some width
pub fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}
