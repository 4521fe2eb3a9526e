//! Analysis configuration
//!
//! Defaults reproduce the reference thresholds (2σ flicks, 1.5·IQR fences,
//! 50-bin histograms). A TOML file can override any field; missing fields
//! keep their defaults.
//!
//! ```toml
//! mode = "reduced"
//! flick_sigma = 2.5
//! quantile_method = "linear"
//!
//! [render]
//! width = 1200
//! ```

use crate::error::{AnalysisError, Result};
use crate::metrics::{Metric, FOCUS_METRICS, SHORT_FOCUS_METRICS};
use crate::stats::QuantileMethod;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which optional report sections run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Histogram per numeric column, fixed chart set and dynamics timelines
    #[default]
    Full,
    /// Fixed chart set only, short correlation focus list
    Reduced,
}

impl ReportMode {
    /// Ordered focus list for the correlation report
    pub fn focus_metrics(self) -> &'static [Metric] {
        match self {
            ReportMode::Full => &FOCUS_METRICS,
            ReportMode::Reduced => &SHORT_FOCUS_METRICS,
        }
    }
}

/// Explicit chart styling handed to the renderer with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Width of histograms and the position heatmap
    pub width: u32,
    pub height: u32,
    /// Width of time-series charts
    pub wide_width: u32,
    /// Side length of the square correlation heatmap
    pub heatmap_size: u32,
    pub font_family: String,
    pub title_font_size: u32,
    pub histogram_color: [u8; 3],
    pub speed_histogram_color: [u8; 3],
    pub flick_color: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            wide_width: 1200,
            heatmap_size: 1100,
            font_family: "sans-serif".to_string(),
            title_font_size: 22,
            histogram_color: [0, 128, 128],       // teal
            speed_histogram_color: [65, 105, 225], // royal blue
            flick_color: [220, 20, 60],
        }
    }
}

/// Thresholds and options for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: ReportMode,

    /// Flick threshold in sample standard deviations above the mean
    pub flick_sigma: f64,

    /// Tukey fence multiplier applied to the interquartile range
    pub iqr_factor: f64,

    pub quantile_method: QuantileMethod,

    pub histogram_bins: usize,

    /// Cells per axis of the position density grid
    pub density_gridsize: usize,

    /// Skip every chart request
    pub charts: bool,

    /// Assemble the consolidated HTML document
    pub document: bool,

    pub render: RenderConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::Full,
            flick_sigma: 2.0,
            iqr_factor: 1.5,
            quantile_method: QuantileMethod::Exclusive,
            histogram_bins: 50,
            density_gridsize: 60,
            charts: true,
            document: true,
            render: RenderConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reduced report with otherwise default thresholds
    pub fn reduced() -> Self {
        Self {
            mode: ReportMode::Reduced,
            ..Self::default()
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate().map_err(AnalysisError::Config)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            artifact: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.flick_sigma.is_finite() && self.flick_sigma > 0.0) {
            return Err(format!(
                "flick_sigma must be a positive number, got {}",
                self.flick_sigma
            ));
        }

        if !(self.iqr_factor.is_finite() && self.iqr_factor >= 0.0) {
            return Err(format!(
                "iqr_factor must be non-negative, got {}",
                self.iqr_factor
            ));
        }

        if self.histogram_bins == 0 {
            return Err("histogram_bins must be >= 1".to_string());
        }

        if self.density_gridsize == 0 {
            return Err("density_gridsize must be >= 1".to_string());
        }

        let r = &self.render;
        if r.width == 0 || r.height == 0 || r.wide_width == 0 || r.heatmap_size == 0 {
            return Err("render dimensions must be non-zero".to_string());
        }

        Ok(())
    }
}
