//! CLI argument parsing for mouse-metrics

use crate::config::{AnalysisConfig, ReportMode};
use crate::stats::QuantileMethod;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mouse-metrics")]
#[command(version)]
#[command(about = "Session analytics and charts for mouse telemetry CSV exports", long_about = None)]
pub struct Cli {
    /// Session CSV files to analyze
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Report mode (full adds per-column histograms and dynamics charts)
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ReportMode>,

    /// Quantile rule for the speed outlier fences
    #[arg(long = "quantile-method", value_enum)]
    pub quantile_method: Option<QuantileMethod>,

    /// Flick threshold in standard deviations above the mean speed (default: 2.0)
    #[arg(long = "flick-sigma", value_name = "SIGMA")]
    pub flick_sigma: Option<f64>,

    /// TOML configuration file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Parent directory for the per-file report folders
    #[arg(long = "output-root", value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Directory receiving the cross-session speed comparison chart
    #[arg(long = "comparison-dir", value_name = "DIR", default_value = ".")]
    pub comparison_dir: PathBuf,

    /// Skip chart rendering (tables, summary and console report only)
    #[arg(long = "no-charts")]
    pub no_charts: bool,

    /// Skip the consolidated HTML document
    #[arg(long = "no-document")]
    pub no_document: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `config`
    pub fn apply_to(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(method) = self.quantile_method {
            config.quantile_method = method;
        }
        if let Some(sigma) = self.flick_sigma {
            config.flick_sigma = sigma;
        }
        if self.no_charts {
            config.charts = false;
        }
        if self.no_document {
            config.document = false;
        }
        config
    }
}
