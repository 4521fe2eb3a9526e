//! Multi-file batch driver
//!
//! Every input is loaded before anything is compared, and the comparison
//! runs before the per-file reports. Files are then reported strictly in
//! input order. A failure in one file is printed and never reaches the
//! next one.

use crate::chart::{Chart, LineChart, Series};
use crate::comparison::compare_sessions;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::metrics::MetricSet;
use crate::report::{output_dir, report_with_metrics, resolve_metrics};
use crate::sink::{ArtifactSink, DirectorySink};
use crate::table::SessionTable;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Artifact name of the cross-session chart
pub const COMPARISON_CHART: &str = "speed_comparison.png";

/// Line opacity of overlaid session series
const COMPARISON_OPACITY: f64 = 0.7;

/// Where batch outputs go
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Parent of the per-file `<stem>_report` folders; defaults to each
    /// input's own directory
    pub output_root: Option<PathBuf>,
    /// Directory receiving the cross-session chart
    pub comparison_dir: PathBuf,
}

/// Outcome counts of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub missing: usize,
    pub failed: usize,
    /// Path of the comparison chart, when one was produced
    pub comparison: Option<PathBuf>,
}

enum Input {
    Missing,
    Unreadable(AnalysisError),
    Loaded(SessionTable, MetricSet),
}

fn load(path: &Path) -> Input {
    if !path.is_file() {
        return Input::Missing;
    }
    match SessionTable::from_path(path) {
        Ok(table) => {
            let metrics = resolve_metrics(&table);
            Input::Loaded(table, metrics)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "input not loaded");
            Input::Unreadable(e)
        }
    }
}

/// Run the comparison and every per-file report
///
/// Only console write failures are returned as errors.
pub fn run_batch<W: Write>(
    paths: &[PathBuf],
    config: &AnalysisConfig,
    options: &BatchOptions,
    out: &mut W,
) -> Result<BatchSummary> {
    let inputs: Vec<Input> = paths.iter().map(|p| load(p)).collect();
    let mut summary = BatchSummary::default();

    if paths.len() > 1 {
        writeln!(out, "\n📊 Multi-file comparative analysis:").map_err(console_error)?;
        summary.comparison = compare(&inputs, config, options, out)?;
    }

    // output directory -> input whose report it holds
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    for (path, input) in paths.iter().zip(&inputs) {
        match input {
            Input::Missing => {
                summary.missing += 1;
                let err = AnalysisError::InputNotFound(path.clone());
                writeln!(out, "❌ {}", err).map_err(console_error)?;
            }
            Input::Unreadable(err) => {
                summary.failed += 1;
                print_header(out, path)?;
                writeln!(out, "❌ {}", err).map_err(console_error)?;
            }
            Input::Loaded(table, metrics) => {
                print_header(out, path)?;
                let dir = output_dir(path, options.output_root.as_deref());
                if let Some(owner) = claimed.get(&dir).filter(|owner| **owner != path.as_path()) {
                    summary.failed += 1;
                    let err = AnalysisError::OutputClash {
                        dir,
                        owner: owner.to_path_buf(),
                    };
                    warn!(path = %path.display(), error = %err, "session report skipped");
                    writeln!(out, "❌ {}", err).map_err(console_error)?;
                    continue;
                }
                claimed.insert(dir.clone(), path.as_path());
                let mut sink = DirectorySink::new(dir);
                match report_with_metrics(table, *metrics, config, &mut sink, out) {
                    Ok(_) => summary.analyzed += 1,
                    Err(e) => {
                        summary.failed += 1;
                        warn!(path = %path.display(), error = %e, "session report aborted");
                        writeln!(out, "❌ {}", e).map_err(console_error)?;
                    }
                }
            }
        }
    }

    Ok(summary)
}

/// Overlay the speed series of every loaded session
fn compare<W: Write>(
    inputs: &[Input],
    config: &AnalysisConfig,
    options: &BatchOptions,
    out: &mut W,
) -> Result<Option<PathBuf>> {
    let tables = inputs.iter().filter_map(|input| match input {
        Input::Loaded(table, metrics) => Some((table, *metrics)),
        _ => None,
    });

    let series = match compare_sessions(tables) {
        Some(series) if config.charts => series,
        _ => return Ok(None),
    };

    let chart = LineChart::new(
        "Speed comparison across sessions",
        "Time (s)",
        "Speed (px/s)",
        series
            .into_iter()
            .map(|s| Series {
                label: s.label,
                points: s.points,
            })
            .collect(),
    )
    .with_opacity(COMPARISON_OPACITY);

    let mut sink = DirectorySink::new(&options.comparison_dir);
    match sink.render_chart(COMPARISON_CHART, &Chart::Lines(chart), &config.render) {
        Ok(()) => {
            writeln!(out, "   • Chart {} generated", COMPARISON_CHART).map_err(console_error)?;
            Ok(Some(sink.path_of(COMPARISON_CHART)))
        }
        Err(e) => {
            warn!(error = %e, "comparison chart not rendered");
            writeln!(out, "   • Chart {} not generated: {}", COMPARISON_CHART, e)
                .map_err(console_error)?;
            Ok(None)
        }
    }
}

fn print_header<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    writeln!(out, "\n📂 Analyzing file: {}", name).map_err(console_error)
}

fn console_error(source: std::io::Error) -> AnalysisError {
    AnalysisError::Io {
        artifact: "console".to_string(),
        source,
    }
}
