//! Per-session report orchestration
//!
//! [`SessionAnalysis::run`] computes everything derived from one table:
//! availability, statistics, correlations, speed anomalies and findings.
//! [`report_session`] then hands the results to an [`ArtifactSink`] under
//! logical names and prints the console report. One code path serves both
//! report modes; the mode only selects which optional sections run.

use crate::anomaly::SpeedAnomalies;
use crate::chart::{Chart, DensityChart, HeatmapChart, HistogramChart, LineChart, Series};
use crate::config::{AnalysisConfig, ReportMode};
use crate::correlation::{CorrelationMatrix, FocusView, CORRELATION_DECIMALS};
use crate::csv_output::{anomalies_csv, statistics_csv, ANOMALIES_CSV, STATISTICS_CSV};
use crate::error::{AnalysisError, Result};
use crate::html_output::HtmlReport;
use crate::json_output::{JsonSummary, SUMMARY_JSON};
use crate::metrics::{Metric, MetricSet};
use crate::sink::ArtifactSink;
use crate::stats::{present, StatisticsSummary};
use crate::synthesis::{synthesize, Finding, CLOSING_REMARK};
use crate::table::SessionTable;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of the per-input output directory
pub const REPORT_DIR_SUFFIX: &str = "_report";

/// Artifact name of the consolidated document
pub const DOCUMENT_NAME: &str = "report.html";

/// Charts collected into the consolidated document, in order, when present
pub const DOCUMENT_FIGURES: [(&str, &str); 10] = [
    ("speed_distribution.png", "Speed distribution"),
    ("precision_stability.png", "Precision and stability"),
    ("correlation_heatmap.png", "Correlation heatmap"),
    ("fatigue_stress.png", "Fatigue and stress"),
    ("bursts_micro.png", "Bursts and micro-movements"),
    ("position_heatmap.png", "Mouse position heatmap"),
    ("flick_detection.png", "Flick detection"),
    ("tracking_smoothness.png", "Tracking smoothness"),
    ("chaos_metric.png", "Chaos metric"),
    ("entropy_score.png", "Entropy score"),
];

const TIME_AXIS: &str = "Time (s)";
const SPEED_AXIS: &str = "Speed (px/s)";

/// Output directory for `input`: `<stem>_report` next to the input, or
/// under `output_root` when given
pub fn output_dir(input: &Path, output_root: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    let parent = match output_root {
        Some(root) => root.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    parent.join(format!("{}{}", stem, REPORT_DIR_SUFFIX))
}

/// Capability record of `table`, computed once per loaded table
pub fn resolve_metrics(table: &SessionTable) -> MetricSet {
    let metrics = MetricSet::resolve(table);
    debug!(
        table = table.name(),
        metrics = metrics.len(),
        "metric availability resolved"
    );
    metrics
}

/// Everything derived from one session table
#[derive(Debug, Clone)]
pub struct SessionAnalysis<'a> {
    pub table: &'a SessionTable,
    pub mode: ReportMode,
    pub metrics: MetricSet,
    pub statistics: StatisticsSummary,
    pub correlation: CorrelationMatrix,
    pub focus: FocusView,
    /// `None` when the table has no speed column
    pub anomalies: Option<SpeedAnomalies>,
    pub findings: Vec<Finding>,
}

impl<'a> SessionAnalysis<'a> {
    pub fn run(table: &'a SessionTable, config: &AnalysisConfig) -> Result<Self> {
        Self::with_metrics(table, resolve_metrics(table), config)
    }

    /// Analysis over an availability record the caller already resolved
    pub fn with_metrics(
        table: &'a SessionTable,
        metrics: MetricSet,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        let statistics = StatisticsSummary::compute(table);
        let correlation = CorrelationMatrix::compute(table).rounded(CORRELATION_DECIMALS);
        let focus = correlation.focus_view(&metrics.focus(config.mode.focus_metrics()));
        let anomalies = SpeedAnomalies::detect(
            table,
            metrics,
            config.flick_sigma,
            config.iqr_factor,
            config.quantile_method,
        )?;
        let findings = synthesize(&statistics, metrics);

        Ok(Self {
            table,
            mode: config.mode,
            metrics,
            statistics,
            correlation,
            focus,
            anomalies,
            findings,
        })
    }

    /// Chart requests for this session, in emission order
    ///
    /// Each chart is gated on its own columns; a missing column drops only
    /// that chart.
    pub fn chart_requests(&self, config: &AnalysisConfig) -> Vec<(String, Chart)> {
        let style = &config.render;
        let mut charts = Vec::new();

        if self.mode == ReportMode::Full {
            for column in self.table.numeric_columns() {
                let values = present(column.numeric_values().unwrap_or(&[]));
                if let Some(hist) = HistogramChart::from_values(
                    format!("Distribution of {}", column.name()),
                    column.name(),
                    &values,
                    config.histogram_bins,
                    style.histogram_color,
                ) {
                    charts.push((format!("hist_{}.png", column.name()), Chart::Histogram(hist)));
                }
            }
        }

        if self.metrics.contains_all(&[Metric::X, Metric::Y]) {
            let points = self.paired(Metric::X.column(), Metric::Y.column());
            if let Some(density) = DensityChart::from_points(
                "Mouse position heatmap",
                &points,
                config.density_gridsize,
            ) {
                charts.push(("position_heatmap.png".to_string(), Chart::Density(density)));
            }
        }

        if let (Some(anomalies), Some(speed)) = (
            &self.anomalies,
            Series::timeline(self.table, Metric::Speed.column(), "Speed"),
        ) {
            let flicks = Series {
                label: "Detected flicks".to_string(),
                points: anomalies.flicks.points(self.table),
            };
            let chart = LineChart::new(
                "Flick detection (speed spikes)",
                TIME_AXIS,
                SPEED_AXIS,
                vec![speed],
            )
            .with_markers(flicks);
            charts.push(("flick_detection.png".to_string(), Chart::Lines(chart)));
        }

        if self.metrics.contains(Metric::Speed) {
            let values = self.present_values(Metric::Speed);
            if let Some(hist) = HistogramChart::from_values(
                "Speed distribution (px/s)",
                SPEED_AXIS,
                &values,
                config.histogram_bins,
                style.speed_histogram_color,
            ) {
                charts.push(("speed_distribution.png".to_string(), Chart::Histogram(hist)));
            }
        }

        self.push_timeline(
            &mut charts,
            "precision_stability.png",
            "Precision and stability over time",
            "Score",
            &[
                (Metric::PixelPerfectPrecision, "Pixel precision"),
                (Metric::StabilityScore, "Stability"),
            ],
        );

        if !self.correlation.is_empty() {
            let heatmap = HeatmapChart {
                title: "Correlation heatmap".to_string(),
                labels: self.correlation.columns().to_vec(),
                values: self.correlation.values().to_vec(),
            };
            charts.push(("correlation_heatmap.png".to_string(), Chart::Heatmap(heatmap)));
        }

        self.push_timeline(
            &mut charts,
            "fatigue_stress.png",
            "Fatigue and stress over time",
            "Score",
            &[
                (Metric::FatigueIndex, "Fatigue"),
                (Metric::StressIndicator, "Stress"),
            ],
        );
        self.push_timeline(
            &mut charts,
            "bursts_micro.png",
            "Bursts and micro-movements",
            "Value",
            &[
                (Metric::IsBurst, "Burst"),
                (Metric::MicroMovementCount, "Micro-movements"),
            ],
        );

        if self.mode == ReportMode::Full {
            self.push_timeline(
                &mut charts,
                "tracking_smoothness.png",
                "Tracking smoothness over time",
                "Score",
                &[(Metric::TrackingSmoothness, "Tracking smoothness")],
            );
            self.push_timeline(
                &mut charts,
                "chaos_metric.png",
                "Chaos metric over time",
                "Score",
                &[(Metric::ChaosMetric, "Chaos metric")],
            );
            self.push_timeline(
                &mut charts,
                "entropy_score.png",
                "Entropy score over time",
                "Score",
                &[(Metric::EntropyScore, "Entropy score")],
            );
        }

        charts
    }

    /// Line chart over the present metrics of `series`, if any is present
    fn push_timeline(
        &self,
        charts: &mut Vec<(String, Chart)>,
        name: &str,
        title: &str,
        y_label: &str,
        series: &[(Metric, &str)],
    ) {
        let lines: Vec<Series> = series
            .iter()
            .filter(|(metric, _)| self.metrics.contains(*metric))
            .filter_map(|(metric, label)| Series::timeline(self.table, metric.column(), *label))
            .collect();
        if !lines.is_empty() {
            let chart = LineChart::new(title, TIME_AXIS, y_label, lines);
            charts.push((name.to_string(), Chart::Lines(chart)));
        }
    }

    fn present_values(&self, metric: Metric) -> Vec<f64> {
        self.table
            .column(metric.column())
            .and_then(|c| c.as_f64())
            .map(|values| values.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Rows where both columns have a value
    fn paired(&self, a: &str, b: &str) -> Vec<(f64, f64)> {
        let column = |name| self.table.column(name).and_then(|c| c.as_f64());
        match (column(a), column(b)) {
            (Some(xs), Some(ys)) => xs
                .into_iter()
                .zip(ys)
                .filter_map(|(x, y)| Some((x?, y?)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Analyze one table, emit its artifacts into `sink` and print the console
/// report to `out`
///
/// Chart and document failures are reported and skipped. Returns the sorted
/// artifact manifest.
pub fn report_session<S, W>(
    table: &SessionTable,
    config: &AnalysisConfig,
    sink: &mut S,
    out: &mut W,
) -> Result<Vec<String>>
where
    S: ArtifactSink,
    W: Write,
{
    report_with_metrics(table, resolve_metrics(table), config, sink, out)
}

/// [`report_session`] for a table whose availability is already resolved
pub fn report_with_metrics<S, W>(
    table: &SessionTable,
    metrics: MetricSet,
    config: &AnalysisConfig,
    sink: &mut S,
    out: &mut W,
) -> Result<Vec<String>>
where
    S: ArtifactSink,
    W: Write,
{
    let analysis = SessionAnalysis::with_metrics(table, metrics, config)?;

    line(out, format_args!("   • {} rows, {} columns", table.row_count(), table.column_count()))?;
    match table.time_range() {
        Some((start, end)) => line(out, format_args!("   • Time range: {:.2} to {:.2} s", start, end))?,
        None => line(out, "   • Time range: n/a")?,
    }

    line(out, "\n📊 Main statistics:")?;
    text(out, &analysis.statistics.to_table_string())?;
    sink.write_text(STATISTICS_CSV, &statistics_csv(&analysis.statistics)?)?;

    line(out, "\n🔗 Main correlations:")?;
    text(out, &analysis.focus.to_table_string())?;

    if config.charts {
        for (name, chart) in analysis.chart_requests(config) {
            if let Err(e) = sink.render_chart(&name, &chart, &config.render) {
                warn!(artifact = %name, error = %e, "chart not rendered");
                line(out, format_args!("   • Chart {} not generated: {}", name, e))?;
            }
        }
    }

    if let Some(anomalies) = &analysis.anomalies {
        line(
            out,
            format_args!(
                "\n⚡ {} flicks detected (threshold {:.3})",
                anomalies.flicks.count(),
                anomalies.flicks.threshold
            ),
        )?;
        if !anomalies.outliers.is_empty() {
            line(
                out,
                format_args!(
                    "\n🚨 {} abnormal movements detected (speed outliers)",
                    anomalies.outliers.count()
                ),
            )?;
            let records = anomalies.outliers.records(table);
            sink.write_text(ANOMALIES_CSV, &anomalies_csv(&records)?)?;
        }
    }

    line(out, "\n🧠 Automatic synthesis:")?;
    for finding in &analysis.findings {
        line(out, format_args!("   • {}", finding))?;
    }
    line(out, format_args!("   • {}", CLOSING_REMARK))?;

    sink.write_text(SUMMARY_JSON, &JsonSummary::from_analysis(&analysis).to_json()?)?;

    if config.document {
        match write_document(&analysis, sink) {
            Ok(path) => line(out, format_args!("   • Document exported: {}", path.display()))?,
            Err(e) => {
                warn!(error = %e, "document not generated");
                line(out, format_args!("   • Document not generated: {}", e))?;
            }
        }
    }

    let manifest = sink.artifacts();
    info!(
        table = table.name(),
        artifacts = manifest.len(),
        "session report complete"
    );
    line(out, format_args!("\n✅ Report generated in: {}", sink.location().display()))?;
    for name in &manifest {
        line(out, format_args!("   - {}", name))?;
    }
    Ok(manifest)
}

/// Assemble the HTML document from the charts this sink already holds
fn write_document<S: ArtifactSink>(analysis: &SessionAnalysis<'_>, sink: &mut S) -> Result<PathBuf> {
    let mut document = HtmlReport::new(analysis);
    for (name, caption) in DOCUMENT_FIGURES {
        if !sink.has_artifact(name) {
            continue;
        }
        match sink.read_artifact(name) {
            Some(png) => document.add_embedded_figure(name, caption, png),
            None => document.add_figure(name, caption),
        }
    }
    sink.write_text(DOCUMENT_NAME, &document.to_html())
        .map_err(|e| AnalysisError::Document(e.to_string()))?;
    Ok(sink.location().join(DOCUMENT_NAME))
}

fn line(out: &mut impl Write, message: impl Display) -> Result<()> {
    writeln!(out, "{}", message).map_err(console_error)
}

fn text(out: &mut impl Write, block: &str) -> Result<()> {
    out.write_all(block.as_bytes()).map_err(console_error)
}

fn console_error(source: std::io::Error) -> AnalysisError {
    AnalysisError::Io {
        artifact: "console".to_string(),
        source,
    }
}

#[cfg(test)]
mod tests;
