//! Machine-readable session summary (`summary.json`)
//!
//! Undefined values (`NaN`) serialize as `null`.

use crate::anomaly::OutlierFences;
use crate::config::ReportMode;
use crate::correlation::FocusView;
use crate::error::{AnalysisError, Result};
use crate::report::SessionAnalysis;
use crate::synthesis::Finding;
use serde::Serialize;

/// Artifact name of the JSON summary
pub const SUMMARY_JSON: &str = "summary.json";

/// First and last timestamp of the session
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JsonTimeRange {
    pub start: f64,
    pub end: f64,
}

/// Statistics of one numeric column
#[derive(Debug, Clone, Serialize)]
pub struct JsonColumnStats {
    pub column: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonFlicks {
    pub threshold: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOutliers {
    #[serde(flatten)]
    pub fences: OutlierFences,
    pub count: usize,
}

/// A triggered synthesis rule with its message
#[derive(Debug, Clone, Serialize)]
pub struct JsonFinding {
    pub code: Finding,
    pub message: String,
}

/// Complete summary of one analyzed session
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Input file name
    pub source: String,
    pub mode: ReportMode,
    pub rows: usize,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<JsonTimeRange>,
    pub statistics: Vec<JsonColumnStats>,
    pub correlations: FocusView,
    /// Present only when the table has a speed column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flicks: Option<JsonFlicks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<JsonOutliers>,
    pub findings: Vec<JsonFinding>,
}

impl JsonSummary {
    pub fn from_analysis(analysis: &SessionAnalysis<'_>) -> Self {
        let table = analysis.table;
        Self {
            source: table.name().to_string(),
            mode: analysis.mode,
            rows: table.row_count(),
            columns: table.column_count(),
            time_range: table
                .time_range()
                .map(|(start, end)| JsonTimeRange { start, end }),
            statistics: analysis
                .statistics
                .iter()
                .map(|(column, s)| JsonColumnStats {
                    column: column.to_string(),
                    mean: s.mean,
                    std: s.std,
                    min: s.min,
                    max: s.max,
                })
                .collect(),
            correlations: analysis.focus.clone(),
            flicks: analysis.anomalies.as_ref().map(|a| JsonFlicks {
                threshold: a.flicks.threshold,
                count: a.flicks.count(),
            }),
            outliers: analysis.anomalies.as_ref().map(|a| JsonOutliers {
                fences: a.outliers.fences,
                count: a.outliers.count(),
            }),
            findings: analysis
                .findings
                .iter()
                .map(|&code| JsonFinding {
                    code,
                    message: code.to_string(),
                })
                .collect(),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::Io {
            artifact: SUMMARY_JSON.to_string(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::table::{Column, SessionTable};

    fn table() -> SessionTable {
        SessionTable::from_columns(
            "session.csv",
            vec![
                Column::numeric("timestamp", vec![0.0, 1.0, 2.0, 3.0]),
                Column::numeric("speed", vec![10.0, 12.0, 11.0, 300.0]),
                Column::numeric("fatigue_index", vec![0.2, 0.9, 0.3, 0.1]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_summary_fields() {
        let table = table();
        let analysis = SessionAnalysis::run(&table, &AnalysisConfig::default()).unwrap();
        let summary = JsonSummary::from_analysis(&analysis);

        assert_eq!(summary.source, "session.csv");
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.statistics.len(), 3);
        assert_eq!(summary.flicks.as_ref().unwrap().count, 0);
        assert_eq!(summary.findings.len(), 1);
    }

    #[test]
    fn test_json_serialization() {
        let table = table();
        let analysis = SessionAnalysis::run(&table, &AnalysisConfig::default()).unwrap();
        let json = JsonSummary::from_analysis(&analysis).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mode"], "full");
        assert_eq!(value["findings"][0]["code"], "fatigue_detected");
        assert!(value["outliers"]["upper"].is_number());
        assert!(value["outliers"]["count"].is_number());
    }

    #[test]
    fn test_speedless_table_omits_anomaly_sections() {
        let table = SessionTable::from_columns(
            "s.csv",
            vec![Column::numeric("timestamp", vec![0.0, 1.0])],
        )
        .unwrap();
        let analysis = SessionAnalysis::run(&table, &AnalysisConfig::default()).unwrap();
        let json = JsonSummary::from_analysis(&analysis).to_json().unwrap();
        assert!(!json.contains("\"flicks\""));
        assert!(!json.contains("\"outliers\""));
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let table = SessionTable::from_columns(
            "s.csv",
            vec![
                Column::numeric("timestamp", vec![0.0, 1.0]),
                Column::numeric("speed", vec![5.0, 5.0]),
            ],
        )
        .unwrap();
        let analysis = SessionAnalysis::run(&table, &AnalysisConfig::default()).unwrap();
        let json = JsonSummary::from_analysis(&analysis).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        // constant speed: no variance, undefined self-correlation
        assert!(value["correlations"]["values"][0][0].is_null());
    }
}
