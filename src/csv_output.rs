//! CSV artifacts: the statistics table and the speed anomalies table
//!
//! Missing and undefined values are written as empty fields.

use crate::anomaly::AnomalyRecords;
use crate::error::{AnalysisError, Result};
use crate::stats::StatisticsSummary;
use std::io;

/// Artifact name of the statistics table
pub const STATISTICS_CSV: &str = "statistics.csv";

/// Artifact name of the anomalies table
pub const ANOMALIES_CSV: &str = "anomalies.csv";

/// Header of the statistics table
const STATS_HEADER: [&str; 5] = ["column", "mean", "std", "min", "max"];

/// One row per numeric column: `column,mean,std,min,max`
pub fn statistics_csv(summary: &StatisticsSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(STATS_HEADER)?;
    for (name, s) in summary.iter() {
        writer.write_record([
            name.to_string(),
            format_value(Some(s.mean)),
            format_value(Some(s.std)),
            format_value(Some(s.min)),
            format_value(Some(s.max)),
        ])?;
    }
    finish(writer, STATISTICS_CSV)
}

/// Flagged rows with whichever of `timestamp,x,y,speed` the table has
pub fn anomalies_csv(records: &AnomalyRecords) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&records.columns)?;
    for row in &records.rows {
        writer.write_record(row.iter().map(|v| format_value(*v)))?;
    }
    finish(writer, ANOMALIES_CSV)
}

/// Format a CSV field (empty for missing or non-finite values)
fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>, artifact: &str) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| AnalysisError::Io {
        artifact: artifact.to_string(),
        source: e.into_error(),
    })?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::Io {
        artifact: artifact.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })
}
