//! Flick and outlier detection on the speed column
//!
//! Two independent rules over one snapshot of `speed`:
//!
//! - **Flicks**: rows whose speed exceeds `mean + k·σ` (sample σ over the
//!   whole session, `k = 2` by default).
//! - **Outliers**: rows outside the Tukey fence
//!   `[Q1 - f·IQR, Q3 + f·IQR]` (`f = 1.5` by default).
//!
//! Membership may overlap; the two results are never deduplicated.

use crate::error::Result;
use crate::metrics::{Metric, MetricSet};
use crate::stats::{mean, present, quantile, sample_std, sorted, QuantileMethod};
use crate::table::{SessionTable, TIMESTAMP};
use serde::Serialize;
use tracing::debug;

/// Columns copied into the anomalies table, when the table carries them
pub const ANOMALY_COLUMNS: [&str; 4] = [TIMESTAMP, "x", "y", "speed"];

/// Speed spikes above the session-wide threshold
#[derive(Debug, Clone, PartialEq)]
pub struct FlickDetection {
    pub threshold: f64,
    /// Row indices, in table order
    pub rows: Vec<usize>,
}

impl FlickDetection {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(timestamp, speed)` points of the flagged rows, for the overlay chart
    pub fn points(&self, table: &SessionTable) -> Vec<(f64, f64)> {
        let ts = table.timestamps();
        let speed = table.numeric(Metric::Speed.column()).unwrap_or(&[]);
        self.rows
            .iter()
            .filter_map(|&i| Some((ts.get(i).copied().flatten()?, speed.get(i).copied().flatten()?)))
            .collect()
    }
}

/// Tukey fence derived from the speed quartiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierFences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierFences {
    pub fn from_values(values: &[f64], factor: f64, method: QuantileMethod) -> Self {
        let data = sorted(values);
        let q1 = quantile(&data, 0.25, method);
        let q3 = quantile(&data, 0.75, method);
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - factor * iqr,
            upper: q3 + factor * iqr,
        }
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Rows outside the Tukey fence
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierDetection {
    pub fences: OutlierFences,
    /// Row indices, in table order
    pub rows: Vec<usize>,
}

impl OutlierDetection {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flagged rows restricted to [`ANOMALY_COLUMNS`]
    pub fn records(&self, table: &SessionTable) -> AnomalyRecords {
        let sources: Vec<(&str, &[Option<f64>])> = ANOMALY_COLUMNS
            .iter()
            .filter_map(|&name| table.numeric(name).ok().map(|values| (name, values)))
            .collect();

        AnomalyRecords {
            columns: sources.iter().map(|(name, _)| name.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|&i| sources.iter().map(|(_, v)| v.get(i).copied().flatten()).collect())
                .collect(),
        }
    }
}

/// Tabular anomaly output: a column subset of the flagged rows
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyRecords {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

/// Results of both speed rules for one table
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedAnomalies {
    pub flicks: FlickDetection,
    pub outliers: OutlierDetection,
}

impl SpeedAnomalies {
    /// Run both rules, or `None` when the table has no speed column
    pub fn detect(
        table: &SessionTable,
        metrics: MetricSet,
        sigma: f64,
        iqr_factor: f64,
        method: QuantileMethod,
    ) -> Result<Option<Self>> {
        if !metrics.contains(Metric::Speed) {
            return Ok(None);
        }
        let speed = table.numeric(Metric::Speed.column())?;
        let flicks = detect_flicks(speed, sigma);
        let outliers = detect_outliers(speed, iqr_factor, method);
        debug!(
            table = table.name(),
            flicks = flicks.count(),
            outliers = outliers.count(),
            "speed anomalies detected"
        );
        Ok(Some(Self { flicks, outliers }))
    }
}

/// Flag rows with `speed > mean + sigma * std`
pub fn detect_flicks(speed: &[Option<f64>], sigma: f64) -> FlickDetection {
    let values = present(speed);
    let threshold = mean(&values) + sigma * sample_std(&values);
    let rows = speed
        .iter()
        .enumerate()
        .filter(|(_, v)| matches!(v, Some(s) if *s > threshold))
        .map(|(i, _)| i)
        .collect();
    FlickDetection { threshold, rows }
}

/// Flag rows outside `[Q1 - factor * IQR, Q3 + factor * IQR]`
pub fn detect_outliers(
    speed: &[Option<f64>],
    factor: f64,
    method: QuantileMethod,
) -> OutlierDetection {
    let fences = OutlierFences::from_values(&present(speed), factor, method);
    let rows = speed
        .iter()
        .enumerate()
        .filter(|(_, v)| matches!(v, Some(s) if fences.is_outlier(*s)))
        .map(|(i, _)| i)
        .collect();
    OutlierDetection { fences, rows }
}
