//! Descriptive statistics for session tables
//!
//! Mean, sample standard deviation, min and max per numeric column, rounded
//! to 3 decimals. Missing cells are skipped; an empty column (or a single
//! value for the standard deviation) yields `NaN`, which is passed through
//! rather than treated as an error.

use crate::table::SessionTable;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decimal places kept in the statistics summary
pub const STATS_DECIMALS: i32 = 3;

/// Summary statistics for one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Compute unrounded statistics over the non-missing values
    pub fn from_values(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::NAN, f64::min);
        let max = values.iter().copied().fold(f64::NAN, f64::max);
        Self {
            mean: mean(values),
            std: sample_std(values),
            min,
            max,
        }
    }

    fn rounded(self, decimals: i32) -> Self {
        Self {
            mean: round_to(self.mean, decimals),
            std: round_to(self.std, decimals),
            min: round_to(self.min, decimals),
            max: round_to(self.max, decimals),
        }
    }
}

/// Per-column statistics in table column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    columns: Vec<(String, ColumnStats)>,
}

impl StatisticsSummary {
    /// Summarize every numeric column of `table`
    pub fn compute(table: &SessionTable) -> Self {
        let columns = table
            .numeric_columns()
            .map(|column| {
                let values = present(column.numeric_values().unwrap_or(&[]));
                let stats = ColumnStats::from_values(&values).rounded(STATS_DECIMALS);
                (column.name().to_string(), stats)
            })
            .collect();
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnStats)> {
        self.columns.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fixed-width text table, one row per column
    pub fn to_table_string(&self) -> String {
        let width = self
            .columns
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);

        let mut out = format!(
            "{:width$} {:>12} {:>12} {:>12} {:>12}\n",
            "",
            "mean",
            "std",
            "min",
            "max",
            width = width
        );
        for (name, s) in &self.columns {
            out.push_str(&format!(
                "{:width$} {:>12.3} {:>12.3} {:>12.3} {:>12.3}\n",
                name,
                s.mean,
                s.std,
                s.min,
                s.max,
                width = width
            ));
        }
        out
    }
}

/// Non-missing values of a column, in row order
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Round half away from zero to `decimals` places; `NaN` passes through
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // avoid printing "-0.000"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Quantile interpolation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuantileMethod {
    /// Weibull plotting positions, `h = (n + 1) p` (Excel `QUARTILE.EXC`)
    #[default]
    Exclusive,
    /// Linear interpolation between order statistics, `h = (n - 1) p`
    Linear,
}

/// Sort a copy of `values` ascending
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Quantile `q` in `[0, 1]` of already sorted data
///
/// Positions outside the sample clamp to the smallest/largest value.
pub fn quantile(sorted_data: &[f64], q: f64, method: QuantileMethod) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_data[0];
    }

    // zero-based fractional index
    let index = match method {
        QuantileMethod::Linear => q * (n - 1) as f64,
        QuantileMethod::Exclusive => q * (n + 1) as f64 - 1.0,
    };
    let index = index.clamp(0.0, (n - 1) as f64);

    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}
