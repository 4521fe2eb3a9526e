//! Cross-session speed comparison
//!
//! Series are taken as-is: no resampling, interpolation or timestamp
//! alignment. Sessions with disjoint time ranges simply land side by side on
//! the shared axis.

use crate::metrics::{Metric, MetricSet};
use crate::table::SessionTable;

/// Minimum number of speed-bearing sessions for a comparison
pub const MIN_COMPARED_SESSIONS: usize = 2;

/// One session's `(timestamp, speed)` line
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl SpeedSeries {
    /// Series for a table with a speed column, or `None`
    ///
    /// `metrics` is the table's resolved availability. Rows missing either
    /// value are left out.
    pub fn from_table(table: &SessionTable, metrics: MetricSet) -> Option<Self> {
        if !metrics.contains(Metric::Speed) {
            return None;
        }
        let speed = table.numeric(Metric::Speed.column()).ok()?;
        let points = table
            .timestamps()
            .iter()
            .zip(speed)
            .filter_map(|(t, s)| Some(((*t)?, (*s)?)))
            .collect();
        Some(Self {
            label: format!("{} (speed)", table.name()),
            points,
        })
    }
}

/// Collect the speed series of every qualifying table
///
/// Returns `None` when fewer than [`MIN_COMPARED_SESSIONS`] tables carry a
/// speed column; no comparison artifact is produced in that case.
pub fn compare_sessions<'a, I>(tables: I) -> Option<Vec<SpeedSeries>>
where
    I: IntoIterator<Item = (&'a SessionTable, MetricSet)>,
{
    let series: Vec<SpeedSeries> = tables
        .into_iter()
        .filter_map(|(table, metrics)| SpeedSeries::from_table(table, metrics))
        .collect();
    (series.len() >= MIN_COMPARED_SESSIONS).then_some(series)
}
