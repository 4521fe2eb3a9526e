//! Qualitative session findings
//!
//! A fixed, ordered rule list over aggregate values from the statistics
//! summary. A rule whose column is absent is skipped silently; the closing
//! remark is always appended.

use crate::metrics::{Metric, MetricSet};
use crate::stats::{ColumnStats, StatisticsSummary};
use serde::Serialize;
use std::fmt;

/// Remark printed after the findings, whether or not any rule fired
pub const CLOSING_REMARK: &str = "Check the charts for a detailed analysis.";

/// One triggered synthesis rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    FatigueDetected,
    StressDetected,
    PrecisionGood,
    TrackingNotSmooth,
    ChaoticMovement,
    UnpredictableMovement,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Finding::FatigueDetected => "Fatigue detected during the session (high fatigue_index)",
            Finding::StressDetected => "Stress detected during the session (high stress_indicator)",
            Finding::PrecisionGood => "Pixel precision is very good overall",
            Finding::TrackingNotSmooth => "Tracking is not smooth, work on consistency",
            Finding::ChaoticMovement => "Chaotic movement, watch your consistency",
            Finding::UnpredictableMovement => "Highly unpredictable movement (high entropy)",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy)]
enum Aggregate {
    Mean,
    Max,
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    Above(f64),
    Below(f64),
}

struct Rule {
    metric: Metric,
    aggregate: Aggregate,
    comparison: Comparison,
    finding: Finding,
}

const RULES: [Rule; 6] = [
    Rule {
        metric: Metric::FatigueIndex,
        aggregate: Aggregate::Max,
        comparison: Comparison::Above(0.7),
        finding: Finding::FatigueDetected,
    },
    Rule {
        metric: Metric::StressIndicator,
        aggregate: Aggregate::Max,
        comparison: Comparison::Above(0.7),
        finding: Finding::StressDetected,
    },
    Rule {
        metric: Metric::PixelPerfectPrecision,
        aggregate: Aggregate::Mean,
        comparison: Comparison::Above(0.8),
        finding: Finding::PrecisionGood,
    },
    Rule {
        metric: Metric::TrackingSmoothness,
        aggregate: Aggregate::Mean,
        comparison: Comparison::Below(0.5),
        finding: Finding::TrackingNotSmooth,
    },
    Rule {
        metric: Metric::ChaosMetric,
        aggregate: Aggregate::Mean,
        comparison: Comparison::Above(0.5),
        finding: Finding::ChaoticMovement,
    },
    Rule {
        metric: Metric::EntropyScore,
        aggregate: Aggregate::Mean,
        comparison: Comparison::Above(0.7),
        finding: Finding::UnpredictableMovement,
    },
];

impl Rule {
    fn fires(&self, stats: &ColumnStats) -> bool {
        let value = match self.aggregate {
            Aggregate::Mean => stats.mean,
            Aggregate::Max => stats.max,
        };
        // NaN compares false on both sides
        match self.comparison {
            Comparison::Above(limit) => value > limit,
            Comparison::Below(limit) => value < limit,
        }
    }
}

/// Evaluate the rule list in order
pub fn synthesize(summary: &StatisticsSummary, metrics: MetricSet) -> Vec<Finding> {
    RULES
        .iter()
        .filter(|rule| metrics.contains(rule.metric))
        .filter(|rule| {
            summary
                .get(rule.metric.column())
                .is_some_and(|stats| rule.fires(stats))
        })
        .map(|rule| rule.finding)
        .collect()
}
