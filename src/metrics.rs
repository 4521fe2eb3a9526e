//! Metric availability resolution
//!
//! Telemetry exports differ in which derived metrics they carry. The resolver
//! computes a [`MetricSet`] once per table; every optional analysis, chart
//! and synthesis rule consults it instead of probing the raw column list.

use crate::table::SessionTable;
use std::fmt;

/// Optional telemetry columns the analyses know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    X,
    Y,
    Speed,
    Acceleration,
    FlickIntensity,
    FatigueIndex,
    StressIndicator,
    PixelPerfectPrecision,
    StabilityScore,
    TrackingSmoothness,
    MicroCorrectionRatio,
    TargetAcquisitionEfficiency,
    OvershootRatio,
    ChaosMetric,
    EntropyScore,
    IsBurst,
    MicroMovementCount,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::X,
        Metric::Y,
        Metric::Speed,
        Metric::Acceleration,
        Metric::FlickIntensity,
        Metric::FatigueIndex,
        Metric::StressIndicator,
        Metric::PixelPerfectPrecision,
        Metric::StabilityScore,
        Metric::TrackingSmoothness,
        Metric::MicroCorrectionRatio,
        Metric::TargetAcquisitionEfficiency,
        Metric::OvershootRatio,
        Metric::ChaosMetric,
        Metric::EntropyScore,
        Metric::IsBurst,
        Metric::MicroMovementCount,
    ];

    /// Column name in the input table
    pub fn column(self) -> &'static str {
        match self {
            Metric::X => "x",
            Metric::Y => "y",
            Metric::Speed => "speed",
            Metric::Acceleration => "acceleration",
            Metric::FlickIntensity => "flick_intensity",
            Metric::FatigueIndex => "fatigue_index",
            Metric::StressIndicator => "stress_indicator",
            Metric::PixelPerfectPrecision => "pixel_perfect_precision",
            Metric::StabilityScore => "stability_score",
            Metric::TrackingSmoothness => "tracking_smoothness",
            Metric::MicroCorrectionRatio => "micro_correction_ratio",
            Metric::TargetAcquisitionEfficiency => "target_acquisition_efficiency",
            Metric::OvershootRatio => "overshoot_ratio",
            Metric::ChaosMetric => "chaos_metric",
            Metric::EntropyScore => "entropy_score",
            Metric::IsBurst => "is_burst",
            Metric::MicroMovementCount => "micro_movement_count",
        }
    }

    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Ordered focus list for the full correlation report
pub const FOCUS_METRICS: [Metric; 13] = [
    Metric::Speed,
    Metric::Acceleration,
    Metric::FlickIntensity,
    Metric::FatigueIndex,
    Metric::StressIndicator,
    Metric::PixelPerfectPrecision,
    Metric::StabilityScore,
    Metric::TrackingSmoothness,
    Metric::MicroCorrectionRatio,
    Metric::TargetAcquisitionEfficiency,
    Metric::OvershootRatio,
    Metric::ChaosMetric,
    Metric::EntropyScore,
];

/// Ordered focus list for the reduced correlation report
pub const SHORT_FOCUS_METRICS: [Metric; 5] = [
    Metric::Speed,
    Metric::Acceleration,
    Metric::FlickIntensity,
    Metric::FatigueIndex,
    Metric::StressIndicator,
];

/// Capability record: which known metrics a table carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricSet(u32);

impl MetricSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Resolve the metrics present in `table`
    ///
    /// A metric counts as present when its column exists and holds numeric
    /// or boolean-like values; a text column under a known name is ignored.
    pub fn resolve(table: &SessionTable) -> Self {
        table
            .columns()
            .iter()
            .filter(|c| c.as_f64().is_some())
            .filter_map(|c| Metric::from_column(c.name()))
            .collect()
    }

    pub fn insert(&mut self, metric: Metric) {
        self.0 |= metric.bit();
    }

    pub fn contains(self, metric: Metric) -> bool {
        self.0 & metric.bit() != 0
    }

    pub fn contains_all(self, metrics: &[Metric]) -> bool {
        metrics.iter().all(|&m| self.contains(m))
    }

    pub fn contains_any(self, metrics: &[Metric]) -> bool {
        metrics.iter().any(|&m| self.contains(m))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Present metrics in declaration order
    pub fn iter(self) -> impl Iterator<Item = Metric> {
        Metric::ALL.into_iter().filter(move |&m| self.contains(m))
    }

    /// Intersect an ordered focus list with availability, keeping its order
    pub fn focus(self, list: &[Metric]) -> Vec<Metric> {
        list.iter().copied().filter(|&m| self.contains(m)).collect()
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut set = MetricSet::empty();
        for metric in iter {
            set.insert(metric);
        }
        set
    }
}
