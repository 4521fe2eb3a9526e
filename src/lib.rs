//! mouse-metrics - Session analytics for mouse telemetry exports
//!
//! This library loads per-session telemetry tables, derives descriptive
//! statistics, correlations, flick and outlier flags and qualitative
//! findings, and emits tables, charts and a consolidated document through
//! pluggable artifact sinks.

pub mod anomaly;
pub mod batch;
pub mod chart;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod correlation;
pub mod csv_output;
pub mod error;
pub mod html_output;
pub mod json_output;
pub mod metrics;
pub mod render;
pub mod report;
pub mod sink;
pub mod stats;
pub mod synthesis;
pub mod table;
