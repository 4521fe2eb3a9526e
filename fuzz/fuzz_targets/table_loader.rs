#![no_main]

use libfuzzer_sys::fuzz_target;
use mouse_metrics::config::AnalysisConfig;
use mouse_metrics::report::SessionAnalysis;
use mouse_metrics::table::SessionTable;

fuzz_target!(|data: &[u8]| {
    // Loading and analyzing arbitrary input must never panic
    if let Ok(table) = SessionTable::from_reader("fuzz.csv", data) {
        let config = AnalysisConfig::default();
        if let Ok(analysis) = SessionAnalysis::run(&table, &config) {
            let _ = analysis.chart_requests(&config);
        }
    }
});
