// Orchestrator tests, mostly against an in-memory sink
//
// MemorySink records charts without drawing them, so most of these cover the
// gating decisions and the console layout without a plotting backend.

use super::*;
use crate::config::AnalysisConfig;
use crate::sink::{DirectorySink, MemorySink};

const FULL_HEADER: &str = "timestamp,x,y,speed,acceleration,flick_intensity,fatigue_index,\
stress_indicator,pixel_perfect_precision,stability_score,tracking_smoothness,\
micro_correction_ratio,target_acquisition_efficiency,overshoot_ratio,chaos_metric,\
entropy_score,is_burst,micro_movement_count";

/// Full-width session with deterministic, varied rows
fn full_table() -> SessionTable {
    let mut csv = String::from(FULL_HEADER);
    csv.push('\n');
    for i in 0..40 {
        let f = i as f64;
        let speed = if i == 25 { 2500.0 } else { 100.0 + (i % 7) as f64 * 10.0 };
        csv.push_str(&format!(
            "{:.1},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            f * 0.1,
            100 + (i * 13) % 50,
            200 + (i * 7) % 30,
            speed,
            (i % 5) as f64 - 2.0,
            (i % 3) as f64 * 0.1,
            0.2 + f / 50.0,
            0.3,
            0.9,
            0.6 + (i % 2) as f64 * 0.1,
            0.4,
            0.1 * (i % 4) as f64,
            0.5,
            0.05,
            0.7,
            0.8,
            if i % 4 == 0 { "True" } else { "False" },
            i % 6
        ));
    }
    SessionTable::from_reader("full.csv", csv.as_bytes()).unwrap()
}

fn table_from(name: &str, csv: &str) -> SessionTable {
    SessionTable::from_reader(name, csv.as_bytes()).unwrap()
}

fn speed_table(speeds: &[f64]) -> SessionTable {
    let mut csv = String::from("timestamp,speed\n");
    for (i, s) in speeds.iter().enumerate() {
        csv.push_str(&format!("{},{}\n", i, s));
    }
    table_from("speed.csv", &csv)
}

fn run(table: &SessionTable, config: &AnalysisConfig) -> (MemorySink, String) {
    let mut sink = MemorySink::new("speed_report");
    let mut out = Vec::new();
    report_session(table, config, &mut sink, &mut out).unwrap();
    (sink, String::from_utf8(out).unwrap())
}

#[test]
fn test_output_dir_next_to_input() {
    let dir = output_dir(Path::new("/data/sessions/day1.csv"), None);
    assert_eq!(dir, PathBuf::from("/data/sessions/day1_report"));
}

#[test]
fn test_output_dir_under_root() {
    let dir = output_dir(Path::new("/data/day1.csv"), Some(Path::new("/tmp/out")));
    assert_eq!(dir, PathBuf::from("/tmp/out/day1_report"));
}

#[test]
fn test_output_dir_relative_input() {
    assert_eq!(output_dir(Path::new("day1.csv"), None), PathBuf::from("day1_report"));
}

#[test]
fn test_full_mode_chart_set() {
    let table = full_table();
    let (sink, _) = run(&table, &AnalysisConfig::default());

    for name in [
        "hist_timestamp.png",
        "hist_speed.png",
        "hist_micro_movement_count.png",
        "position_heatmap.png",
        "flick_detection.png",
        "speed_distribution.png",
        "precision_stability.png",
        "correlation_heatmap.png",
        "fatigue_stress.png",
        "bursts_micro.png",
        "tracking_smoothness.png",
        "chaos_metric.png",
        "entropy_score.png",
    ] {
        assert!(sink.charts.contains_key(name), "missing {}", name);
    }
    // boolean-like columns get no histogram
    assert!(!sink.charts.contains_key("hist_is_burst.png"));
}

#[test]
fn test_reduced_mode_chart_set() {
    let table = full_table();
    let (sink, _) = run(&table, &AnalysisConfig::reduced());

    assert!(sink.charts.keys().all(|name| !name.starts_with("hist_")));
    assert!(sink.charts.contains_key("speed_distribution.png"));
    assert!(sink.charts.contains_key("bursts_micro.png"));
    assert!(sink.charts.contains_key("flick_detection.png"));
    assert!(!sink.charts.contains_key("tracking_smoothness.png"));
    assert!(!sink.charts.contains_key("entropy_score.png"));
}

#[test]
fn test_minimal_table_skips_optional_sections() {
    let table = table_from("min.csv", "timestamp\n0.0\n1.0\n2.0\n");
    let (sink, text) = run(&table, &AnalysisConfig::default());

    assert_eq!(
        sink.artifacts(),
        vec![
            "correlation_heatmap.png",
            "hist_timestamp.png",
            "report.html",
            "statistics.csv",
            "summary.json"
        ]
    );
    assert!(!text.contains("flicks detected"));
    assert!(text.contains("(no focus metrics available)"));
}

#[test]
fn test_partial_pair_draws_present_series_only() {
    let table = table_from(
        "p.csv",
        "timestamp,fatigue_index\n0,0.1\n1,0.2\n2,0.3\n",
    );
    let (sink, _) = run(&table, &AnalysisConfig::default());
    match sink.charts.get("fatigue_stress.png") {
        Some(Chart::Lines(chart)) => {
            assert_eq!(chart.series.len(), 1);
            assert_eq!(chart.series[0].label, "Fatigue");
        }
        other => panic!("unexpected chart {:?}", other),
    }
    assert!(!sink.charts.contains_key("precision_stability.png"));
}

#[test]
fn test_anomalies_written_only_when_outliers_exist() {
    let (sink, text) = run(&speed_table(&[5.0; 12]), &AnalysisConfig::default());
    assert!(!sink.has_artifact("anomalies.csv"));
    assert!(!text.contains("abnormal movements"));

    let (sink, text) = run(
        &speed_table(&[10.0, 12.0, 12.0, 13.0, 12.0, 200.0]),
        &AnalysisConfig::default(),
    );
    let csv = sink.text("anomalies.csv").unwrap();
    assert_eq!(csv, "timestamp,speed\n5,200\n");
    assert!(text.contains("🚨 1 abnormal movements detected (speed outliers)"));
}

#[test]
fn test_single_spike_is_a_flick_in_a_long_session() {
    let mut speeds = vec![1.0; 20];
    speeds.push(20.0);
    let table = speed_table(&speeds);
    let (sink, text) = run(&table, &AnalysisConfig::default());

    assert!(text.contains("⚡ 1 flicks detected"));
    match sink.charts.get("flick_detection.png") {
        Some(Chart::Lines(chart)) => {
            let markers = chart.markers.as_ref().unwrap();
            assert_eq!(markers.points, vec![(20.0, 20.0)]);
        }
        other => panic!("unexpected chart {:?}", other),
    }
}

#[test]
fn test_console_sections_in_order() {
    let table = full_table();
    let (_, text) = run(&table, &AnalysisConfig::default());

    let order = [
        "   • 40 rows, 18 columns",
        "   • Time range: 0.00 to 3.90 s",
        "📊 Main statistics:",
        "🔗 Main correlations:",
        "⚡ ",
        "🧠 Automatic synthesis:",
        "Pixel precision is very good overall",
        "Tracking is not smooth",
        "Chaotic movement",
        "Highly unpredictable movement",
        CLOSING_REMARK,
        "   • Document exported: speed_report/report.html",
        "✅ Report generated in: speed_report",
        "   - bursts_micro.png",
    ];
    let mut from = 0;
    for needle in order {
        let at = text[from..]
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' not found in order", needle));
        from += at + needle.len();
    }
}

#[test]
fn test_document_lists_existing_charts_only() {
    let table = speed_table(&[1.0, 2.0, 3.0, 4.0]);
    let (sink, _) = run(&table, &AnalysisConfig::default());
    let html = sink.text(DOCUMENT_NAME).unwrap();
    assert!(html.contains("speed_distribution.png"));
    assert!(html.contains("flick_detection.png"));
    assert!(!html.contains("fatigue_stress.png"));
}

#[test]
fn test_no_charts_no_figures() {
    let config = AnalysisConfig {
        charts: false,
        ..AnalysisConfig::default()
    };
    let (sink, _) = run(&speed_table(&[1.0, 2.0, 3.0]), &config);
    assert!(sink.charts.is_empty());
    assert!(!sink.text(DOCUMENT_NAME).unwrap().contains("<figure>"));
}

#[test]
fn test_no_document_flag() {
    let config = AnalysisConfig {
        document: false,
        ..AnalysisConfig::default()
    };
    let (sink, text) = run(&speed_table(&[1.0, 2.0, 3.0]), &config);
    assert!(!sink.has_artifact(DOCUMENT_NAME));
    assert!(!text.contains("Document"));
}

#[test]
fn test_reanalysis_is_byte_identical() {
    let table = full_table();
    let (a, _) = run(&table, &AnalysisConfig::default());
    let (b, _) = run(&table, &AnalysisConfig::default());
    assert_eq!(a.text(STATISTICS_CSV), b.text(STATISTICS_CSV));
    assert_eq!(a.text(SUMMARY_JSON), b.text(SUMMARY_JSON));
}

#[test]
fn test_focus_view_follows_mode() {
    let table = full_table();
    let full = SessionAnalysis::run(&table, &AnalysisConfig::default()).unwrap();
    let reduced = SessionAnalysis::run(&table, &AnalysisConfig::reduced()).unwrap();
    assert_eq!(full.focus.columns.len(), 13);
    assert_eq!(reduced.focus.columns.len(), 5);
    // rows sorted by name
    assert_eq!(reduced.focus.rows[0], "acceleration");
}

#[test]
fn test_document_inlines_rendered_charts() {
    let tmp = tempfile::TempDir::new().unwrap();
    let table = speed_table(&[1.0, 2.0, 3.0, 4.0, 2.5]);
    let mut sink = DirectorySink::new(tmp.path().join("speed_report"));
    let mut out = Vec::new();
    report_session(&table, &AnalysisConfig::reduced(), &mut sink, &mut out).unwrap();

    assert!(sink.has_artifact("speed_distribution.png"));
    let html = std::fs::read_to_string(sink.path_of(DOCUMENT_NAME)).unwrap();
    assert!(html.contains("src=\"data:image/png;base64,"));
    assert!(!html.contains("src=\"speed_distribution.png\""));
}
