//! Per-session analysis benchmark
//!
//! Measures the analysis pass over one table (statistics, correlation,
//! speed anomalies, synthesis) and the chart request planning, without any
//! drawing or file I/O.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench session_analysis
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mouse_metrics::config::AnalysisConfig;
use mouse_metrics::report::{report_session, SessionAnalysis};
use mouse_metrics::sink::MemorySink;
use mouse_metrics::table::SessionTable;

/// Synthetic session with the common telemetry columns
fn create_bench_table(rows: usize) -> SessionTable {
    let mut csv = String::from(
        "timestamp,x,y,speed,acceleration,fatigue_index,stress_indicator,\
         pixel_perfect_precision,stability_score,tracking_smoothness,chaos_metric,\
         entropy_score,is_burst,micro_movement_count\n",
    );
    for i in 0..rows {
        let t = i as f64 * 0.01;
        let speed = 200.0 + 150.0 * (t * 3.0).sin() + if i % 97 == 0 { 3000.0 } else { 0.0 };
        csv.push_str(&format!(
            "{:.2},{:.1},{:.1},{:.2},{:.2},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{},{}\n",
            t,
            960.0 + 400.0 * t.cos(),
            540.0 + 300.0 * (t * 0.7).sin(),
            speed,
            (t * 5.0).cos() * 40.0,
            (t / 100.0).min(1.0),
            0.3 + 0.1 * (t * 2.0).sin(),
            0.85,
            0.7 + 0.05 * t.sin(),
            0.6,
            0.4,
            0.5,
            i % 13 == 0,
            i % 5
        ));
    }
    SessionTable::from_reader("bench.csv", csv.as_bytes()).expect("bench table")
}

/// Benchmark: analysis pass at increasing session lengths
fn bench_session_analysis(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let mut group = c.benchmark_group("session_analysis");

    for rows in [1_000, 10_000, 50_000] {
        let table = create_bench_table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let analysis = SessionAnalysis::run(black_box(table), &config).unwrap();
                black_box(analysis.findings.len());
            });
        });
    }

    group.finish();
}

/// Benchmark: chart request planning (histograms, density grid, KDE)
fn bench_chart_requests(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let table = create_bench_table(10_000);
    let analysis = SessionAnalysis::run(&table, &config).unwrap();

    c.bench_function("chart_requests_10k", |b| {
        b.iter(|| {
            black_box(analysis.chart_requests(&config).len());
        });
    });
}

/// Benchmark: full report into an in-memory sink
fn bench_report_to_memory(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let table = create_bench_table(10_000);

    c.bench_function("report_session_memory_10k", |b| {
        b.iter(|| {
            let mut sink = MemorySink::new("bench_report");
            let mut out = Vec::new();
            report_session(&table, &config, &mut sink, &mut out).unwrap();
            black_box(sink.artifacts().len());
        });
    });
}

criterion_group!(
    benches,
    bench_session_analysis,
    bench_chart_requests,
    bench_report_to_memory
);
criterion_main!(benches);
