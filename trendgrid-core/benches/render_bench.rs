//! Criterion benchmarks for the grid renderer.
//!
//! Benchmarks:
//! 1. Plotting only (cell mapping, collisions)
//! 2. Full render (plot, axis labels, legend)

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trendgrid_core::data::{Series, SeriesResult};
use trendgrid_core::render::{GridRenderer, TitleParts};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_result(n: usize, keys: &[&str]) -> SeriesResult {
    let start = Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap();
    SeriesResult {
        timestamps: (0..n).map(|i| start + Duration::weeks(i as i64)).collect(),
        series: keys
            .iter()
            .enumerate()
            .map(|(k, key)| Series {
                key: key.to_string(),
                values: (0..n)
                    .map(|i| {
                        if i % 17 == 0 {
                            None
                        } else {
                            Some(50.0 + ((i + k * 13) as f64 * 0.1).sin() * 50.0)
                        }
                    })
                    .collect(),
            })
            .collect(),
    }
}

// ── 1. Plot ──────────────────────────────────────────────────────────

fn bench_plot(c: &mut Criterion) {
    let mut group = c.benchmark_group("plot");
    let keys: Vec<String> = ["rust", "go", "zig"].iter().map(|k| k.to_string()).collect();
    let renderer = GridRenderer::new(15, 75).unwrap();

    for n in [52, 260, 2_000] {
        let data = make_result(n, &["rust", "go", "zig"]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| renderer.plot(black_box(data), black_box(&keys)).unwrap())
        });
    }
    group.finish();
}

// ── 2. Render ────────────────────────────────────────────────────────

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let keys: Vec<String> = ["rust", "go", "zig"].iter().map(|k| k.to_string()).collect();
    let title = TitleParts::new("Google Trends Interest", "today 5-y", "");
    let data = make_result(260, &["rust", "go", "zig"]);

    for (h, w) in [(15, 75), (40, 200)] {
        let renderer = GridRenderer::new(h, w).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{h}x{w}")),
            &renderer,
            |b, renderer| {
                b.iter(|| {
                    renderer
                        .render(black_box(&data), black_box(&keys), &title)
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_plot, bench_render);
criterion_main!(benches);
