//! Criterion benchmarks for TrendSignal hot paths.
//!
//! Benchmarks:
//! 1. Indicator frame build over a live-sized window
//! 2. One full evaluation cycle (frame + fusion + structure + risk)
//! 3. Bar-by-bar replay over a longer history

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trendsignal_core::frame::FrameBuilder;
use trendsignal_core::{Candle, CandleSeries, EngineConfig, SignalEngine};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    let base = chrono::DateTime::from_timestamp(1_704_153_600, 0).unwrap_or_default();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 4.0;
            let open = close - 0.3;
            Candle {
                timestamp: base + chrono::Duration::minutes(15 * i as i64),
                open,
                high: close + 1.5,
                low: open - 1.5,
                close,
                volume: 1_000.0 + (i % 97) as f64 * 10.0,
            }
        })
        .collect()
}

// ── 1. Frame build ───────────────────────────────────────────────────

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_frame");
    let builder = FrameBuilder::new(&EngineConfig::default()).unwrap();
    for n in [500usize, 2_000] {
        let candles = make_candles(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &candles, |b, candles| {
            b.iter(|| builder.build(black_box(candles)))
        });
    }
    group.finish();
}

// ── 2. Evaluation cycle ──────────────────────────────────────────────

fn bench_cycle(c: &mut Criterion) {
    let series = CandleSeries::from_candles(make_candles(500)).unwrap();
    c.bench_function("evaluate_500_bars", |b| {
        b.iter(|| {
            let mut engine = SignalEngine::new(EngineConfig::default()).unwrap();
            engine.evaluate(black_box(&series)).unwrap()
        })
    });
}

// ── 3. Replay ────────────────────────────────────────────────────────

fn bench_replay(c: &mut Criterion) {
    let series = CandleSeries::from_candles(make_candles(800)).unwrap();
    let config = EngineConfig {
        exclude_forming_bar: false,
        ..EngineConfig::default()
    };
    let mut group = c.benchmark_group("replay");
    group.sample_size(10);
    group.bench_function("800_bars_window_500", |b| {
        b.iter(|| {
            let mut engine = SignalEngine::new(config.clone()).unwrap();
            let mut emitted = 0usize;
            for end in config.min_history..=series.len() {
                let start = end.saturating_sub(500);
                if let Ok(eval) = engine.evaluate_range(&series, start..end) {
                    emitted += usize::from(eval.signal().is_some());
                }
            }
            emitted
        })
    });
    group.finish();
}

criterion_group!(benches, bench_frame, bench_cycle, bench_replay);
criterion_main!(benches);
