//! Benchmark tests for videotech-core operations
//!
//! Run with: cargo bench -p videotech-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::rc::Rc;

use videotech_core::sim::SimulatedProvider;
use videotech_core::translator::estimate_playhead;
use videotech_core::{
    downgrade_host, stream_encoding, FactoryConfig, MediaSnapshot, NativeEvent, PlaybackControl, RecordingHost,
    SessionId, StyleMap, TimeRange, TranslationTable, VideoFactory,
};

// ============================================================================
// Helpers
// ============================================================================

fn full_snapshot(current_time: f64) -> MediaSnapshot {
    MediaSnapshot {
        src: Some("https://cdn.example.com/stream/master.m3u8".to_string()),
        error_code: None,
        volume: Some(0.8),
        current_time: Some(current_time),
        duration: Some(600.0),
        buffered_end: Some(current_time + 30.0),
        seekable: Some(TimeRange {
            start: 0.0,
            end: 600.0,
        }),
        paused: Some(false),
        fullscreen: Some(false),
    }
}

// ============================================================================
// Translation Benchmarks
// ============================================================================

fn bench_translation(c: &mut Criterion) {
    let table = TranslationTable::html5();
    let mut group = c.benchmark_group("Translation");

    for name in ["play", "timeupdate", "volumechange", "error", "webkitbeginfullscreen"] {
        let event = NativeEvent::new(name, full_snapshot(42.0));
        group.bench_with_input(BenchmarkId::new("translate", name), &event, |b, event| {
            b.iter(|| table.translate(black_box(event)))
        });
    }

    group.bench_function("unbound_event", |b| {
        let event = NativeEvent::bare("loadstart");
        b.iter(|| table.translate(black_box(&event)))
    });

    group.bench_function("build_html5_table", |b| b.iter(TranslationTable::html5));

    group.finish();
}

fn bench_playhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("Playhead Estimation");

    let full = full_snapshot(120.0);
    group.bench_function("full_snapshot", |b| {
        b.iter(|| estimate_playhead(black_box(&full)))
    });

    let sparse = MediaSnapshot::default();
    group.bench_function("sparse_snapshot", |b| {
        b.iter(|| estimate_playhead(black_box(&sparse)))
    });

    group.finish();
}

fn bench_stream_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stream Encoding");

    for url in [
        "video.mp4",
        "https://cdn.example.com/live/master.m3u8?token=abc",
        "https://cdn.example.com/noext",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(url), url, |b, url| {
            b.iter(|| stream_encoding(black_box(url)))
        });
    }

    group.finish();
}

// ============================================================================
// Session Benchmarks
// ============================================================================

fn bench_session_delivery(c: &mut Criterion) {
    let mut group = c.benchmark_group("Session Delivery");

    let provider = SimulatedProvider::new();
    let factory = VideoFactory::new(provider.clone(), FactoryConfig::default()).unwrap();
    let host = Rc::new(RecordingHost::new());
    let _wrapper = factory
        .create(&(), "video.mp4", SessionId::from("bench"), downgrade_host(&host), &StyleMap::new())
        .unwrap();
    let backend = provider.last().unwrap();

    group.bench_function("timeupdate", |b| {
        let mut time = 0.0;
        b.iter(|| {
            time += 0.25;
            backend.advance_to(black_box(time));
            host.clear();
        })
    });

    group.bench_function("volume_alias_pair", |b| {
        b.iter(|| {
            backend.emit("volumechange");
            backend.emit("volumechangeNew");
            host.clear();
        })
    });

    group.finish();
}

fn bench_session_lifecycle(c: &mut Criterion) {
    let provider = SimulatedProvider::new();
    let factory = VideoFactory::new(provider, FactoryConfig::default()).unwrap();
    let host = Rc::new(RecordingHost::new());

    c.bench_function("create_and_destroy", |b| {
        b.iter(|| {
            let wrapper = factory
                .create(&(), "video.mp4", SessionId::generate(), downgrade_host(&host), &StyleMap::new())
                .unwrap();
            wrapper.destroy();
        })
    });
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    translation_benches,
    bench_translation,
    bench_playhead,
    bench_stream_encoding,
);

criterion_group!(
    session_benches,
    bench_session_delivery,
    bench_session_lifecycle,
);

criterion_main!(translation_benches, session_benches);
