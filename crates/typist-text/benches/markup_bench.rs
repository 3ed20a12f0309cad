//! Benchmarks for markup parsing.
//!
//! Run with: cargo bench -p typist-text

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use typist_style::NamedColors;
use typist_text::{Layout, MarkupParser};

// =============================================================================
// Test Data
// =============================================================================

fn plain(len: usize) -> String {
    "The quick brown fox jumps over the lazy dog. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

fn tagged(len: usize) -> String {
    let chunk = "{RED}The [*]quick[] brown{WAIT=0.1} fox {FAST}jumps{NORMAL} over{RESET} ";
    chunk.repeat(len / chunk.len() + 1)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup/plain");
    for len in [100, 1000, 10000] {
        let text = plain(len);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(MarkupParser::new().parse(text)))
        });
    }
    group.finish();
}

fn bench_tagged(c: &mut Criterion) {
    let colors = NamedColors::new();
    let mut group = c.benchmark_group("markup/tagged");
    for len in [100, 1000, 10000] {
        let text = tagged(len);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| black_box(MarkupParser::new().colors(&colors).parse(text)))
        });
    }
    group.finish();
}

fn bench_reused_layout(c: &mut Criterion) {
    let text = plain(1000);
    let mut layout = Layout::new().with_target_width(40.0);
    c.bench_function("markup/reused_layout_wrapped", |b| {
        b.iter(|| black_box(MarkupParser::new().parse_into(&text, &mut layout)))
    });
}

criterion_group!(benches, bench_plain, bench_tagged, bench_reused_layout);
criterion_main!(benches);
