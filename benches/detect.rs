//! Benchmarks for detection hot paths.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use mimetree::{Sniffer, SnifferConfig};

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    let mut large_text = b"<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>".to_vec();
    large_text.extend(std::iter::repeat_n(b'x', 1024 * 1024));

    vec![
        ("png", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13]),
        ("plain", b"The quick brown fox jumps over the lazy dog.\n".repeat(64)),
        ("json", br#"{"items": [1, 2, 3], "nested": {"ok": true}}"#.to_vec()),
        ("svg", b"<?xml version=\"1.0\"?><svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec()),
        ("html_1mb", large_text),
        ("binary", (0..4096u32).map(|i| (i.wrapping_mul(131) % 251) as u8).collect()),
    ]
}

fn bench_detect(c: &mut Criterion) {
    let sniffer = Sniffer::new();
    let mut group = c.benchmark_group("detect");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("builtin", name), &data, |b, d| {
            b.iter(|| sniffer.detect(black_box(d)))
        });
    }
    group.finish();
}

fn bench_detect_unlimited(c: &mut Criterion) {
    let sniffer = Sniffer::with_config(SnifferConfig::new().unlimited());
    let data = b"plain text line\n".repeat(16 * 1024);
    c.bench_function("detect/unlimited_256k_text", |b| {
        b.iter(|| sniffer.detect(black_box(&data)))
    });
}

fn bench_tree_build(c: &mut Criterion) {
    c.bench_function("builtin::tree", |b| b.iter(mimetree::builtin::tree));
}

criterion_group!(benches, bench_detect, bench_detect_unlimited, bench_tree_build);
criterion_main!(benches);
