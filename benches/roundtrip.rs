//! Criterion benchmarks
//! Compress/decompress throughput on repetitive vs mixed text.

use criterion::{criterion_group, criterion_main, Criterion};

fn bench_roundtrip(c: &mut Criterion) {
    let repetitive = "the the the and the and the and the cat sat on the mat ".repeat(100);
    let mixed: String = ('!'..='~').cycle().take(5000).collect();

    let repetitive_comp = huffpack::compress(&repetitive).unwrap();
    let mixed_comp = huffpack::compress(&mixed).unwrap();

    c.bench_function("compress_repetitive", |b| {
        b.iter(|| huffpack::compress(&repetitive).unwrap())
    });

    c.bench_function("compress_mixed", |b| {
        b.iter(|| huffpack::compress(&mixed).unwrap())
    });

    c.bench_function("decompress_repetitive", |b| {
        b.iter(|| huffpack::decompress(&repetitive_comp).unwrap())
    });

    c.bench_function("decompress_mixed", |b| {
        b.iter(|| huffpack::decompress(&mixed_comp).unwrap())
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
