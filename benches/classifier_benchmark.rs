//! Performance benchmarks for the error-message classifier
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use metrics_report::classifier::{similarity, Classifier};

/// Generate an error-message corpus cycling through a few base failure modes
/// with per-message variation, so the classifier builds a realistic small
/// group set over a large sample count.
fn generate_messages(count: usize) -> Vec<String> {
    let bases = [
        "connection timeout while contacting host",
        "disk full on volume",
        "permission denied opening file",
        "out of memory allocating buffer",
        "certificate has expired for domain",
    ];

    (0..count)
        .map(|i| format!("{} {}", bases[i % bases.len()], i % 17))
        .collect()
}

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for size in [100, 1000, 10000].iter() {
        let messages = generate_messages(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut classifier = Classifier::new();
                for (i, message) in messages.iter().enumerate() {
                    classifier
                        .classify(black_box(message), &format!("record-{i}"))
                        .unwrap();
                }
                classifier.groups().len()
            });
        });
    }

    group.finish();
}

fn benchmark_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    group.bench_function("short_pair", |b| {
        b.iter(|| similarity(black_box("disk full"), black_box("disk is full")))
    });

    let long_a = "connection timeout while contacting upstream host after 30000 ms".repeat(4);
    let long_b = "connection timed out while contacting upstream host after 30000 ms".repeat(4);
    group.bench_function("long_pair", |b| {
        b.iter(|| similarity(black_box(&long_a), black_box(&long_b)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_classify, benchmark_similarity);
criterion_main!(benches);
