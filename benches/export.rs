//! Benchmarks for vector export.
//!
//! Run with:
//! ```bash
//! cargo bench --bench export
//! ```

use std::io;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mtbdd_export::export::{for_each_entry, ExportConfig, VectorExporter};
use mtbdd_export::format::ExportFormat;
use mtbdd_export::mtbdd::Mtbdd;
use mtbdd_export::odd::Odd;
use mtbdd_export::reference::Ref;
use mtbdd_export::types::Var;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generate a deterministic random sparse vector over `num_vars` variables.
fn random_vector(dd: &Mtbdd, seed: u64, num_vars: u32, count: usize) -> Ref {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let vars = Var::range(num_vars);
    let entries: Vec<(u64, f64)> = (0..count)
        .map(|_| (rng.random_range(0..(1u64 << num_vars)), rng.random_range(1..8) as f64 * 0.125))
        .collect();
    dd.from_entries(&vars, &entries)
}

// ============================================================================
// Benchmark: Traversal only
// ============================================================================

fn bench_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("export/traverse");

    for num_vars in [16, 24, 32] {
        let dd = Mtbdd::new();
        let vars = Var::range(num_vars);
        let f = random_vector(&dd, 42, num_vars, 10_000);
        let odd = Odd::full(vars.len());

        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(BenchmarkId::from_parameter(num_vars), &f, |b, &f| {
            b.iter(|| {
                let mut sum = 0.0;
                let result: Result<(), ()> = for_each_entry(&dd, f, &vars, &odd, odd.root(), &mut |_, v| {
                    sum += v;
                    Ok(())
                });
                result.map(|()| sum)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Full export per format
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("export/render");

    let dd = Mtbdd::new();
    let vars = Var::range(24);
    let f = random_vector(&dd, 7, 24, 10_000);
    let odd = Odd::full(vars.len());

    for format in ExportFormat::ALL {
        let exporter = VectorExporter::new(ExportConfig::new(format)).unwrap();
        group.bench_function(format.as_str(), |b| {
            b.iter(|| exporter.export_to_writer(&dd, f, &vars, &odd, odd.root(), &mut io::sink()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_traverse, bench_render);
criterion_main!(benches);
