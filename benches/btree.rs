//! B-tree benchmarks for blockdex
//!
//! Every insert ends with one `sync`, so insert numbers are dominated by
//! the filesystem; search and scan numbers reflect block reads and decode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::tempdir;

use blockdex::{BTreeIndex, IndexOptions};

fn populated(count: u64) -> (tempfile::TempDir, BTreeIndex) {
    let dir = tempdir().unwrap();
    let mut index = BTreeIndex::create(dir.path().join("bench.idx")).unwrap();
    for key in 0..count {
        index.insert(key * 2, key).unwrap();
    }
    (dir, index)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_insert");
    group.sample_size(10);

    for count in [100u64, 1000].iter() {
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::new("sequential", count), count, |b, &count| {
            b.iter_with_setup(
                || {
                    let dir = tempdir().unwrap();
                    let index = BTreeIndex::create(dir.path().join("bench.idx")).unwrap();
                    (dir, index)
                },
                |(dir, mut index)| {
                    for key in 0..count {
                        index.insert(key, key).unwrap();
                    }
                    (dir, index)
                },
            );
        });

        group.bench_with_input(BenchmarkId::new("scattered", count), count, |b, &count| {
            b.iter_with_setup(
                || {
                    let dir = tempdir().unwrap();
                    let index = BTreeIndex::create(dir.path().join("bench.idx")).unwrap();
                    (dir, index)
                },
                |(dir, mut index)| {
                    for i in 0..count {
                        let key = (i * 7919) % count;
                        index.insert(key, i).unwrap();
                    }
                    (dir, index)
                },
            );
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_search");

    for count in [1_000u64, 5_000].iter() {
        let (_dir, mut index) = populated(*count);

        group.bench_with_input(BenchmarkId::new("hit", count), count, |b, &count| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % count;
                black_box(index.get(black_box(i * 2)).unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("miss", count), count, |b, &count| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % count;
                black_box(index.get(black_box(i * 2 + 1)).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_scan");
    let count = 5_000u64;
    let (_dir, mut index) = populated(count);

    group.throughput(Throughput::Elements(count));
    group.bench_function("full", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for entry in index.iter() {
                let (_, value) = entry.unwrap();
                sum = sum.wrapping_add(value);
            }
            black_box(sum)
        });
    });

    group.finish();
}

fn bench_cache_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_cache_capacity");
    group.sample_size(10);

    for capacity in [0usize, 3, 32].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert_500", capacity),
            capacity,
            |b, &capacity| {
                b.iter_with_setup(
                    || {
                        let dir = tempdir().unwrap();
                        let options = IndexOptions::default().with_cache_capacity(capacity);
                        let index =
                            BTreeIndex::create_with_options(dir.path().join("bench.idx"), options)
                                .unwrap();
                        (dir, index)
                    },
                    |(dir, mut index)| {
                        for key in 0..500u64 {
                            index.insert(key, key).unwrap();
                        }
                        (dir, index)
                    },
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_search,
    bench_scan,
    bench_cache_capacity
);
criterion_main!(benches);
