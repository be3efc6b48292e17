//! Alloc/free cycle benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rpool::{Pool, PoolConfig, SearchMode};
use std::hint::black_box;

fn bench_single_cycle(c: &mut Criterion) {
  let mut group = c.benchmark_group("single_cycle");

  for size in [16usize, 256, 4096] {
    group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
      let mut pool = Pool::with_config(1 << 20, PoolConfig::production()).unwrap();

      b.iter(|| {
        let address = pool.allocate(black_box(size)).unwrap();
        pool.deallocate(address).unwrap();
      });
    });
  }

  group.finish();
}

/// Fills a fragmented pool: every other block is freed first, so each
/// allocation has to scan past used blocks.
fn bench_fragmented(c: &mut Criterion) {
  let mut group = c.benchmark_group("fragmented");

  for search in [SearchMode::FirstFit, SearchMode::BestFit] {
    group.bench_function(format!("{search:?}"), |b| {
      b.iter(|| {
        let config = PoolConfig::production().with_search(search);
        let mut pool = Pool::with_config(64 * 1024, config).unwrap();
        let blocks: Vec<_> = (0..512).map(|_| pool.allocate(64).unwrap()).collect();

        for address in blocks.iter().step_by(2) {
          pool.deallocate(*address).unwrap();
        }
        for _ in 0..256 {
          black_box(pool.allocate(32).unwrap());
        }
      });
    });
  }

  group.finish();
}

fn bench_free_all(c: &mut Criterion) {
  c.bench_function("alloc_100x10_free_all", |b| {
    let mut pool = Pool::with_config(1000, PoolConfig::production()).unwrap();

    b.iter(|| {
      let blocks: Vec<_> = (0..100).map(|_| pool.allocate(10).unwrap()).collect();
      for address in blocks {
        pool.deallocate(address).unwrap();
      }
    });
  });
}

criterion_group!(benches, bench_single_cycle, bench_fragmented, bench_free_all);
criterion_main!(benches);
