//! Benchmarks for the analytics reporters
//!
//! Run with: cargo bench --package wastewise-api
//!
//! These measure grouping and shaping over the in-memory store, not
//! database queries.

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;
use uuid::Uuid;
use wastewise_core::models::{Bin, BinLocation, CollectionRecord, User, UserRole, WasteType};
use wastewise_core::period::{DateWindow, TimeBucket};
use wastewise_db::MemoryStore;
use wastewise_services::{AnalyticsService, Repositories};

const WASTE_TYPES: [WasteType; 5] = [
    WasteType::General,
    WasteType::Recyclable,
    WasteType::Organic,
    WasteType::Hazardous,
    WasteType::Electronic,
];

fn seeded_store(size: usize) -> MemoryStore {
    let store = MemoryStore::new();
    let now = Utc::now();

    let collectors: Vec<Uuid> = (0..25)
        .map(|i| {
            let user = User {
                name: format!("Collector {}", i),
                role: UserRole::Collector,
                ..Default::default()
            };
            let id = user.id;
            store.insert_user(user);
            id
        })
        .collect();

    for i in 0..size {
        store.insert_collection(CollectionRecord {
            collection_date: now - Duration::hours(i as i64 % (24 * 60)),
            waste_type: WASTE_TYPES[i % WASTE_TYPES.len()],
            waste_weight: (i % 40) as f64 + 0.5,
            collector: Some(collectors[i % collectors.len()]),
            ..Default::default()
        });
        store.insert_bin(Bin {
            fill_level: (i % 100) as f64,
            waste_type: WASTE_TYPES[i % WASTE_TYPES.len()],
            location: BinLocation {
                address: format!("{} Market St", i % 300),
                ..Default::default()
            },
            ..Default::default()
        });
    }

    store
}

/// Benchmark waste statistics over growing collection sets
fn bench_waste_statistics(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("waste_statistics");

    for size in [1_000usize, 10_000, 50_000].iter() {
        let service = AnalyticsService::new(Repositories::memory(seeded_store(*size)));

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                rt.block_on(service.waste_statistics(DateWindow::unbounded(), black_box(TimeBucket::Day)))
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark the collector leaderboard and bin utilization
fn bench_efficiency_metrics(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = AnalyticsService::new(Repositories::memory(seeded_store(10_000)));

    c.bench_function("efficiency_metrics_10k", |b| {
        b.iter(|| rt.block_on(service.efficiency_metrics()).unwrap());
    });
}

/// Benchmark location grouping with truncation
fn bench_area_statistics(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = AnalyticsService::new(Repositories::memory(seeded_store(10_000)));

    c.bench_function("area_statistics_10k", |b| {
        b.iter(|| rt.block_on(service.area_statistics()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_waste_statistics,
    bench_efficiency_metrics,
    bench_area_statistics
);
criterion_main!(benches);
