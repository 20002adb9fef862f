use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use segid::{AllocatorConfig, MemoryStore, SegmentAllocator};
use tokio::runtime::Builder;

// Number of IDs drained per benchmark iteration.
const TOTAL_IDS: usize = 4096;

/// Benchmarks draining a steadily-producing allocator end to end: lease,
/// buffer handoff, and consumer receive.
fn bench_allocator_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/drain");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    for step in [64_i64, 1024] {
        let rt = Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .expect("failed to build runtime");

        group.bench_function(format!("step/{step}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let store = MemoryStore::new();
                store.insert_domain("bench", 0, step);

                let allocator = SegmentAllocator::new(
                    store,
                    AllocatorConfig::new("bench").with_buffer_capacity(256),
                )
                .expect("valid config");

                for _ in 0..TOTAL_IDS {
                    black_box(allocator.next_id().await.expect("allocator closed"));
                }

                allocator.shutdown().await;
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocator_drain);
criterion_main!(benches);
