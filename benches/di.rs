use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use injectable::*;
use std::sync::Arc;

trait Backend: Send + Sync {
    fn value(&self) -> u64;
}

struct Real;
impl Backend for Real {
    fn value(&self) -> u64 {
        1
    }
}

struct Mock;
impl Backend for Mock {
    fn value(&self) -> u64 {
        2
    }
}

struct ServiceBinding;
impl Binding for ServiceBinding {
    type Service = Arc<dyn Backend>;
    fn make(c: &Container) -> Self::Service {
        c.application().obtain(|| Arc::new(Real) as Arc<dyn Backend>)
    }
}

// ===== Micro Benchmarks =====

fn bench_resolve_default(c: &mut Criterion) {
    container().reset();
    // Prime the singleton
    let _ = container().resolve_binding::<ServiceBinding>();

    c.bench_function("resolve_default_singleton_hit", |b| {
        b.iter(|| {
            let s = container().resolve_binding::<ServiceBinding>();
            black_box(s.value());
        })
    });
}

fn bench_resolve_override(c: &mut Criterion) {
    container().reset();
    let mock: Arc<dyn Backend> = Arc::new(Mock);
    container().register(move || Arc::clone(&mock));

    c.bench_function("resolve_override", |b| {
        b.iter(|| {
            let s = container().resolve_binding::<ServiceBinding>();
            black_box(s.value());
        })
    });
    container().reset();
}

fn bench_scopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_hit");

    let singleton = SingletonScope::new();
    let cached = CachedScope::new();
    let shared = SharedScope::new();
    let held = shared.obtain(|| Arc::new(Real));

    group.bench_function(BenchmarkId::new("obtain", "singleton"), |b| {
        b.iter(|| black_box(singleton.obtain(|| Arc::new(Real)).value()))
    });
    group.bench_function(BenchmarkId::new("obtain", "cached"), |b| {
        b.iter(|| black_box(cached.obtain(|| Arc::new(Real)).value()))
    });
    group.bench_function(BenchmarkId::new("obtain", "shared"), |b| {
        b.iter(|| black_box(shared.obtain(|| Arc::new(Real)).value()))
    });
    group.finish();
    drop(held);
}

fn bench_shared_miss(c: &mut Criterion) {
    let shared = SharedScope::new();

    c.bench_function("shared_obtain_after_release", |b| {
        b.iter(|| {
            // Nothing holds the instance between iterations, so every call rebuilds
            let s = shared.obtain(|| Arc::new(vec![0u8; 64]));
            black_box(s.len());
        })
    });
}

fn bench_resolve_with(c: &mut Criterion) {
    struct Buffer(usize);
    impl SelfConstructing for Buffer {
        fn construct(arg: Option<&Argument>) -> DiResult<Self> {
            Ok(Buffer(Self::argument_or(arg, 0usize)?))
        }
    }

    let mut group = c.benchmark_group("resolve_with");
    for size in [1usize, 64, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, size| {
            b.iter(|| {
                let v: Buffer = container().resolve_with(Some(size)).unwrap();
                black_box(v.0);
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_default,
    bench_resolve_override,
    bench_scopes,
    bench_shared_miss,
    bench_resolve_with
);
criterion_main!(benches);
