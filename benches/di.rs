use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wireup::*;
use std::sync::Arc;
use std::thread;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Default)]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

impl Injectable for FixedClock {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

implements!(FixedClock => dyn Clock);

struct Scheduler {
    clock: Arc<dyn Clock>,
}

impl Injectable for Scheduler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Scheduler { clock: args.take()? })).param::<dyn Clock>("clock")]
    }
}

struct Planner {
    scheduler: Arc<Scheduler>,
    clocks: Vec<Arc<dyn Clock>>,
}

impl Injectable for Planner {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Planner { scheduler: args.take()?, clocks: args.all()? }))
            .dependency::<Scheduler>("scheduler")
            .all::<dyn Clock>("clocks")]
    }
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = Container::new();
    container.configure(|c| {
        c.add_using::<dyn Clock, FixedClock>().as_singleton();
    }).unwrap();

    // Prime the singleton
    let _ = container.resolve::<dyn Clock>().unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let clock = container.resolve::<dyn Clock>().unwrap();
            black_box(clock.now());
        })
    });
}

fn bench_transient_graph(c: &mut Criterion) {
    let container = Container::new();
    container.configure(|c| {
        c.add_using::<dyn Clock, FixedClock>();
        c.add::<Scheduler>();
        c.add::<Planner>();
    }).unwrap();

    c.bench_function("transient_graph", |b| {
        b.iter(|| {
            let planner = container.resolve::<Planner>().unwrap();
            black_box(planner.scheduler.clock.now() + planner.clocks.len() as u64);
        })
    });
}

fn bench_child_lookup_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("child_lookup_depth");

    for depth in [1usize, 4, 16] {
        let root = Container::new();
        root.configure(|c| {
            c.add_using::<dyn Clock, FixedClock>().as_singleton();
        }).unwrap();
        let mut scope = root.clone();
        for _ in 0..depth {
            scope = scope.create_child();
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &scope, |b, scope| {
            b.iter(|| black_box(scope.resolve::<dyn Clock>().unwrap().now()))
        });
    }

    group.finish();
}

fn bench_keyed_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_scaling");

    for count in [1usize, 10, 100] {
        let container = Container::new();
        container.configure(|c| {
            for i in 0..count {
                c.add_using_keyed::<dyn Clock, FixedClock>(format!("clock-{}", i));
            }
        }).unwrap();
        let last = format!("clock-{}", count - 1);

        group.bench_with_input(BenchmarkId::from_parameter(count), &last, |b, key| {
            b.iter(|| black_box(container.resolve_keyed::<dyn Clock>(key).unwrap().now()))
        });
    }

    group.finish();
}

struct Tick;
impl Message for Tick {}

#[derive(Default)]
struct Watcher;

impl Injectable for Watcher {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_default()]
    }
}

impl Handle<Tick> for Watcher {
    fn handle(&self, message: &Tick) {
        black_box(message);
    }
}

impl Subscriber for Watcher {
    fn subscribe(routes: &mut Routes<Self>) {
        routes.route::<Tick>();
    }
}

fn bench_send_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("send_fanout");

    for listeners in [1usize, 10, 100] {
        let container = Container::new();
        container.configure(|c| {
            c.add::<Watcher>().for_messaging();
        }).unwrap();
        let held: Vec<_> = (0..listeners)
            .map(|_| container.resolve::<Watcher>().unwrap())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(listeners), &container, |b, container| {
            b.iter(|| black_box(container.send(Tick).unwrap()))
        });
        drop(held);
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_contention(c: &mut Criterion) {
    let container = Container::new();
    container.configure(|c| {
        c.add_using::<dyn Clock, FixedClock>().as_singleton();
        c.add::<Scheduler>();
    }).unwrap();

    c.bench_function("contention_4_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let container = container.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            black_box(container.resolve::<Scheduler>().unwrap());
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        })
    });
}

fn bench_configure_and_resolve(c: &mut Criterion) {
    c.bench_function("configure_and_resolve", |b| {
        b.iter(|| {
            let container = Container::new();
            container.configure(|c| {
                c.add_default::<dyn Clock, FixedClock>().as_singleton();
                c.add::<Scheduler>();
                c.add::<Planner>();
            }).unwrap();
            black_box(container.resolve::<Planner>().unwrap());
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_transient_graph,
    bench_child_lookup_depth,
    bench_keyed_scaling,
    bench_send_fanout
);

criterion_group!(macro_benches, bench_contention, bench_configure_and_resolve);

criterion_main!(micro_benches, macro_benches);
