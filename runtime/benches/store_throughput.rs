//! Store throughput benchmarks
//!
//! Measures the cost of the pieces every widget store pays for:
//! - Reducer execution in isolation
//! - `send` (reduce + snapshot publish) throughput
//! - Scoped effect bookkeeping (replace-in-flight and drop-while-busy)
//!
//! Run with: `cargo bench -p reactive-stores-runtime`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use reactive_stores_core::effect::{Effect, EffectId};
use reactive_stores_core::{reducer::Reducer, smallvec, SmallVec};
use reactive_stores_runtime::Store;
use std::time::Duration;

const SEARCH: EffectId = EffectId::new("bench.search");
const LOAD: EffectId = EffectId::new("bench.load");

#[derive(Clone, Debug, Default)]
struct BenchState {
    items: Vec<u64>,
    query: String,
}

#[derive(Clone, Debug)]
enum BenchAction {
    Push(u64),
    Type(char),
    Search,
    Load,
    Loaded,
}

struct BenchReducer;

impl Reducer for BenchReducer {
    type State = BenchState;
    type Action = BenchAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BenchAction::Push(n) => {
                state.items.push(n);
                SmallVec::new()
            },
            BenchAction::Type(c) => {
                state.query.push(c);
                smallvec![Effect::debounce(
                    SEARCH,
                    Duration::from_millis(300),
                    BenchAction::Search
                )]
            },
            BenchAction::Load => smallvec![
                Effect::Future(Box::pin(async { Some(BenchAction::Loaded) })).drop_while_busy(LOAD)
            ],
            BenchAction::Search | BenchAction::Loaded => SmallVec::new(),
        }
    }
}

/// Benchmark reducer execution in isolation (no Store overhead)
fn benchmark_reducer_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer");
    group.throughput(Throughput::Elements(1));

    group.bench_function("push", |b| {
        let mut state = BenchState::default();
        b.iter(|| {
            let _effects = BenchReducer.reduce(&mut state, black_box(BenchAction::Push(7)), &());
        });
    });

    group.finish();
}

/// Benchmark Store throughput (actions/sec)
fn benchmark_store_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_throughput");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    group.bench_function("send_action", |b| {
        let store = Store::new(BenchState::default(), BenchReducer, ());

        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(BenchAction::Push(1))).await;
        });
    });

    group.bench_function("debounced_keystroke", |b| {
        let store = Store::new(BenchState::default(), BenchReducer, ());

        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(BenchAction::Type('a'))).await;
        });
    });

    group.bench_function("exhaust_trigger", |b| {
        let store = Store::new(BenchState::default(), BenchReducer, ());

        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(BenchAction::Load)).await;
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_reducer_execution, benchmark_store_throughput);
criterion_main!(benches);
