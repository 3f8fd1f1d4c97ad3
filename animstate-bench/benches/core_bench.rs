//! State graph, instance and runner benchmarks.

use animstate_core::{Runner, StateGraph, StateMachine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

/// A ring of `n` states, each with a `next` trigger to its successor.
fn ring_document(n: usize) -> serde_json::Value {
    serde_json::json!({
        "states": (0..n).map(|i| serde_json::json!({
            "name": format!("state_{}", i),
            "speed": 1.0,
            "animationClip": format!("clip_{}", i),
            "transitions": [{
                "destinationState": format!("state_{}", (i + 1) % n),
                "duration": 0.25,
                "conditions": [{"parameter": "next", "mode": 1}]
            }]
        })).collect::<Vec<_>>()
    })
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_load");

    for size in [4usize, 64, 512] {
        let doc = ring_document(size);
        let unity = serde_json::json!({"layers": [{"stateMachine": doc.clone()}]});

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("native", size), &doc, |b, doc| {
            b.iter(|| black_box(StateGraph::from_native_json(doc).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("unity", size), &unity, |b, doc| {
            b.iter(|| black_box(StateGraph::from_unity_json(doc).unwrap()))
        });
    }

    group.finish();
}

fn bench_fire_trigger(c: &mut Criterion) {
    let mut group = c.benchmark_group("instance_fire_trigger");

    let graph = Arc::new(StateGraph::from_native_json(&ring_document(64)).unwrap());
    let mut machine = StateMachine::new(graph, "state_0").unwrap();

    group.throughput(Throughput::Elements(1));
    group.bench_function("accepted", |b| {
        b.iter(|| black_box(machine.fire_trigger("next")))
    });
    group.bench_function("rejected", |b| {
        b.iter(|| black_box(machine.fire_trigger("missing")))
    });

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("runner_tick");

    let graph = Arc::new(StateGraph::from_native_json(&ring_document(8)).unwrap());

    for count in [1usize, 100, 1000] {
        let runner = Runner::new();
        runner.attach();
        for _ in 0..count {
            let machine = StateMachine::new(graph.clone(), "state_0").unwrap();
            runner.start(machine.into_shared());
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &runner, |b, runner| {
            b.iter(|| black_box(runner.tick(1.0 / 60.0)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_fire_trigger, bench_tick);
criterion_main!(benches);
