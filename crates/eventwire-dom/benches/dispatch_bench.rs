//! Benchmarks for listener dispatch along deep and wide propagation paths.
//!
//! Run with: cargo bench -p eventwire-dom --bench dispatch_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use eventwire_dom::{Document, Element, Event, EventInit, ListenerOptions};
use std::hint::black_box;

/// Build a connected chain of `depth` elements and return the leaf.
fn make_chain(document: &Document, depth: usize) -> Element {
    let mut current = document.create_element("div");
    document.append_child(&current).expect("append root");
    for _ in 1..depth {
        let child = document.create_element("div");
        current.append_child(&child).expect("append child");
        current = child;
    }
    current
}

fn bench_bubble_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("bubble_depth");
    for depth in [1_usize, 8, 64] {
        let document = Document::new();
        let leaf = make_chain(&document, depth);
        document
            .as_target()
            .add_listener("ping", |event| {
                black_box(event.event_type());
            }, ListenerOptions::default());

        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            let init = EventInit { bubbles: true, ..EventInit::default() };
            b.iter(|| leaf.as_target().dispatch_event(Event::new("ping", init)));
        });
    }
    group.finish();
}

fn bench_listener_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("listener_fanout");
    for fanout in [1_usize, 16, 128] {
        let document = Document::new();
        let element = document.create_element("div");
        document.append_child(&element).expect("append");
        for _ in 0..fanout {
            element.as_target().add_listener("ping", |event| {
                black_box(event.default_prevented());
            }, ListenerOptions::default());
        }

        group.throughput(Throughput::Elements(fanout as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fanout), &fanout, |b, _| {
            b.iter(|| element.as_target().dispatch_event(Event::new("ping", EventInit::default())));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bubble_depth, bench_listener_fanout);
criterion_main!(benches);
