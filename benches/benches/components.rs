//! Benchmark nested component rendering.

use criterion::{criterion_group, criterion_main, Criterion};

use benches::context;

criterion_main! { benches }
criterion_group! { benches, bench_init, bench_render_source, bench_context }

/// Benchmarks the time taken to create a new engine with its components.
fn bench_init(c: &mut Criterion) {
    c.bench_function("init", |b| b.iter(benches::engine));
}

/// Benchmarks rendering page markup, which is parsed on every render.
fn bench_render_source(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_source");
    for n in [10, 150] {
        let engine = benches::engine();
        let page = context::random(n);
        let source = benches::markup(n);
        g.bench_function(n.to_string(), |b| {
            b.iter(|| engine.render_source(&source, &page).unwrap());
        });
    }
}

/// Benchmarks driving the same page through a context from Rust.
fn bench_context(c: &mut Criterion) {
    let mut g = c.benchmark_group("context");
    for n in [10, 150] {
        let engine = benches::engine();
        let page = context::random(n);
        g.bench_function(n.to_string(), |b| {
            b.iter(|| {
                let mut cx = engine.context();
                benches::drive(&mut cx, &page).unwrap();
                cx.finish().unwrap()
            });
        });
    }
}
