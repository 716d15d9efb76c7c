//! Benchmarks for scroll offset → page lookup.
//!
//! Run with: cargo bench
#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tplview::layout::{PageGeometry, RULER_HEIGHT, ZOOM};
use tplview::PageSize;

fn geometry(pages: usize) -> PageGeometry {
    let sizes: Vec<PageSize> = (0..pages)
        .map(|i| PageSize::new(210.0, if i % 2 == 0 { 297.0 } else { 148.0 }))
        .collect();
    PageGeometry::new(&sizes, ZOOM, RULER_HEIGHT, 0.75)
}

/// Sweep the full content height the way a continuous scroll would.
fn bench_page_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_at");
    for pages in [10_usize, 100, 1_000] {
        let geometry = geometry(pages);
        let total = geometry.total_height(tplview::layout::Unit::Pixel);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &geometry, |b, g| {
            b.iter(|| {
                let mut offset = 0.0;
                while offset < total {
                    black_box(g.page_at(black_box(offset)));
                    offset += 97.0;
                }
            });
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let sizes: Vec<PageSize> = (0..1_000).map(|_| PageSize::new(210.0, 297.0)).collect();
    c.bench_function("geometry_build_1000", |b| {
        b.iter(|| PageGeometry::new(black_box(&sizes), ZOOM, RULER_HEIGHT, 1.0))
    });
}

criterion_group!(benches, bench_page_at, bench_build);
criterion_main!(benches);
