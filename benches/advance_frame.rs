//! Benchmarks for the per-frame loop.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use star_wireframe::gpu::VertexBatch;
use star_wireframe::prelude::*;

/// Canvas that discards everything, to time the simulation alone.
struct NullCanvas;

impl Canvas for NullCanvas {
    fn clear(&mut self, _bounds: Bounds) {}

    fn fill_square(&mut self, center: Vec2, _size: f32, _color: Rgba) {
        black_box(center);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, _color: Rgba) {
        black_box((from, to, width));
    }
}

struct NullScheduler;

impl FrameScheduler for NullScheduler {
    fn request_frame(&mut self) {}
}

fn starfield(count: usize) -> Starfield {
    let config = StarfieldConfig::default().with_num_stars(count).with_seed(1);
    let mut field = Starfield::new(&config, Bounds::new(1280.0, 720.0));
    field.on_pointer_move(640.0, 360.0);
    field
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_and_render");

    for count in [50, 150, 500] {
        group.bench_with_input(BenchmarkId::new("null_canvas", count), &count, |b, &count| {
            let mut field = starfield(count);
            b.iter(|| black_box(field.advance_and_render(&mut NullCanvas, &mut NullScheduler)))
        });
    }

    group.finish();
}

fn bench_tessellate(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_batch");

    for count in [150, 500] {
        group.bench_with_input(BenchmarkId::new("frame", count), &count, |b, &count| {
            let mut field = starfield(count);
            let mut batch = VertexBatch::new();
            b.iter(|| {
                field.advance_and_render(&mut batch, &mut NullScheduler);
                black_box(batch.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_advance, bench_tessellate);
criterion_main!(benches);
