//! Benchmarks for particle generation and the per-frame advance/draw path.
//!
//! Run with: cargo bench --package blastfield-kernel --bench advance

use std::hint::black_box;

use blastfield_common::{Argb, Density, Rect};
use blastfield_kernel::{
    Circle, ExplosionConfig, ExplosionSession, ExplosionStyle, ParticleCount, PixelCanvas,
    Snapshot, PROGRESS_SCALE,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn snapshot() -> Snapshot {
    Snapshot::from_fn(256, 256, |x, y| Argb::from_argb(255, x as u8, y as u8, 96))
        .unwrap_or_else(|e| panic!("snapshot: {e}"))
}

fn session(style: ExplosionStyle) -> ExplosionSession {
    let config = ExplosionConfig {
        particle_count: ParticleCount::High,
        ..ExplosionConfig::default()
    }
    .with_style(style);
    ExplosionSession::new(snapshot(), Rect::new(0, 0, 256, 256), config, 42, Density::BASELINE)
        .unwrap_or_else(|e| panic!("session: {e}"))
}

fn benchmark_generate(c: &mut Criterion) {
    let snapshot = std::sync::Arc::new(snapshot());
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Elements(ParticleCount::High.total() as u64));

    for style in ExplosionStyle::ALL {
        let config = ExplosionConfig {
            particle_count: ParticleCount::High,
            ..ExplosionConfig::default()
        }
        .with_style(style);
        group.bench_with_input(BenchmarkId::from_parameter(style.name()), &config, |b, config| {
            b.iter(|| {
                black_box(ExplosionSession::new(
                    snapshot.clone(),
                    Rect::new(0, 0, 256, 256),
                    config.clone(),
                    42,
                    Density::BASELINE,
                ))
            });
        });
    }
    group.finish();
}

fn benchmark_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.throughput(Throughput::Elements(ParticleCount::High.total() as u64));

    for style in ExplosionStyle::ALL {
        let mut session = session(style);
        session.start();
        group.bench_function(BenchmarkId::from_parameter(style.name()), |b| {
            let mut step = 0u32;
            b.iter(|| {
                step = (step + 1) % 64;
                session.advance_to(PROGRESS_SCALE * step as f32 / 64.0);
                session.advance_particles();
                black_box(session.particles().len())
            });
        });
    }
    group.finish();
}

fn benchmark_draw(c: &mut Criterion) {
    let mut session = session(ExplosionStyle::Fountain);
    session.start();
    session.advance_to(PROGRESS_SCALE * 0.4);
    session.advance_particles();

    c.bench_function("paint_recorded", |b| {
        let mut circles: Vec<Circle> = Vec::with_capacity(ParticleCount::High.total());
        b.iter(|| {
            circles.clear();
            black_box(session.paint(&mut circles))
        });
    });

    c.bench_function("paint_canvas_512", |b| {
        let mut canvas = PixelCanvas::new(512, 512);
        b.iter(|| {
            canvas.clear(Argb::TRANSPARENT);
            black_box(session.paint(&mut canvas))
        });
    });
}

criterion_group!(benches, benchmark_generate, benchmark_advance, benchmark_draw);
criterion_main!(benches);
