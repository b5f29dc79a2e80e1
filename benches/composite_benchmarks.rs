//! Benchmarks for overlay blending, frame pairing, and full batches.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::Criterion;
use filmgrain::indexer::resolve;
use filmgrain::{BatchScheduler, Blend, FrameSequence, GrainOptions, OverlayBlend};
use image::{DynamicImage, Rgb, RgbImage};

fn benchmark_overlay(criterion: &mut Criterion) {
    let base = DynamicImage::ImageRgb8(RgbImage::from_fn(1280, 720, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    }));
    let grain = DynamicImage::ImageRgb8(RgbImage::from_fn(1280, 720, |x, y| {
        let noise = ((x * 7919 + y * 104_729) % 64) as u8;
        Rgb([96 + noise; 3])
    }));

    criterion.bench_function("overlay 1280x720", |bencher| {
        bencher.iter(|| {
            OverlayBlend
                .overlay(black_box(&base), black_box(&grain), 0.35)
                .unwrap()
        });
    });
}

fn benchmark_resolve(criterion: &mut Criterion) {
    criterion.bench_function("resolve 10k iterations", |bencher| {
        bencher.iter(|| {
            for iteration in 0..10_000 {
                black_box(resolve(black_box(iteration), 240, 24).unwrap());
            }
        });
    });
}

fn benchmark_batch(criterion: &mut Criterion) {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let out = directory.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let write = |prefix: &str, count: usize| -> FrameSequence {
        (0..count)
            .map(|index| {
                let path = directory.path().join(format!("{prefix}_{index:03}.png"));
                RgbImage::from_pixel(320, 180, Rgb([(index * 30) as u8, 128, 200]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect()
    };
    let source = write("source", 8);
    let grain = write("grain", 3);

    let mut group = criterion.benchmark_group("batch 8 frames 320x180");
    group.sample_size(10);
    for workers in [1, 4] {
        let scheduler = BatchScheduler::new(GrainOptions::new(0.35).with_max_workers(workers));
        group.bench_function(format!("{workers} worker(s)"), |bencher| {
            bencher.iter(|| scheduler.run(&source, &grain, &out).unwrap().wait());
        });
    }
    group.finish();
}

criterion::criterion_group!(benches, benchmark_overlay, benchmark_resolve, benchmark_batch);
criterion::criterion_main!(benches);
