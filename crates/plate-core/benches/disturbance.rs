//! Benchmarks for the disturbance pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use plate_core::disturbance::{add_grain, rotate_expand};
use plate_core::{DisturbanceConfig, DisturbancePipeline};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn create_test_image(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);

    // Plate-like stripes to keep blur and rotation honest
    for y in 0..height {
        for x in 0..width {
            let value = if ((x / 10) + (y / 10)) % 2 == 0 { 0 } else { 255 };
            img.put_pixel(x, y, Rgb([value, value, value]));
        }
    }

    img
}

fn benchmark_pipeline(c: &mut Criterion) {
    let pipeline = DisturbancePipeline::new(DisturbanceConfig::default());
    let img_small = create_test_image(560, 150);
    let img_large = create_test_image(1120, 300);
    let background = Rgb([160, 160, 160]);

    c.bench_function("pipeline_560x150", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| pipeline.apply(black_box(&img_small), background, &mut rng))
    });

    c.bench_function("pipeline_1120x300", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| pipeline.apply(black_box(&img_large), background, &mut rng))
    });
}

fn benchmark_steps(c: &mut Criterion) {
    let img = create_test_image(1120, 300);

    c.bench_function("rotate_2deg_1120x300", |b| {
        b.iter(|| rotate_expand(black_box(&img), 2, Rgb([160, 160, 160])))
    });

    c.bench_function("grain_0.15_1120x300", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| add_grain(black_box(&img), 0.15, &mut rng))
    });
}

criterion_group!(benches, benchmark_pipeline, benchmark_steps);
criterion_main!(benches);
