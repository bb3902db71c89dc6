//! Applies each disturbance step on its own to a synthetic plate-like image
//!
//! Usage: cargo run -p plate-core --example disturbance_grid

use image::{Rgb, RgbImage};
use plate_core::disturbance::{add_grain, apply_lighting, blur, rotate_expand, to_grayscale};
use plate_core::{DisturbanceConfig, DisturbancePipeline, LightingCurve};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("generated_disturbances");
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;

    println!("Generating disturbance samples in {:?}", output_dir);

    let body = Rgb([150, 150, 150]);
    let base = plate_like(body);
    let mut rng = StdRng::seed_from_u64(2023);
    let mut count = 0;

    // 1. Clean
    to_grayscale(&base).save(output_dir.join("clean.jpg"))?;
    count += 1;

    // 2. Rotated
    for angle in [-10, -2, 2, 10] {
        let rotated = rotate_expand(&base, angle, body);
        to_grayscale(&rotated).save(output_dir.join(format!("rot_{}.jpg", angle)))?;
        count += 1;
    }

    // 3. Lighting
    for i in 0..3 {
        let curve = LightingCurve::sample(&mut rng);
        to_grayscale(&apply_lighting(&base, &curve)).save(output_dir.join(format!("light_{}.jpg", i)))?;
        count += 1;
    }

    // 4. Blurred
    for radius in [1, 2, 4] {
        to_grayscale(&blur(&base, radius)).save(output_dir.join(format!("blur_{}.jpg", radius)))?;
        count += 1;
    }

    // 5. Grain
    for density in [0.05, 0.10, 0.15] {
        let noisy = add_grain(&base, density, &mut rng);
        to_grayscale(&noisy).save(output_dir.join(format!("grain_{:.2}.jpg", density)))?;
        count += 1;
    }

    // 6. Full pipeline
    let pipeline = DisturbancePipeline::new(DisturbanceConfig::default());
    for i in 0..4 {
        pipeline.apply(&base, body, &mut rng).save(output_dir.join(format!("full_{}.jpg", i)))?;
        count += 1;
    }

    println!("Generated {} images.", count);
    Ok(())
}

/// White plate with a black frame and a few dark "characters"
fn plate_like(body: Rgb<u8>) -> RgbImage {
    let (width, height) = (560u32, 150u32);
    RgbImage::from_fn(width, height, |x, y| {
        let on_plate = (20..540).contains(&x) && (20..130).contains(&y);
        let on_field = (30..530).contains(&x) && (30..120).contains(&y);
        let on_glyph = (50..110).contains(&y) && x >= 90 && x < 500 && (x - 90) % 40 < 26;
        match (on_plate, on_field, on_glyph) {
            (false, _, _) => body,
            (true, false, _) => Rgb([0, 0, 0]),
            (true, true, true) => Rgb([0, 0, 0]),
            (true, true, false) => Rgb([255, 255, 255]),
        }
    })
}
