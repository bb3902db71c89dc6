//! Placeholder badge assets for the plate renderer
//!
//! Writes `assets/eu_patch.png` and `assets/german_police_registration.jpg`.
//! The plate font (`assets/EuroPlate.ttf`) has to be supplied separately.
//! Usage: cargo run -p plate-core --example gen_badges

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;
use std::f32::consts::PI;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("assets");
    std::fs::create_dir_all(output_dir)?;

    println!("Generating badge assets...");

    generate_eu_patch(output_dir)?;
    generate_police_badge(output_dir)?;

    println!("Done! Badges saved to assets/");
    Ok(())
}

fn generate_eu_patch(output_dir: &Path) -> Result<(), image::ImageError> {
    // Blue strip with a ring of twelve stars and a country letter block
    let (width, height) = (100u32, 220u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([0, 51, 153]));

    let center = (50.0f32, 70.0f32);
    for i in 0..12 {
        let angle = i as f32 * PI / 6.0;
        let x = center.0 + 32.0 * angle.cos();
        let y = center.1 + 32.0 * angle.sin();
        draw_filled_circle_mut(&mut img, (x as i32, y as i32), 4, Rgb([255, 204, 0]));
    }

    // country code placeholder
    let white = Rgb([255, 255, 255]);
    draw_filled_rect_mut(&mut img, Rect::at(32, 130).of_size(8, 60), white);
    draw_hollow_circle_mut(&mut img, (40, 160), 28, white);
    draw_hollow_circle_mut(&mut img, (40, 160), 27, white);

    img.save(output_dir.join("eu_patch.png"))?;
    println!("  Created eu_patch.png");
    Ok(())
}

fn generate_police_badge(output_dir: &Path) -> Result<(), image::ImageError> {
    // Round registration seal on white
    let size = 100u32;
    let mut img = RgbImage::from_pixel(size, size, Rgb([255, 255, 255]));

    draw_filled_circle_mut(&mut img, (50, 50), 44, Rgb([40, 110, 60]));
    draw_filled_circle_mut(&mut img, (50, 50), 36, Rgb([230, 230, 230]));
    draw_filled_circle_mut(&mut img, (50, 50), 14, Rgb([200, 30, 30]));

    img.save(output_dir.join("german_police_registration.jpg"))?;
    println!("  Created german_police_registration.jpg");
    Ok(())
}
