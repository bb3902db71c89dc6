use image::{DynamicImage, Rgb, RgbImage};
use plate_core::{generate_plate_set, DatasetGenerator, GeneratorConfig, PlateLayout, PlateRenderer, TextPainter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

struct NoText;

impl TextPainter for NoText {
    fn text_size(&self, _text: &str) -> (u32, u32) {
        (0, 0)
    }

    fn draw_text(&self, _canvas: &mut RgbImage, _x: i32, _y: i32, _color: Rgb<u8>, _text: &str) {}
}

fn generator(dir: &TempDir, name: &str) -> DatasetGenerator<NoText> {
    let config = GeneratorConfig {
        plates_to_generate: 4,
        images_per_plate: 3,
        appearance_probability: 0.6,
        output_directory: dir.path().join(name),
        size_multiplier: 1,
        write_charts: false,
        ..Default::default()
    };
    let badge = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 80, Rgb([0, 51, 153])));
    let renderer = PlateRenderer::new(PlateLayout::scaled(1), NoText, badge.clone(), badge);
    DatasetGenerator::with_renderer(config, renderer).unwrap()
}

#[test]
fn test_same_seed_same_dataset() {
    // Enable logging to stdout with INFO level
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let dir = TempDir::new().unwrap();

    let first = generator(&dir, "a").generate(&mut StdRng::seed_from_u64(99)).unwrap();
    let second = generator(&dir, "b").generate(&mut StdRng::seed_from_u64(99)).unwrap();

    assert_eq!(first.plates, second.plates);
    assert_eq!(first.matrix, second.matrix);
    assert_eq!(first.coverage, second.coverage);

    for image in &first.coverage.images {
        let a = std::fs::read(first.image_path(image)).unwrap();
        let b = std::fs::read(second.image_path(image)).unwrap();
        assert_eq!(a, b, "image {} differs between runs", image);
    }
}

#[test]
fn test_different_seeds_differ() {
    let a = generate_plate_set(20, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = generate_plate_set(20, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_ne!(a, b);
}
