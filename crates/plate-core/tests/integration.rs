//! Integration tests for dataset generation

use std::collections::HashSet;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use plate_core::{
    DatasetGenerator, DisturbanceConfig, GeneratorConfig, PlateLayout, PlateRenderer, ReportWriter,
    RunSummary, Saturation, TextPainter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

/// Helper painter: one dark block per character
struct BlockPainter;

impl TextPainter for BlockPainter {
    fn text_size(&self, text: &str) -> (u32, u32) {
        (text.chars().count() as u32 * 40, 90)
    }

    fn draw_text(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        for (i, c) in text.chars().enumerate() {
            if !c.is_whitespace() {
                draw_filled_rect_mut(canvas, Rect::at(x + i as i32 * 40, y).of_size(30, 90), color);
            }
        }
    }
}

fn test_renderer(multiplier: u32) -> PlateRenderer<BlockPainter> {
    let eu = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 120, Rgb([0, 51, 153])));
    let police = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 120, Rgb([0, 110, 60])));
    PlateRenderer::new(PlateLayout::scaled(multiplier), BlockPainter, eu, police)
}

fn test_config(dir: &TempDir, plates: usize, cycles: usize, probability: f64) -> GeneratorConfig {
    GeneratorConfig {
        plates_to_generate: plates,
        images_per_plate: cycles,
        appearance_probability: probability,
        output_directory: dir.path().join("data"),
        size_multiplier: 1,
        write_charts: false,
        ..Default::default()
    }
}

fn count_jpgs(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "jpg").unwrap_or(false))
        .count()
}

#[test]
fn test_three_plates_two_cycles_full_probability() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 3, 2, 1.0);
    let generator = DatasetGenerator::with_renderer(config, test_renderer(1)).unwrap();

    let mut rng = StdRng::seed_from_u64(2023);
    let run = generator.generate(&mut rng).unwrap();

    assert_eq!(run.plates.len(), 3);
    assert_eq!(run.matrix.plate_count(), 3);
    assert_eq!(run.matrix.cycle_count(), 2);
    for row in 0..3 {
        for cycle in 0..2 {
            assert!(run.matrix.get(row, cycle).is_some());
        }
    }

    assert_eq!(run.coverage.coverage, vec![3, 3]);
    assert_eq!(run.coverage.saturation, Saturation::Saturated { cycle: 0 });
    assert_eq!(run.coverage.saturation.round(), Some(1));
    assert_eq!(run.coverage.distinct_images, 6);
    assert_eq!(count_jpgs(&run.output_directory), 6);

    // Изображения - одноканальные JPEG
    let first = run.matrix.get(0, 0).unwrap();
    let img = image::open(run.image_path(first)).unwrap();
    assert_eq!(img.color(), image::ColorType::L8);
}

#[test]
fn test_zero_probability_produces_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 4, 3, 0.0);
    let generator = DatasetGenerator::with_renderer(config, test_renderer(1)).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let run = generator.generate(&mut rng).unwrap();

    assert_eq!(run.coverage.coverage, vec![0, 0, 0]);
    assert_eq!(run.coverage.saturation, Saturation::NotSaturated);
    assert_eq!(run.coverage.saturation.describe(3), "not saturated");
    assert_eq!(count_jpgs(&run.output_directory), 0);
}

#[test]
fn test_partial_probability_coverage_invariants() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, 6, 5, 0.4);
    config.disturbance = DisturbanceConfig::disabled();
    let generator = DatasetGenerator::with_renderer(config, test_renderer(1)).unwrap();

    let mut rng = StdRng::seed_from_u64(77);
    let run = generator.generate(&mut rng).unwrap();

    let coverage = &run.coverage;
    assert_eq!(coverage.coverage.len(), 5);
    assert!(coverage.coverage.windows(2).all(|w| w[0] <= w[1]));
    assert!(*coverage.coverage.last().unwrap() <= 6);

    let total: usize = coverage.images_per_cycle.iter().sum();
    let by_plate: usize = coverage.occurrences_per_plate.iter().map(|(_, n)| n).sum();
    assert_eq!(total, by_plate);
    assert_eq!(total, coverage.total_images());
    assert_eq!(count_jpgs(&run.output_directory), total);

    // каждое изображение принадлежит ровно одной ячейке
    let unique: HashSet<_> = coverage.images.iter().collect();
    assert_eq!(unique.len(), total);
}

#[test]
fn test_missing_assets_are_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, 1, 1, 1.0);
    config.assets = plate_core::PlateAssets::in_dir(dir.path().join("nothing"));

    let result = DatasetGenerator::from_config(config);
    assert!(matches!(result, Err(plate_core::PlateError::AssetMissing(_))));
    // до отрисовки дело не дошло
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_report_files() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, 3, 2, 1.0);
    let generator = DatasetGenerator::with_renderer(config.clone(), test_renderer(1)).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let run = generator.generate(&mut rng).unwrap();

    let writer = ReportWriter::new(&config.output_directory, "0_LPN_Data_test");
    let summary = RunSummary::new(&config, &run.coverage);
    let written = writer.write(&summary, &run.matrix, &run.coverage).unwrap();

    for sheet in [
        "data",
        "data_counts",
        "data_counts_stats",
        "lpn_counts",
        "lpn_counts_stats",
        "total_seen_elements_count",
        "images",
        "summary",
    ] {
        let path = config.output_directory.join(format!("0_LPN_Data_test_{sheet}.csv"));
        assert!(written.contains(&path), "missing sheet {sheet}");
    }

    let data = std::fs::read_to_string(config.output_directory.join("0_LPN_Data_test_data.csv")).unwrap();
    let mut lines = data.lines();
    assert_eq!(lines.next(), Some("lpn,0,1"));
    assert_eq!(lines.count(), 3);

    let json = std::fs::read_to_string(config.output_directory.join("0_LPN_Data_test_summary.json")).unwrap();
    let parsed: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.total_images, 6);
    assert_eq!(parsed.saturation, "1 = 50.0%");
}
