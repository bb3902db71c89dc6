//! Descriptive charts for a generated dataset.
//!
//! - `<stem>_sat_01.png`: coverage per cycle with the saturation marker
//! - `<stem>_sat_02.png`: same, with the marker labelled
//! - `<stem>_bp_01_0{1,2,3}.png`: images per cycle (labelled, bare, clipped to [0, plates])
//! - `<stem>_bp_02_0{1,2,3}.png`: occurrences per plate (labelled, bare, clipped to [0, cycles])

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::coverage::{CoverageReport, Saturation};
use crate::PlateError;

const CHART_SIZE: (u32, u32) = (1200, 700);

/// Writes every chart into `dir` and returns the created paths.
pub fn write_charts(dir: &Path, stem: &str, coverage: &CoverageReport) -> Result<Vec<PathBuf>, PlateError> {
    let plates = coverage.occurrences_per_plate.len();
    let cycles = coverage.coverage.len();
    let mut written = Vec::new();

    for (suffix, with_label) in [("sat_01", false), ("sat_02", true)] {
        let path = dir.join(format!("{stem}_{suffix}.png"));
        render_coverage(&path, &coverage.coverage, plates, coverage.saturation, with_label)
            .map_err(|e| PlateError::Chart(format!("{}: {}", path.display(), e)))?;
        written.push(path);
    }

    let per_plate: Vec<usize> = coverage.occurrences_per_plate.iter().map(|(_, n)| *n).collect();
    let box_plots = [
        ("bp_01_01", "Number of seen LPNs per cycle", &coverage.images_per_cycle, None),
        ("bp_01_02", "", &coverage.images_per_cycle, None),
        ("bp_01_03", "", &coverage.images_per_cycle, Some(plates)),
        ("bp_02_01", "Number of occurences per LPN", &per_plate, None),
        ("bp_02_02", "", &per_plate, None),
        ("bp_02_03", "", &per_plate, Some(cycles)),
    ];

    for (suffix, label, values, clip) in box_plots {
        if values.is_empty() {
            continue;
        }
        let path = dir.join(format!("{stem}_{suffix}.png"));
        render_box_plot(&path, label, values, clip)
            .map_err(|e| PlateError::Chart(format!("{}: {}", path.display(), e)))?;
        written.push(path);
    }

    log::info!("Saved {} charts to {}", written.len(), dir.display());
    Ok(written)
}

fn render_coverage(
    out_path: &Path,
    coverage: &[usize],
    plates: usize,
    saturation: Saturation,
    with_label: bool,
) -> Result<(), Box<dyn Error>> {
    let x_max = coverage.len() as f64 + 0.5;
    let y_max = plates.max(1) as f64 * 1.05;

    let root = BitMapBackend::new(out_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..x_max, 0.0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("cycle")
        .y_desc("distinct plates seen")
        .draw()?;

    let points = coverage
        .iter()
        .enumerate()
        .map(|(i, &seen)| ((i + 1) as f64, seen as f64));
    chart.draw_series(LineSeries::new(points, &BLUE))?;

    if let Some(round) = saturation.round() {
        let x = round as f64;
        let dash = y_max / 40.0;
        let dashes = (0..20).map(|i| {
            let y0 = 2.0 * i as f64 * dash;
            PathElement::new(vec![(x, y0), (x, (y0 + dash).min(y_max))], RED.stroke_width(2))
        });
        chart.draw_series(dashes)?;

        if with_label {
            let text = format!("Saturation after {} rounds", round);
            let style = ("sans-serif", 24).into_font().color(&RED);
            chart.draw_series(std::iter::once(Text::new(text, (x + 0.1, plates as f64 / 2.0), style)))?;
        }
    }

    root.present()?;
    Ok(())
}

fn render_box_plot(
    out_path: &Path,
    label: &str,
    values: &[usize],
    clip: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let data: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    let quartiles = Quartiles::new(&data);
    let [low, _, _, _, high] = quartiles.values();

    let (y_min, y_max) = match clip {
        Some(upper) => (0.0f32, upper.max(1) as f32),
        None => {
            let pad = ((high - low) * 0.1).max(0.5);
            (low - pad, high + pad)
        }
    };

    let labels = [label];
    let root = BitMapBackend::new(out_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(labels[..].into_segmented(), y_min..y_max)?;

    chart.configure_mesh().disable_x_mesh().draw()?;

    chart.draw_series(std::iter::once(Boxplot::new_vertical(
        SegmentValue::CenterOf(&labels[0]),
        &quartiles,
    )))?;

    root.present()?;
    Ok(())
}
