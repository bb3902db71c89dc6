//! plate-gen CLI - synthetic license plate dataset generation.
//!
//! Usage: cargo run -p plate-cli -- --plates 100 --images-per-plate 20 --probability 0.3

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use plate_core::{charts, DatasetGenerator, GeneratorConfig, PlateAssets, ReportWriter, RunSummary};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "plate-gen")]
#[command(version)]
#[command(about = "Generate a labelled dataset of synthetic license plate images")]
struct Cli {
    /// JSON configuration file (flags override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of distinct license plates
    #[arg(long)]
    plates: Option<usize>,

    /// Number of generation cycles per plate
    #[arg(long)]
    images_per_plate: Option<usize>,

    /// Probability that a plate appears in a cycle, in [0, 1]
    #[arg(long)]
    probability: Option<f64>,

    /// Maximum rotation angle in degrees
    #[arg(long)]
    max_rotation: Option<u32>,

    /// Maximum Gaussian blur radius
    #[arg(long)]
    max_blur: Option<u32>,

    /// Disable salt-and-pepper grain
    #[arg(long)]
    no_grain: bool,

    /// Disable lighting variation
    #[arg(long)]
    no_lighting: bool,

    /// Output directory for images and reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory with EuroPlate.ttf, eu_patch.png and german_police_registration.jpg
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        if let Some(plates) = self.plates {
            config.plates_to_generate = plates;
        }
        if let Some(images) = self.images_per_plate {
            config.images_per_plate = images;
        }
        if let Some(p) = self.probability {
            config.appearance_probability = p;
        }
        if let Some(angle) = self.max_rotation {
            config.disturbance.max_rotation_degrees = angle;
        }
        if let Some(radius) = self.max_blur {
            config.disturbance.max_blur_radius = radius;
        }
        if self.no_grain {
            config.disturbance.enable_grain = false;
        }
        if self.no_lighting {
            config.disturbance.enable_lighting_variation = false;
        }
        if let Some(output) = self.output {
            config.output_directory = output;
        }
        if let Some(dir) = self.assets {
            config.assets = PlateAssets::in_dir(dir);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_charts {
            config.write_charts = false;
        }

        Ok(config)
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let print_config = cli.print_config;
    let config = cli.into_config()?;

    if print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;

    let generator = DatasetGenerator::from_config(config.clone())
        .context("Failed to prepare plate renderer")?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    log::info!(
        "Generating {} plates x {} cycles into {}",
        config.plates_to_generate,
        config.images_per_plate,
        config.output_directory.display()
    );

    let run = generator.generate(&mut rng).context("Dataset generation failed")?;

    let writer = ReportWriter::timestamped(&config.output_directory);
    let summary = RunSummary::new(&config, &run.coverage);
    writer
        .write(&summary, &run.matrix, &run.coverage)
        .context("Failed to write report")?;

    if config.write_charts {
        charts::write_charts(writer.dir(), writer.stem(), &run.coverage)
            .context("Failed to render charts")?;
    }

    println!("File saved as {}", writer.stem());
    println!(
        "{} images, saturation: {}",
        run.coverage.total_images(),
        summary.saturation
    );

    Ok(())
}
