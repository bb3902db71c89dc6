//! Plate Core - синтез набора изображений номерных знаков
//!
//! Библиотека для генерации искусственных данных для обучения и оценки ALPR:
//! - Генерация уникальных номеров (регион + серия + порядковый номер)
//! - Отрисовка номера с рамкой, наклейками и текстом
//! - Внесение искажений (поворот, освещение, размытие, зерно, оттенки серого)
//! - Учёт покрытия номеров по циклам и точки насыщения
//! - Отчёты (CSV-листы, JSON-сводка) и графики

pub mod plate;
pub mod render;
pub mod disturbance;
pub mod coverage;
pub mod stats;
pub mod config;
pub mod report;
pub mod charts;

pub use plate::{generate_plate, generate_plate_set, generate_unique_identifier, plate_space_capacity, PlateLabel};
pub use render::{FontPainter, PlateAssets, PlateLayout, PlateRenderer, RenderedPlate, TextPainter};
pub use disturbance::{DisturbanceConfig, DisturbanceParams, DisturbancePipeline, LightingCurve};
pub use coverage::{CoverageReport, PresenceMatrix, Saturation};
pub use stats::SummaryStatistics;
pub use config::GeneratorConfig;
pub use report::{ReportWriter, RunSummary};

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

/// Основные ошибки модуля
#[derive(Error, Debug)]
pub enum PlateError {
    #[error("Required asset is missing: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("Invalid font {}: {reason}", .path.display())]
    InvalidFont { path: PathBuf, reason: String },

    #[error("Failed to load badge {}: {source}", .path.display())]
    BadgeLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Requested {requested} distinct plates, but only {capacity} exist")]
    CapacityExceeded { requested: u64, capacity: u64 },

    #[error("Invalid plate label: {0}")]
    InvalidLabel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chart error: {0}")]
    Chart(String),
}

impl PlateError {
    /// Ошибка ввода-вывода с контекстом
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Результат одного запуска генерации
#[derive(Debug, Clone)]
pub struct GenerationRun {
    /// Номера в порядке генерации (порядок строк матрицы)
    pub plates: Vec<PlateLabel>,
    pub matrix: PresenceMatrix,
    pub coverage: CoverageReport,
    /// Папка с изображениями
    pub output_directory: PathBuf,
}

impl GenerationRun {
    /// Путь к изображению по имени файла из матрицы
    pub fn image_path(&self, file_name: &str) -> PathBuf {
        self.output_directory.join(file_name)
    }
}

/// Главный генератор набора данных
pub struct DatasetGenerator<P = FontPainter> {
    config: GeneratorConfig,
    renderer: PlateRenderer<P>,
    pipeline: DisturbancePipeline,
}

impl DatasetGenerator<FontPainter> {
    /// Создание генератора с загрузкой ресурсов с диска
    ///
    /// Отсутствие шрифта или наклеек - фатальная ошибка до начала отрисовки.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, PlateError> {
        config.validate()?;
        let renderer = PlateRenderer::load(&config.assets, config.layout())?;
        Self::with_renderer(config, renderer)
    }
}

impl<P: TextPainter> DatasetGenerator<P> {
    /// Создание генератора с готовым рендерером
    pub fn with_renderer(config: GeneratorConfig, renderer: PlateRenderer<P>) -> Result<Self, PlateError> {
        config.validate()?;
        let pipeline = DisturbancePipeline::new(config.disturbance.clone());
        Ok(Self {
            config,
            renderer,
            pipeline,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Полный запуск: номера, изображения, матрица присутствия, покрытие
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GenerationRun, PlateError> {
        let out_dir = &self.config.output_directory;
        fs::create_dir_all(out_dir)
            .map_err(|e| PlateError::io(format!("creating {}", out_dir.display()), e))?;

        let plates = generate_plate_set(self.config.plates_to_generate, rng)?;
        log::info!("Generated {} distinct plates", plates.len());

        let cycles = self.config.images_per_plate;
        let mut matrix = PresenceMatrix::new(plates.iter().map(|p| p.storage_form()).collect(), cycles);

        for (row, plate) in plates.iter().enumerate() {
            log::info!("License plate #{} ({})", row + 1, plate.storage_form());

            for cycle in 0..cycles {
                if !rng.gen_bool(self.config.appearance_probability) {
                    continue;
                }
                let file_name = self.render_image(plate, out_dir, rng)?;
                matrix.record(row, cycle, file_name);
            }
        }

        let coverage = CoverageReport::compute(&matrix);
        match coverage.saturation {
            Saturation::NotSaturated => log::warn!(
                "Dataset not saturated after {} cycles ({} of {} plates seen)",
                cycles,
                coverage.coverage.last().copied().unwrap_or(0),
                plates.len()
            ),
            sat => log::info!("Dataset {}", sat),
        }

        Ok(GenerationRun {
            plates,
            matrix,
            coverage,
            output_directory: out_dir.clone(),
        })
    }

    /// Отрисовка, искажение и сохранение одного изображения
    fn render_image<R: Rng + ?Sized>(
        &self,
        plate: &PlateLabel,
        out_dir: &Path,
        rng: &mut R,
    ) -> Result<String, PlateError> {
        let rendered = self.renderer.render(plate, rng);
        let disturbed = self.pipeline.apply(&rendered.image, rendered.body_color, rng);

        let file_name = format!("{}.jpg", generate_unique_identifier(rng));
        let path = out_dir.join(&file_name);
        disturbed.save(&path)?;
        log::debug!("Saved {}", path.display());

        Ok(file_name)
    }
}
