//! Модуль отчётов
//!
//! Каждый лист отчёта записывается отдельным CSV-файлом
//! `<stem>_<sheet>.csv`, сводка дополнительно - в `<stem>_summary.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::coverage::{CoverageReport, PresenceMatrix};
use crate::stats::SummaryStatistics;
use crate::PlateError;

/// Сводка запуска
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_plates: usize,
    pub total_cycles: usize,
    pub total_images: usize,
    /// "<цикл> = <процент>%" или "not saturated"
    pub saturation: String,
    pub max_rotation_degrees: u32,
    pub max_blur_radius: u32,
    pub enable_grain: bool,
    pub enable_lighting_variation: bool,
    pub appearance_probability: f64,
    pub seed: Option<u64>,
}

impl RunSummary {
    pub fn new(config: &GeneratorConfig, coverage: &CoverageReport) -> Self {
        Self {
            total_plates: config.plates_to_generate,
            total_cycles: config.images_per_plate,
            total_images: coverage.distinct_images,
            saturation: coverage.saturation.describe(config.images_per_plate),
            max_rotation_degrees: config.disturbance.max_rotation_degrees,
            max_blur_radius: config.disturbance.max_blur_radius,
            enable_grain: config.disturbance.enable_grain,
            enable_lighting_variation: config.disturbance.enable_lighting_variation,
            appearance_probability: config.appearance_probability,
            seed: config.seed,
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total rows (license plates):", self.total_plates.to_string()),
            ("Total cols (evaluation cycles):", self.total_cycles.to_string()),
            ("Total number of images:", self.total_images.to_string()),
            ("Saturation at", self.saturation.clone()),
            ("max_rotation_angle:", self.max_rotation_degrees.to_string()),
            ("max_gaussianblur_radius:", self.max_blur_radius.to_string()),
            ("grains_to_add:", self.enable_grain.to_string()),
            ("different_lighting:", self.enable_lighting_variation.to_string()),
            ("likelihood_to_appear:", self.appearance_probability.to_string()),
            (
                "seed:",
                self.seed.map(|s| s.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

/// Имя отчёта по времени запуска
pub fn report_stem(now: DateTime<Local>) -> String {
    now.format("0_LPN_Data_%Y-%m-%d_%H-%M").to_string()
}

/// Запись листов отчёта
pub struct ReportWriter {
    dir: PathBuf,
    stem: String,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Отчёт с именем по текущему времени
    pub fn timestamped(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, report_stem(Local::now()))
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", self.stem, sheet))
    }

    /// Запись всех листов, возвращает пути созданных файлов
    pub fn write(
        &self,
        summary: &RunSummary,
        matrix: &PresenceMatrix,
        coverage: &CoverageReport,
    ) -> Result<Vec<PathBuf>, PlateError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PlateError::io(format!("creating {}", self.dir.display()), e))?;

        let mut written = Vec::new();

        written.push(self.write_data(matrix)?);

        let per_cycle: Vec<(String, String)> = coverage
            .images_per_cycle
            .iter()
            .enumerate()
            .map(|(cycle, count)| (cycle.to_string(), count.to_string()))
            .collect();
        written.push(self.write_pairs("data_counts", ("cycle", "images"), &per_cycle)?);
        written.push(self.write_stats(
            "data_counts_stats",
            SummaryStatistics::describe_counts(&coverage.images_per_cycle),
        )?);

        let per_plate: Vec<(String, String)> = coverage
            .occurrences_per_plate
            .iter()
            .map(|(plate, count)| (plate.clone(), count.to_string()))
            .collect();
        written.push(self.write_pairs("lpn_counts", ("lpn", "occurrences"), &per_plate)?);
        let counts: Vec<usize> = coverage.occurrences_per_plate.iter().map(|(_, n)| *n).collect();
        written.push(self.write_stats("lpn_counts_stats", SummaryStatistics::describe_counts(&counts))?);

        written.push(self.write_coverage(&coverage.coverage)?);

        let images: Vec<(String, String)> = coverage
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| (i.to_string(), image.clone()))
            .collect();
        written.push(self.write_pairs("images", ("index", "image"), &images)?);

        let summary_rows: Vec<(String, String)> = summary
            .rows()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        written.push(self.write_pairs("summary", ("key", "value"), &summary_rows)?);

        let json_path = self.dir.join(format!("{}_summary.json", self.stem));
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&json_path, json)
            .map_err(|e| PlateError::io(format!("writing {}", json_path.display()), e))?;
        written.push(json_path);

        log::info!("Report saved as {} ({} files)", self.stem, written.len());
        Ok(written)
    }

    /// Лист `data`: номер и имя файла для каждого цикла
    fn write_data(&self, matrix: &PresenceMatrix) -> Result<PathBuf, PlateError> {
        let path = self.sheet_path("data");
        let mut wtr = csv::Writer::from_path(&path)?;

        let mut header = vec!["lpn".to_string()];
        header.extend((0..matrix.cycle_count()).map(|c| c.to_string()));
        wtr.write_record(&header)?;

        for (row, plate) in matrix.plates().iter().enumerate() {
            let mut record = vec![plate.clone()];
            record.extend(matrix.row(row).iter().map(|cell| cell.clone().unwrap_or_default()));
            wtr.write_record(&record)?;
        }

        wtr.flush().map_err(|e| PlateError::io(format!("writing {}", path.display()), e))?;
        Ok(path)
    }

    fn write_pairs(
        &self,
        sheet: &str,
        header: (&str, &str),
        rows: &[(String, String)],
    ) -> Result<PathBuf, PlateError> {
        let path = self.sheet_path(sheet);
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record([header.0, header.1])?;
        for (key, value) in rows {
            wtr.write_record([key, value])?;
        }
        wtr.flush().map_err(|e| PlateError::io(format!("writing {}", path.display()), e))?;
        Ok(path)
    }

    fn write_stats(&self, sheet: &str, stats: Option<SummaryStatistics>) -> Result<PathBuf, PlateError> {
        let rows: Vec<(String, String)> = stats
            .map(|s| {
                s.rows()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.map(|v| v.to_string()).unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();
        self.write_pairs(sheet, ("statistic", "value"), &rows)
    }

    /// Лист `total_seen_elements_count`: кривая покрытия одной строкой
    fn write_coverage(&self, coverage: &[usize]) -> Result<PathBuf, PlateError> {
        let path = self.sheet_path("total_seen_elements_count");
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(coverage.iter().enumerate().map(|(c, _)| c.to_string()))?;
        wtr.write_record(coverage.iter().map(|n| n.to_string()))?;
        wtr.flush().map_err(|e| PlateError::io(format!("writing {}", path.display()), e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_stem() {
        let now = Local.with_ymd_and_hms(2023, 5, 24, 9, 7, 0).unwrap();
        assert_eq!(report_stem(now), "0_LPN_Data_2023-05-24_09-07");
    }

    #[test]
    fn test_summary_rows() {
        let matrix = PresenceMatrix::from_rows(vec![
            ("AABB1234".to_string(), vec![Some("a.jpg".to_string()), None]),
        ])
        .unwrap();
        let coverage = CoverageReport::compute(&matrix);
        let config = GeneratorConfig {
            plates_to_generate: 1,
            images_per_plate: 2,
            ..Default::default()
        };
        let summary = RunSummary::new(&config, &coverage);

        assert_eq!(summary.total_images, 1);
        assert_eq!(summary.saturation, "1 = 50.0%");
        let rows = summary.rows();
        assert_eq!(rows[3], ("Saturation at", "1 = 50.0%".to_string()));
    }
}
