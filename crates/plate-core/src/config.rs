//! Конфигурация генерации набора данных

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::disturbance::DisturbanceConfig;
use crate::plate::plate_space_capacity;
use crate::render::{PlateAssets, PlateLayout};
use crate::PlateError;

/// Параметры одного запуска
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Число различных номеров
    pub plates_to_generate: usize,
    /// Число циклов (попыток съёмки) на номер
    pub images_per_plate: usize,
    /// Вероятность появления номера в цикле
    pub appearance_probability: f64,
    /// Искажения
    pub disturbance: DisturbanceConfig,
    /// Папка для изображений и отчётов
    pub output_directory: PathBuf,
    /// Шрифт и наклейки
    pub assets: PlateAssets,
    /// Множитель размеров номера
    pub size_multiplier: u32,
    /// Зерно генератора случайных чисел (None - из энтропии)
    pub seed: Option<u64>,
    /// Строить графики
    pub write_charts: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            plates_to_generate: 3,
            images_per_plate: 2,
            appearance_probability: 1.0,
            disturbance: DisturbanceConfig::default(),
            output_directory: PathBuf::from("data"),
            assets: PlateAssets::default(),
            size_multiplier: 2,
            seed: None,
            write_charts: true,
        }
    }
}

impl GeneratorConfig {
    /// Загрузка из JSON; отсутствующие поля берутся по умолчанию
    pub fn from_json_file(path: &Path) -> Result<Self, PlateError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PlateError::io(format!("reading config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Проверка параметров до начала генерации
    pub fn validate(&self) -> Result<(), PlateError> {
        if self.plates_to_generate == 0 {
            return Err(PlateError::InvalidConfig("plates_to_generate must be positive".into()));
        }
        if self.images_per_plate == 0 {
            return Err(PlateError::InvalidConfig("images_per_plate must be positive".into()));
        }
        let p = self.appearance_probability;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PlateError::InvalidConfig(format!(
                "appearance_probability must be within [0, 1], got {p}"
            )));
        }
        if self.size_multiplier == 0 {
            return Err(PlateError::InvalidConfig("size_multiplier must be positive".into()));
        }
        self.disturbance.validate()?;
        let capacity = plate_space_capacity();
        if self.plates_to_generate as u64 > capacity {
            return Err(PlateError::CapacityExceeded {
                requested: self.plates_to_generate as u64,
                capacity,
            });
        }
        Ok(())
    }

    pub fn layout(&self) -> PlateLayout {
        PlateLayout::scaled(self.size_multiplier)
    }
}
