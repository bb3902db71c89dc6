//! Модуль внесения искажений
//!
//! Последовательность стохастических искажений, применяемых к каждому
//! отрисованному номеру независимо:
//! 1. Поворот (холст расширяется, фон заливается цветом кузова)
//! 2. Изменение освещения (опционально)
//! 3. Размытие по Гауссу
//! 4. Зернистость / импульсный шум (опционально)
//! 5. Перевод в оттенки серого (имитация ИК-съёмки)
//!
//! Порядок шагов фиксирован и не меняется.

use image::{GrayImage, ImageBuffer, Pixel, Primitive, Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::PlateError;

/// Стандартное отклонение сдвига яркости
pub const LIGHTING_STDDEV: f64 = 2.0;
/// Множитель сдвига яркости
pub const LIGHTING_SCALE: f64 = 30.0;
/// Верхняя граница плотности зерна
pub const MAX_GRAIN_DENSITY: f64 = 0.15;

/// Конфигурация искажений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisturbanceConfig {
    /// Максимальный угол поворота в градусах (в обе стороны)
    pub max_rotation_degrees: u32,
    /// Включить изменение освещения
    pub enable_lighting_variation: bool,
    /// Максимальный радиус размытия (включительно)
    pub max_blur_radius: u32,
    /// Включить зернистость
    pub enable_grain: bool,
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            max_rotation_degrees: 2,
            enable_lighting_variation: true,
            max_blur_radius: 2,
            enable_grain: true,
        }
    }
}

/// Верхняя граница угла поворота
pub const MAX_ROTATION_DEGREES: u32 = 360;
/// Верхняя граница радиуса размытия
pub const MAX_BLUR_RADIUS: u32 = 50;

impl DisturbanceConfig {
    /// Проверка границ: угол не больше полного оборота, радиус не больше MAX_BLUR_RADIUS
    pub fn validate(&self) -> Result<(), PlateError> {
        if self.max_rotation_degrees > MAX_ROTATION_DEGREES {
            return Err(PlateError::InvalidConfig(format!(
                "max_rotation_degrees must be at most {MAX_ROTATION_DEGREES}, got {}",
                self.max_rotation_degrees
            )));
        }
        if self.max_blur_radius > MAX_BLUR_RADIUS {
            return Err(PlateError::InvalidConfig(format!(
                "max_blur_radius must be at most {MAX_BLUR_RADIUS}, got {}",
                self.max_blur_radius
            )));
        }
        Ok(())
    }

    /// Конфигурация без искажений (остаётся только перевод в серый)
    pub fn disabled() -> Self {
        Self {
            max_rotation_degrees: 0,
            enable_lighting_variation: false,
            max_blur_radius: 0,
            enable_grain: false,
        }
    }
}

/// Кривая яркости: для каждого уровня 0..=255 свой случайный сдвиг
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingCurve {
    lut: [u8; 256],
}

impl LightingCurve {
    /// Тождественная кривая
    pub fn identity() -> Self {
        let mut lut = [0u8; 256];
        for (level, slot) in lut.iter_mut().enumerate() {
            *slot = level as u8;
        }
        Self { lut }
    }

    /// Новая кривая: level + 30 * N(0, 2), с насыщением в [0, 255]
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut lut = [0u8; 256];
        for (level, slot) in lut.iter_mut().enumerate() {
            let z: f64 = rng.sample(StandardNormal);
            let shifted = level as f64 + LIGHTING_SCALE * LIGHTING_STDDEV * z;
            *slot = shifted.round().clamp(0.0, 255.0) as u8;
        }
        Self { lut }
    }

    /// Кривая с постоянным сдвигом (для тестов и демонстраций)
    pub fn shifted(offset: i32) -> Self {
        let mut lut = [0u8; 256];
        for (level, slot) in lut.iter_mut().enumerate() {
            *slot = (level as i32 + offset).clamp(0, 255) as u8;
        }
        Self { lut }
    }

    pub fn map(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }
}

/// Параметры искажений, выбранные для одного изображения
#[derive(Debug, Clone, PartialEq)]
pub struct DisturbanceParams {
    pub rotation_degrees: i32,
    pub lighting: Option<LightingCurve>,
    pub blur_radius: u32,
    pub grain_density: Option<f64>,
}

impl DisturbanceParams {
    /// Параметры, при которых применяется только перевод в серый
    pub fn none() -> Self {
        Self {
            rotation_degrees: 0,
            lighting: None,
            blur_radius: 0,
            grain_density: None,
        }
    }
}

/// Конвейер искажений
pub struct DisturbancePipeline {
    config: DisturbanceConfig,
}

impl DisturbancePipeline {
    pub fn new(config: DisturbanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisturbanceConfig {
        &self.config
    }

    /// Выбор параметров в порядке шагов: поворот, освещение, размытие, зерно
    pub fn sample_params<R: Rng + ?Sized>(&self, rng: &mut R) -> DisturbanceParams {
        let max_angle = i32::try_from(self.config.max_rotation_degrees.min(MAX_ROTATION_DEGREES))
            .unwrap_or(0);
        let rotation_degrees = rng.gen_range(-max_angle..=max_angle);

        let lighting = self
            .config
            .enable_lighting_variation
            .then(|| LightingCurve::sample(rng));

        let blur_radius = rng.gen_range(0..=self.config.max_blur_radius.min(MAX_BLUR_RADIUS));

        let grain_density = self
            .config
            .enable_grain
            .then(|| sample_grain_density(rng));

        DisturbanceParams {
            rotation_degrees,
            lighting,
            blur_radius,
            grain_density,
        }
    }

    /// Полная обработка: новые параметры для каждого вызова
    pub fn apply<R: Rng + ?Sized>(
        &self,
        image: &RgbImage,
        background: Rgb<u8>,
        rng: &mut R,
    ) -> GrayImage {
        let params = self.sample_params(rng);
        log::debug!(
            "Disturbance: rotation={} lighting={} blur={} grain={:?}",
            params.rotation_degrees,
            params.lighting.is_some(),
            params.blur_radius,
            params.grain_density
        );
        self.apply_with(image, background, &params, rng)
    }

    /// Обработка с заданными параметрами (генератор нужен только для зерна)
    pub fn apply_with<R: Rng + ?Sized>(
        &self,
        image: &RgbImage,
        background: Rgb<u8>,
        params: &DisturbanceParams,
        rng: &mut R,
    ) -> GrayImage {
        let mut result = rotate_expand(image, params.rotation_degrees, background);

        if let Some(curve) = &params.lighting {
            result = apply_lighting(&result, curve);
        }

        result = blur(&result, params.blur_radius);

        if let Some(density) = params.grain_density {
            result = add_grain(&result, density, rng);
        }

        to_grayscale(&result)
    }
}

/// Поворот против часовой стрелки с расширением холста
///
/// Новые области заливаются цветом `fill`. Угол 0 даёт точную копию.
pub fn rotate_expand(image: &RgbImage, degrees: i32, fill: Rgb<u8>) -> RgbImage {
    if degrees == 0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let radians = (degrees as f64).to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());

    let new_width = (width as f64 * cos + height as f64 * sin).ceil() as u32;
    let new_height = (width as f64 * sin + height as f64 * cos).ceil() as u32;

    let mut canvas = RgbImage::from_pixel(new_width.max(width), new_height.max(height), fill);
    let offset_x = (canvas.width() - width) / 2;
    let offset_y = (canvas.height() - height) / 2;
    image::imageops::replace(&mut canvas, image, offset_x as i64, offset_y as i64);

    // imageproc вращает по часовой стрелке
    rotate_about_center(&canvas, -(radians as f32), Interpolation::Nearest, fill)
}

/// Применение кривой яркости ко всем каналам
pub fn apply_lighting(image: &RgbImage, curve: &LightingCurve) -> RgbImage {
    let mut result = image.clone();
    for value in result.iter_mut() {
        *value = curve.map(*value);
    }
    result
}

/// Размытие по Гауссу, радиус = сигма; радиус 0 ничего не меняет
pub fn blur(image: &RgbImage, radius: u32) -> RgbImage {
    if radius == 0 {
        return image.clone();
    }
    gaussian_blur_f32(image, radius as f32)
}

/// Случайная плотность зерна в [0, 0.15], округлённая до сотых
pub fn sample_grain_density<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let density: f64 = rng.gen_range(0.0..=MAX_GRAIN_DENSITY);
    (density * 100.0).round() / 100.0
}

/// Импульсный шум «соль и перец» для каждого канала независимо
///
/// С вероятностью density/2 канал становится минимальным, с вероятностью
/// density/2 максимальным для своего типа (0/255 для 8 бит).
pub fn add_grain<P, R>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    density: f64,
    rng: &mut R,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
    R: Rng + ?Sized,
{
    let mut result = image.clone();
    let density = density.clamp(0.0, 1.0);
    if density == 0.0 {
        return result;
    }

    let min = <P::Subpixel as Primitive>::DEFAULT_MIN_VALUE;
    let max = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE;
    let half = density / 2.0;

    for value in result.iter_mut() {
        let roll: f64 = rng.gen();
        if roll < half {
            *value = min;
        } else if roll < density {
            *value = max;
        }
    }

    result
}

/// Перевод в одноканальное изображение яркости
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}
