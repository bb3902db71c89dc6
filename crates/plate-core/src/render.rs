//! Модуль отрисовки номерного знака
//!
//! Собирает базовое изображение: серый фон кузова, чёрная рамка номера,
//! белое поле, две наклейки (EU и полицейская регистрация) и текст номера.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::plate::PlateLabel;
use crate::PlateError;

const PLATE_BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const PLATE_WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Диапазон яркости серого фона кузова
pub const BODY_GRAY_RANGE: std::ops::RangeInclusive<u8> = 100..=255;

/// Пути к обязательным ресурсам
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateAssets {
    /// Моноширинный шрифт номерного знака
    pub font: PathBuf,
    /// Наклейка EU
    pub eu_badge: PathBuf,
    /// Наклейка полицейской регистрации
    pub police_badge: PathBuf,
}

impl Default for PlateAssets {
    fn default() -> Self {
        Self::in_dir("assets")
    }
}

impl PlateAssets {
    /// Стандартные имена файлов в заданной папке
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            font: dir.join("EuroPlate.ttf"),
            eu_badge: dir.join("eu_patch.png"),
            police_badge: dir.join("german_police_registration.jpg"),
        }
    }

    /// Проверка наличия всех файлов; первый отсутствующий возвращается как ошибка
    pub fn check(&self) -> Result<(), PlateError> {
        for path in [&self.font, &self.eu_badge, &self.police_badge] {
            if !path.is_file() {
                return Err(PlateError::AssetMissing(path.clone()));
            }
        }
        Ok(())
    }
}

/// Геометрия номерного знака в пикселях
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateLayout {
    pub plate_width: u32,
    pub plate_height: u32,
    /// Отступ номера от края изображения
    pub border_size: u32,
    /// Толщина чёрной рамки
    pub frame_size: u32,
    pub corner_radius: u32,
    pub font_size: f32,
    /// Максимальная ширина наклейки
    pub badge_width: u32,
    /// Смещение полицейской наклейки от внутренней рамки
    pub police_badge_offset: u32,
    /// Сдвиг текста относительно центра
    pub text_offset: (i32, i32),
}

impl PlateLayout {
    /// Геометрия в базовых единицах (множитель 1)
    pub fn base() -> Self {
        Self {
            plate_width: 520,
            plate_height: 110,
            border_size: 20,
            frame_size: 10,
            corner_radius: 10,
            font_size: 95.0,
            badge_width: 50,
            police_badge_offset: 145,
            text_offset: (40, 15),
        }
    }

    /// Геометрия, увеличенная в `multiplier` раз
    pub fn scaled(multiplier: u32) -> Self {
        let base = Self::base();
        let m = multiplier;
        Self {
            plate_width: base.plate_width * m,
            plate_height: base.plate_height * m,
            border_size: base.border_size * m,
            frame_size: base.frame_size * m,
            corner_radius: base.corner_radius * m,
            font_size: base.font_size * m as f32,
            badge_width: base.badge_width * m,
            police_badge_offset: base.police_badge_offset * m,
            text_offset: (base.text_offset.0 * m as i32, base.text_offset.1 * m as i32),
        }
    }

    /// Размер всего изображения (номер + отступы)
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.plate_width + 2 * self.border_size,
            self.plate_height + 2 * self.border_size,
        )
    }

    /// Рамка, в которую вписывается наклейка
    pub fn badge_bounds(&self) -> (u32, u32) {
        (
            self.badge_width,
            (self.plate_height + 1).saturating_sub(self.border_size).max(1),
        )
    }
}

impl Default for PlateLayout {
    fn default() -> Self {
        Self::scaled(2)
    }
}

/// Отрисовка текста номера
///
/// Отделяет рендеринг шрифтов от остальной логики; в тестах
/// подменяется простой реализацией.
pub trait TextPainter {
    /// Размер текста в пикселях (ширина, высота)
    fn text_size(&self, text: &str) -> (u32, u32);

    /// Отрисовка текста с левым верхним углом в (x, y)
    fn draw_text(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str);
}

/// Отрисовка TrueType-шрифтом через imageproc
pub struct FontPainter {
    font: FontVec,
    scale: PxScale,
}

impl FontPainter {
    /// Загрузка шрифта из файла
    pub fn from_file(path: &Path, size: f32) -> Result<Self, PlateError> {
        if !path.is_file() {
            return Err(PlateError::AssetMissing(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|e| PlateError::io(format!("reading font {}", path.display()), e))?;
        Self::from_bytes(bytes, size).map_err(|reason| PlateError::InvalidFont {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Загрузка шрифта из памяти
    pub fn from_bytes(bytes: Vec<u8>, size: f32) -> Result<Self, String> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| e.to_string())?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }
}

impl TextPainter for FontPainter {
    fn text_size(&self, text: &str) -> (u32, u32) {
        text_size(self.scale, &self.font, text)
    }

    fn draw_text(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        draw_text_mut(canvas, color, x, y, self.scale, &self.font, text);
    }
}

/// Результат отрисовки: изображение и цвет кузова (нужен для поворота)
#[derive(Debug, Clone)]
pub struct RenderedPlate {
    pub image: RgbImage,
    pub body_color: Rgb<u8>,
}

/// Рендерер номерных знаков
pub struct PlateRenderer<P = FontPainter> {
    layout: PlateLayout,
    painter: P,
    eu_badge: RgbImage,
    police_badge: RgbImage,
}

impl PlateRenderer<FontPainter> {
    /// Загрузка всех ресурсов с диска; отсутствие любого файла - фатальная ошибка
    pub fn load(assets: &PlateAssets, layout: PlateLayout) -> Result<Self, PlateError> {
        assets.check()?;

        let painter = FontPainter::from_file(&assets.font, layout.font_size)?;
        let eu_badge = load_badge(&assets.eu_badge)?;
        let police_badge = load_badge(&assets.police_badge)?;

        log::info!(
            "Loaded plate assets: font={}, badges={}, {}",
            assets.font.display(),
            assets.eu_badge.display(),
            assets.police_badge.display()
        );

        Ok(Self::new(layout, painter, eu_badge, police_badge))
    }
}

impl<P: TextPainter> PlateRenderer<P> {
    /// Создание рендерера; наклейки уменьшаются с сохранением пропорций
    pub fn new(layout: PlateLayout, painter: P, eu_badge: DynamicImage, police_badge: DynamicImage) -> Self {
        let (max_w, max_h) = layout.badge_bounds();
        Self {
            layout,
            painter,
            eu_badge: fit_badge(eu_badge, max_w, max_h),
            police_badge: fit_badge(police_badge, max_w, max_h),
        }
    }

    pub fn layout(&self) -> &PlateLayout {
        &self.layout
    }

    /// Отрисовка номера на случайном сером фоне
    pub fn render<R: Rng + ?Sized>(&self, label: &PlateLabel, rng: &mut R) -> RenderedPlate {
        let gray = rng.gen_range(BODY_GRAY_RANGE);
        let body_color = Rgb([gray, gray, gray]);
        RenderedPlate {
            image: self.render_on(label, body_color),
            body_color,
        }
    }

    /// Отрисовка номера на заданном фоне
    pub fn render_on(&self, label: &PlateLabel, body_color: Rgb<u8>) -> RgbImage {
        let l = &self.layout;
        let (width, height) = l.canvas_size();
        let mut image = RgbImage::from_pixel(width, height, body_color);

        // Чёрная рамка и белое поле
        let outer = (l.border_size, l.border_size, l.plate_width + l.border_size, l.plate_height + l.border_size);
        fill_rounded_rect(&mut image, outer, l.corner_radius, PLATE_BLACK);
        let inner = (
            outer.0 + l.frame_size,
            outer.1 + l.frame_size,
            outer.2.saturating_sub(l.frame_size),
            outer.3.saturating_sub(l.frame_size),
        );
        fill_rounded_rect(&mut image, inner, l.corner_radius, PLATE_WHITE);

        // Наклейки
        let badge_x = (l.border_size + l.frame_size) as i64;
        let badge_y = (l.border_size + l.frame_size) as i64;
        image::imageops::replace(&mut image, &self.eu_badge, badge_x, badge_y);
        image::imageops::replace(
            &mut image,
            &self.police_badge,
            badge_x + l.police_badge_offset as i64,
            badge_y,
        );

        // Текст по центру с учётом размеров
        let text = label.display_form();
        let (text_w, text_h) = self.painter.text_size(&text);
        let x = l.plate_width as i32 / 2 - text_w as i32 / 2 + l.text_offset.0;
        let y = l.plate_height as i32 / 2 - text_h as i32 / 2 + l.text_offset.1;
        self.painter.draw_text(&mut image, x, y, TEXT_COLOR, &text);

        image
    }
}

fn load_badge(path: &Path) -> Result<DynamicImage, PlateError> {
    image::open(path).map_err(|source| PlateError::BadgeLoad {
        path: path.to_path_buf(),
        source,
    })
}

fn fit_badge(badge: DynamicImage, max_w: u32, max_h: u32) -> RgbImage {
    if badge.width() > max_w || badge.height() > max_h {
        badge.thumbnail(max_w, max_h).to_rgb8()
    } else {
        badge.to_rgb8()
    }
}

/// Закрашенный прямоугольник со скруглёнными углами, координаты включительно
fn fill_rounded_rect(image: &mut RgbImage, (x0, y0, x1, y1): (u32, u32, u32, u32), radius: u32, color: Rgb<u8>) {
    if x1 < x0 || y1 < y0 {
        return;
    }
    let width = x1 - x0 + 1;
    let height = y1 - y0 + 1;
    let r = radius.min(width / 2).min(height / 2);

    if r == 0 {
        draw_filled_rect_mut(image, Rect::at(x0 as i32, y0 as i32).of_size(width, height), color);
        return;
    }

    // Вертикальная и горизонтальная полосы
    if width > 2 * r {
        draw_filled_rect_mut(image, Rect::at((x0 + r) as i32, y0 as i32).of_size(width - 2 * r, height), color);
    }
    if height > 2 * r {
        draw_filled_rect_mut(image, Rect::at(x0 as i32, (y0 + r) as i32).of_size(width, height - 2 * r), color);
    }

    let (r, cx0, cy0) = (r as i32, (x0 + r) as i32, (y0 + r) as i32);
    let (cx1, cy1) = (x1 as i32 - r, y1 as i32 - r);
    for center in [(cx0, cy0), (cx1, cy0), (cx0, cy1), (cx1, cy1)] {
        draw_filled_circle_mut(image, center, r, color);
    }
}
