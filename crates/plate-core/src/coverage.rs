//! Модуль учёта покрытия
//!
//! Матрица присутствия (номера x циклы) и производные величины:
//! кривая покрытия, число изображений за цикл, число появлений номера
//! и точка насыщения.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PlateError;

/// Матрица присутствия: строки - номера (форма хранения), столбцы - циклы.
/// Ячейка содержит имя файла изображения или пуста.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMatrix {
    plates: Vec<String>,
    cycles: usize,
    cells: Vec<Option<String>>,
}

impl PresenceMatrix {
    /// Пустая матрица для заданных номеров
    pub fn new(plates: Vec<String>, cycles: usize) -> Self {
        let cells = vec![None; plates.len() * cycles];
        Self { plates, cycles, cells }
    }

    /// Построение из готовых строк; все строки должны иметь одну длину
    pub fn from_rows(rows: Vec<(String, Vec<Option<String>>)>) -> Result<Self, PlateError> {
        let cycles = rows.first().map(|(_, row)| row.len()).unwrap_or(0);
        let mut plates = Vec::with_capacity(rows.len());
        let mut cells = Vec::with_capacity(rows.len() * cycles);

        for (plate, row) in rows {
            if row.len() != cycles {
                return Err(PlateError::InvalidConfig(format!(
                    "row '{}' has {} cycles, expected {}",
                    plate,
                    row.len(),
                    cycles
                )));
            }
            plates.push(plate);
            cells.extend(row);
        }

        Ok(Self { plates, cycles, cells })
    }

    pub(crate) fn record(&mut self, row: usize, cycle: usize, image: String) {
        let idx = row * self.cycles + cycle;
        self.cells[idx] = Some(image);
    }

    pub fn plates(&self) -> &[String] {
        &self.plates
    }

    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }

    pub fn cycle_count(&self) -> usize {
        self.cycles
    }

    pub fn get(&self, row: usize, cycle: usize) -> Option<&str> {
        if row >= self.plates.len() || cycle >= self.cycles {
            return None;
        }
        self.cells[row * self.cycles + cycle].as_deref()
    }

    pub fn row(&self, row: usize) -> &[Option<String>] {
        &self.cells[row * self.cycles..(row + 1) * self.cycles]
    }

    /// Все изображения в порядке столбцов (цикл за циклом)
    pub fn images_by_cycle(&self) -> Vec<&str> {
        let mut images = Vec::new();
        for cycle in 0..self.cycles {
            for row in 0..self.plates.len() {
                if let Some(image) = self.get(row, cycle) {
                    images.push(image);
                }
            }
        }
        images
    }
}

/// Результат поиска точки насыщения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Saturation {
    /// Все номера увидены к циклу `cycle` (индекс с нуля)
    Saturated { cycle: usize },
    /// Хотя бы один номер не появился ни разу
    NotSaturated,
}

impl Saturation {
    /// Номер цикла насыщения, начиная с единицы
    pub fn round(&self) -> Option<usize> {
        match self {
            Saturation::Saturated { cycle } => Some(cycle + 1),
            Saturation::NotSaturated => None,
        }
    }

    /// Текст для отчёта: "<цикл> = <процент>%" или "not saturated"
    pub fn describe(&self, total_cycles: usize) -> String {
        match self.round() {
            Some(round) if total_cycles > 0 => {
                let percent = round as f64 / total_cycles as f64 * 100.0;
                if percent.fract() == 0.0 {
                    format!("{} = {:.1}%", round, percent)
                } else {
                    format!("{} = {}%", round, percent)
                }
            }
            Some(round) => round.to_string(),
            None => "not saturated".to_string(),
        }
    }
}

impl fmt::Display for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.round() {
            Some(round) => write!(f, "saturated after {} rounds", round),
            None => f.write_str("not saturated"),
        }
    }
}

/// Статистика покрытия по матрице присутствия
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Число различных номеров, увиденных в циклах [0..=c]
    pub coverage: Vec<usize>,
    /// Число изображений в каждом цикле
    pub images_per_cycle: Vec<usize>,
    /// Число появлений каждого номера (в порядке строк)
    pub occurrences_per_plate: Vec<(String, usize)>,
    /// Имена файлов в порядке циклов
    pub images: Vec<String>,
    /// Число различных изображений
    pub distinct_images: usize,
    pub saturation: Saturation,
}

impl CoverageReport {
    /// Один проход по столбцам матрицы
    pub fn compute(matrix: &PresenceMatrix) -> Self {
        let plates = matrix.plate_count();
        let cycles = matrix.cycle_count();

        let mut seen = vec![false; plates];
        let mut seen_count = 0usize;
        let mut occurrences = vec![0usize; plates];
        let mut coverage = Vec::with_capacity(cycles);
        let mut images_per_cycle = Vec::with_capacity(cycles);
        let mut images = Vec::new();

        for cycle in 0..cycles {
            let mut produced = 0usize;
            for row in 0..plates {
                if let Some(image) = matrix.get(row, cycle) {
                    produced += 1;
                    occurrences[row] += 1;
                    images.push(image.to_string());
                    if !seen[row] {
                        seen[row] = true;
                        seen_count += 1;
                    }
                }
            }
            coverage.push(seen_count);
            images_per_cycle.push(produced);
        }

        let saturation = coverage
            .iter()
            .position(|&count| count == plates)
            .map(|cycle| Saturation::Saturated { cycle })
            .unwrap_or(Saturation::NotSaturated);

        let distinct_images = images.iter().collect::<HashSet<_>>().len();

        let occurrences_per_plate = matrix
            .plates()
            .iter()
            .cloned()
            .zip(occurrences)
            .collect();

        Self {
            coverage,
            images_per_cycle,
            occurrences_per_plate,
            images,
            distinct_images,
            saturation,
        }
    }

    pub fn total_images(&self) -> usize {
        self.images.len()
    }
}
