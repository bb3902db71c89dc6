//! Модуль генерации номерных знаков
//!
//! Номер состоит из трёх частей:
//! - код региона (2 буквы)
//! - код серии (2 буквы)
//! - порядковый номер (4 цифры)
//!
//! Буквы выбираются из алфавита в 29 символов (латиница + Ä, Ü, Ö).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::PlateError;

/// Алфавит для кода региона и кода серии
pub const PLATE_ALPHABET: [char; 29] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'Ä', 'Ü', 'Ö',
];

const DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

pub const REGION_LEN: usize = 2;
pub const SERIES_LEN: usize = 2;
pub const SERIAL_LEN: usize = 4;

/// Количество различных номеров, которые можно построить: 29^4 * 10^4
pub const fn plate_space_capacity() -> u64 {
    let letters = PLATE_ALPHABET.len() as u64;
    let digits = DIGITS.len() as u64;
    letters.pow((REGION_LEN + SERIES_LEN) as u32) * digits.pow(SERIAL_LEN as u32)
}

/// Номерной знак
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlateLabel {
    region: String,
    series: String,
    serial: String,
}

impl PlateLabel {
    /// Создание номера с проверкой синтаксиса каждой части
    pub fn new(region: &str, series: &str, serial: &str) -> Result<Self, PlateError> {
        if !is_letter_block(region, REGION_LEN) {
            return Err(PlateError::InvalidLabel(format!("bad region code '{region}'")));
        }
        if !is_letter_block(series, SERIES_LEN) {
            return Err(PlateError::InvalidLabel(format!("bad series code '{series}'")));
        }
        if serial.chars().count() != SERIAL_LEN || !serial.chars().all(|c| c.is_ascii_digit()) {
            return Err(PlateError::InvalidLabel(format!("bad serial number '{serial}'")));
        }

        Ok(Self {
            region: region.to_string(),
            series: series.to_string(),
            serial: serial.to_string(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Форма для отрисовки: три пробела после региона, один перед номером
    pub fn display_form(&self) -> String {
        format!("{}   {} {}", self.region, self.series, self.serial)
    }

    /// Форма для хранения (ключ в таблице): без пробелов
    pub fn storage_form(&self) -> String {
        format!("{}{}{}", self.region, self.series, self.serial)
    }
}

impl fmt::Display for PlateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_form())
    }
}

impl FromStr for PlateLabel {
    type Err = PlateError;

    /// Разбор номера в форме хранения или отображения (пробелы игнорируются)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != REGION_LEN + SERIES_LEN + SERIAL_LEN {
            return Err(PlateError::InvalidLabel(format!("wrong length: '{s}'")));
        }

        let region: String = chars[..REGION_LEN].iter().collect();
        let series: String = chars[REGION_LEN..REGION_LEN + SERIES_LEN].iter().collect();
        let serial: String = chars[REGION_LEN + SERIES_LEN..].iter().collect();

        Self::new(&region, &series, &serial)
    }
}

fn is_letter_block(block: &str, len: usize) -> bool {
    block.chars().count() == len && block.chars().all(|c| PLATE_ALPHABET.contains(&c))
}

fn random_string<R: Rng + ?Sized>(rng: &mut R, alphabet: &[char], len: usize) -> String {
    (0..len)
        .filter_map(|_| alphabet.choose(rng))
        .collect()
}

/// Генерация одного случайного номера (символы выбираются независимо, с возвращением)
pub fn generate_plate<R: Rng + ?Sized>(rng: &mut R) -> PlateLabel {
    PlateLabel {
        region: random_string(rng, &PLATE_ALPHABET, REGION_LEN),
        series: random_string(rng, &PLATE_ALPHABET, SERIES_LEN),
        serial: random_string(rng, &DIGITS, SERIAL_LEN),
    }
}

/// Генерация `count` различных номеров методом отбора
///
/// Порядок результата совпадает с порядком генерации. Запрос больше
/// ёмкости пространства номеров отклоняется до начала выборки.
pub fn generate_plate_set<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Result<Vec<PlateLabel>, PlateError> {
    let capacity = plate_space_capacity();
    if count as u64 > capacity {
        return Err(PlateError::CapacityExceeded {
            requested: count as u64,
            capacity,
        });
    }

    let mut seen = HashSet::with_capacity(count);
    let mut plates = Vec::with_capacity(count);
    let mut rejected = 0u64;

    while plates.len() < count {
        let candidate = generate_plate(rng);
        if seen.insert(candidate.storage_form()) {
            plates.push(candidate);
        } else {
            rejected += 1;
        }
    }

    if rejected > 0 {
        log::debug!("Rejected {} duplicate plates while sampling {}", rejected, count);
    }

    Ok(plates)
}

/// Случайный идентификатор изображения (UUID, 122 случайных бита)
///
/// Используется только как имя файла, к уникальности номеров отношения не имеет.
pub fn generate_unique_identifier<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_well_formed(label: &PlateLabel) {
        let storage: Vec<char> = label.storage_form().chars().collect();
        assert_eq!(storage.len(), 8);
        assert!(storage[..4].iter().all(|c| PLATE_ALPHABET.contains(c)));
        assert!(storage[4..].iter().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_alphabet() {
        assert_eq!(PLATE_ALPHABET.len(), 29);
        assert_eq!(plate_space_capacity(), 7_072_810_000);
    }

    #[test]
    fn test_generate_plate_syntax() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_well_formed(&generate_plate(&mut rng));
        }
    }

    #[test]
    fn test_display_and_storage_forms() {
        let label = PlateLabel::new("ÄB", "CZ", "0042").unwrap();
        assert_eq!(label.display_form(), "ÄB   CZ 0042");
        assert_eq!(label.storage_form(), "ÄBCZ0042");
        assert_eq!(label.to_string(), label.display_form());
    }

    #[test]
    fn test_space_removal_matches_storage_form() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let label = generate_plate(&mut rng);
            assert_eq!(label.display_form().replace(' ', ""), label.storage_form());
        }
    }

    #[test]
    fn test_parse() {
        let label: PlateLabel = "ÖÜ   AA 1234".parse().unwrap();
        assert_eq!(label.region(), "ÖÜ");
        assert_eq!(label.series(), "AA");
        assert_eq!(label.serial(), "1234");
        assert_eq!("ÖÜAA1234".parse::<PlateLabel>().unwrap(), label);

        assert!("AB CD 123".parse::<PlateLabel>().is_err());
        assert!("A1CD1234".parse::<PlateLabel>().is_err());
        assert!("ABCD12X4".parse::<PlateLabel>().is_err());
        assert!("abCD1234".parse::<PlateLabel>().is_err());
    }

    #[test]
    fn test_plate_set_is_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        let plates = generate_plate_set(500, &mut rng).unwrap();
        assert_eq!(plates.len(), 500);

        let unique: HashSet<String> = plates.iter().map(|p| p.storage_form()).collect();
        assert_eq!(unique.len(), 500);
        plates.iter().for_each(assert_well_formed);
    }

    #[test]
    fn test_plate_set_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_plate_set(0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut rng = StdRng::seed_from_u64(3);
        let requested = plate_space_capacity() + 1;
        match generate_plate_set(requested as usize, &mut rng) {
            Err(PlateError::CapacityExceeded { requested: r, capacity }) => {
                assert_eq!(r, requested);
                assert_eq!(capacity, plate_space_capacity());
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_identifier() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = generate_unique_identifier(&mut rng);
        let b = generate_unique_identifier(&mut rng);
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(uuid::Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }
}
