//! Программный декодер Code 128 по одной строке.
//!
//! Наборы A/B/C, SHIFT, смена набора, FNC1 (в тексте — GS, ASCII 29),
//! контрольный символ mod 103. Стоп-символ (7 серий, 13 модулей) задаёт правый
//! край, от него символы читаются справа налево до стартового кода.

use crate::binarize::row_runs;
use crate::one_d::{widths_to_pixels, DecodeOptions};

/// Ширины бар/пробел/… символов 0..=105, в сумме 11 модулей.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3], [1, 2, 1, 3, 2, 2], // 0
    [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2], [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], // 5
    [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2], [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], // 10
    [1, 1, 3, 2, 2, 2], [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2], // 15
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1], [3, 1, 1, 2, 2, 2], // 20
    [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2], [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], // 25
    [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1], [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], // 30
    [1, 3, 1, 3, 2, 1], [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3], // 35
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1], [1, 3, 2, 1, 3, 1], // 40
    [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1], [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], // 45
    [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3], [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], // 50
    [3, 1, 1, 3, 2, 1], [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1], // 55
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4], [1, 1, 1, 4, 2, 2], // 60
    [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2], [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], // 65
    [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4], [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], // 70
    [2, 4, 1, 2, 1, 1], [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1], // 75
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2], [1, 2, 4, 1, 1, 2], // 80
    [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2], [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], // 85
    [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1], [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], // 90
    [1, 1, 4, 1, 1, 3], [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1], // 95
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2], [2, 1, 1, 2, 1, 4], // 100
    [2, 1, 1, 2, 3, 2], // 105
];

const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

const FNC3: u8 = 96;
const FNC2: u8 = 97;
const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
/// В наборе A это ещё и FNC4 набора B, и наоборот.
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;

/// Так FNC1 выглядит в декодированном тексте.
pub const GS: char = '\u{1d}';

/// Старт + символ данных + контрольный + стоп.
const MIN_RUNS: usize = 25;

/// Тихая зона синтетической строки, в модулях.
const QUIET: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn start(self) -> u8 {
        match self {
            Self::A => START_A,
            Self::B => START_A + 1,
            Self::C => START_A + 2,
        }
    }

    fn from_start(value: u8) -> Option<Self> {
        match value.checked_sub(START_A)? {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            _ => None,
        }
    }

    /// Набор для одного символа после SHIFT.
    fn shifted(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
            Self::C => Self::C,
        }
    }
}

/// Декодировать одну строку. Успех → текст символа (FNC1 → [`GS`]).
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }
    let runs = row_runs(row_gray, MIN_RUNS)?;
    // ложный стоп внутри данных не пройдёт контрольную сумму — пробуем дальше
    runs.windows(STOP.len())
        .enumerate()
        .filter(|(_, w)| scaled::<7>(w, 13).is_some_and(|p| distance(&p, &STOP) <= 1))
        .find_map(|(i, _)| read_back(&runs[..i]))
}

/// Символы слева от стопа, справа налево до стартового кода.
fn read_back(left: &[usize]) -> Option<String> {
    let mut values = Vec::new();
    let mut end = left.len();
    while end >= 6 {
        let value = symbol_value(&left[end - 6..end])?;
        end -= 6;
        if let Some(set) = CodeSet::from_start(value) {
            values.reverse();
            return checked_text(set, &values);
        }
        values.push(value);
    }
    None
}

/// `values` = данные + контрольный символ.
fn checked_text(start: CodeSet, values: &[u8]) -> Option<String> {
    let (&check, payload) = values.split_last()?;
    if payload.is_empty() || checksum(start, payload) != check {
        return None;
    }
    values_to_text(start, payload)
}

fn checksum(start: CodeSet, payload: &[u8]) -> u8 {
    let sum = payload
        .iter()
        .zip(1u32..)
        .fold(u32::from(start.start()), |acc, (&v, weight)| {
            acc + u32::from(v) * weight
        });
    (sum % 103) as u8
}

fn values_to_text(mut set: CodeSet, payload: &[u8]) -> Option<String> {
    let mut out = String::new();
    let mut shifted = false;
    for &v in payload {
        let current = if shifted { set.shifted() } else { set };
        shifted = false;
        match (current, v) {
            (_, FNC1) => out.push(GS),
            (CodeSet::C, 0..=99) => {
                out.push(char::from(b'0' + v / 10));
                out.push(char::from(b'0' + v % 10));
            }
            (CodeSet::C, CODE_B) => set = CodeSet::B,
            (CodeSet::C, CODE_A) => set = CodeSet::A,
            (CodeSet::A, 0..=63) | (CodeSet::B, 0..=95) => out.push(char::from(v + 32)),
            (CodeSet::A, 64..=95) => out.push(char::from(v - 64)),
            (_, FNC2 | FNC3) | (CodeSet::A, CODE_A) | (CodeSet::B, CODE_B) => {}
            (_, SHIFT) => shifted = true,
            (_, CODE_C) => set = CodeSet::C,
            (CodeSet::A, CODE_B) => set = CodeSet::B,
            (CodeSet::B, CODE_A) => set = CodeSet::A,
            _ => return None,
        }
    }
    Some(out)
}

fn symbol_value(runs: &[usize]) -> Option<u8> {
    let pat = scaled::<6>(runs, 11)?;
    let (value, dist) = PATTERNS
        .iter()
        .enumerate()
        .map(|(i, p)| (i, distance(&pat, p)))
        .min_by_key(|&(_, d)| d)?;
    (dist <= 1).then(|| value as u8)
}

/// Пиксельные ширины → модули 1..=4 при известной сумме модулей символа.
fn scaled<const N: usize>(runs: &[usize], total: usize) -> Option<[u8; N]> {
    let sum: usize = runs.iter().sum();
    if runs.len() != N || sum == 0 {
        return None;
    }
    let mut out = [0u8; N];
    for (slot, &w) in out.iter_mut().zip(runs) {
        *slot = ((w * total * 2 + sum) / (sum * 2)).clamp(1, 4) as u8;
    }
    Some(out)
}

fn distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).map(|(&x, &y)| u32::from(x.abs_diff(y))).sum()
}

/// Если текст — GS1-128 с AI (01), вернуть GTIN-14 из него.
pub fn gs1_gtin(text: &str) -> Option<&str> {
    let gtin = text.strip_prefix(GS)?.strip_prefix("01")?.get(..14)?;
    gtin.bytes().all(|b| b.is_ascii_digit()).then_some(gtin)
}

/// Синтез идеальной строки пикселей. В наборе C — пары цифр; [`GS`] везде кодирует FNC1.
/// `None`, если текст не кодируется выбранным набором.
pub fn synthesize_row(text: &str, set: CodeSet, unit: usize) -> Option<Vec<u8>> {
    if unit == 0 {
        return None;
    }
    let mut values = Vec::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        let v = match (set, c) {
            (_, GS) => FNC1,
            (CodeSet::C, hi) => {
                let lo = chars.next()?;
                let pair = (hi.to_digit(10)?, lo.to_digit(10)?);
                (pair.0 * 10 + pair.1) as u8
            }
            (CodeSet::A, ' '..='_') | (CodeSet::B, ' '..='\u{7f}') => c as u8 - 32,
            (CodeSet::A, '\0'..='\u{1f}') => c as u8 + 64,
            _ => return None,
        };
        values.push(v);
    }
    let check = checksum(set, &values);

    let mut widths = vec![QUIET];
    widths.extend(PATTERNS[usize::from(set.start())]);
    for &v in values.iter().chain([&check]) {
        widths.extend(PATTERNS[usize::from(v)]);
    }
    widths.extend(STOP);
    widths.push(QUIET);
    Some(widths_to_pixels(&widths, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(row: &[u8]) -> Option<String> {
        decode_row(row, &DecodeOptions::default())
    }

    #[test]
    fn set_b_text() {
        let row = synthesize_row("HELLO-128", CodeSet::B, 2).unwrap();
        assert_eq!(read(&row).as_deref(), Some("HELLO-128"));
    }

    #[test]
    fn set_c_digit_pairs_including_99() {
        let row = synthesize_row("0123456799", CodeSet::C, 2).unwrap();
        assert_eq!(read(&row).as_deref(), Some("0123456799"));
    }

    #[test]
    fn set_a_maps_control_characters() {
        let row = synthesize_row("AB\u{9}_", CodeSet::A, 3).unwrap();
        assert_eq!(read(&row).as_deref(), Some("AB\u{9}_"));
    }

    #[test]
    fn gs1_gtin_is_extracted() {
        let row = synthesize_row("\u{1d}0110012345678902", CodeSet::C, 2).unwrap();
        let text = read(&row).unwrap();
        assert_eq!(text, "\u{1d}0110012345678902");
        assert_eq!(gs1_gtin(&text), Some("10012345678902"));
        assert_eq!(gs1_gtin("0110012345678902"), None);
    }

    #[test]
    fn corrupted_symbol_fails_checksum() {
        let mut row = synthesize_row("HELLO-128", CodeSet::B, 2).unwrap();
        // первый бар первого символа данных: 2 модуля → 1, пробел за ним шире
        let start = (usize::from(QUIET) + 11) * 2;
        row[start + 2] = 255;
        row[start + 3] = 255;
        assert_eq!(read(&row), None);
    }

    #[test]
    fn unsupported_text_is_not_synthesized() {
        assert!(synthesize_row("123", CodeSet::C, 2).is_none());
        assert!(synthesize_row("abc", CodeSet::A, 2).is_none());
        assert!(synthesize_row("ok", CodeSet::B, 0).is_none());
    }

    #[test]
    fn ean_row_is_not_code128() {
        let row = crate::one_d::ean13::synthesize_row("5901234123457", 2).unwrap();
        assert_eq!(read(&row), None);
    }
}
