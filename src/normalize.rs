//! Нормализация сырых строк декодера в розничный штрих-код.
//!
//! Берём только цифры; допустимая длина 8..=14 (EAN-8 … GTIN-14).
//! UPC-A (12 цифр) дополняется ведущим нулём до EAN-13, остальное как есть.

use std::ops::RangeInclusive;

/// Допустимое число цифр после очистки.
pub const DIGITS_RANGE: RangeInclusive<usize> = 8..=14;

/// Привести сырое значение к каноническому виду. `None` — отклонено.
///
/// Контрольная цифра не проверяется: см. [`normalize_with`].
pub fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if !DIGITS_RANGE.contains(&digits.len()) {
        return None;
    }
    if digits.len() == 12 {
        return Some(format!("0{digits}"));
    }
    Some(digits)
}

/// То же, что [`normalize`], но с опциональной проверкой контрольной цифры GS1.
/// При проверке принимаются только GTIN-длины: 8, 13 (в т.ч. из UPC-A) и 14.
pub fn normalize_with(raw: &str, verify_check_digit: bool) -> Option<String> {
    let code = normalize(raw)?;
    if verify_check_digit && !has_valid_check_digit(&code) {
        return None;
    }
    Some(code)
}

/// Проверка контрольной цифры GS1 mod-10 для GTIN-8/12/13/14.
pub fn has_valid_check_digit(code: &str) -> bool {
    if !matches!(code.len(), 8 | 12 | 13 | 14) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
    let (body, check) = digits.split_at(digits.len() - 1);
    crate::one_d::ean13::check_digit(body) == check[0]
}
