//! Программный декодер EAN-13/UPC-A по одной строке.
//!
//! Алгоритм:
//! 1) Строка → модули 1..4 (см. [`crate::binarize::row_modules`]).
//! 2) Ищем стартовый guard (1,1,1), дальше шесть левых цифр по 4 модуля.
//! 3) Центральный guard (5 модулей), шесть правых цифр, финальный guard.
//! 4) Первая цифра — по маске чётности левой половины (L/G), затем check digit.

use crate::binarize::row_modules;
use crate::one_d::{widths_to_pixels, DecodeOptions};

/// L-набор (левая половина, «нечётная» чётность): ширины пробел/бар/пробел/бар.
const L_WIDTHS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

/// Маска чётности шести левых цифр для первой цифры 0..9.
/// Бит 5 — первая левая цифра; установленный бит = G-набор.
const PARITY_MASKS: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// Символ EAN-13 — 59 серий; меньше 40 на строке означает, что кода тут нет.
const MIN_RUNS: usize = 40;

/// G-набор — L-ширины в обратном порядке; R-набор по ширинам совпадает с L.
#[inline]
fn g_widths(digit: usize) -> [u8; 4] {
    let [a, b, c, d] = L_WIDTHS[digit];
    [d, c, b, a]
}

/// Декодировать одну строку. Успех → 13 цифр (EAN-13) или 12 (UPC-A, ведущий 0 снят).
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }
    let modules = row_modules(row_gray, MIN_RUNS)?;

    let start = find_triple_guard(&modules)?;
    let mut idx = start + 3;

    let mut digits = [0u8; 13];
    let mut parity = 0u8;
    for slot in 1..=6 {
        let pat = window4(&modules, idx)?;
        let (l_digit, l_dist) = nearest(&pat, |d| L_WIDTHS[d]);
        let (g_digit, g_dist) = nearest(&pat, g_widths);
        parity <<= 1;
        if g_dist < l_dist {
            digits[slot] = g_digit;
            parity |= 1;
        } else {
            digits[slot] = l_digit;
        }
        idx += 4;
    }

    if !is_unit_run(&modules, idx, 5) {
        return None;
    }
    idx += 5;

    for slot in 7..=12 {
        let pat = window4(&modules, idx)?;
        digits[slot] = nearest(&pat, |d| L_WIDTHS[d]).0;
        idx += 4;
    }

    if !is_unit_run(&modules, idx, 3) {
        return None;
    }

    digits[0] = PARITY_MASKS.iter().position(|&m| m == parity)? as u8;
    if check_digit(&digits[..12]) != digits[12] {
        return None;
    }

    let skip = usize::from(digits[0] == 0);
    Some(digits[skip..].iter().map(|d| char::from(b'0' + d)).collect())
}

/// GS1 mod-10: веса 3/1 справа налево по цифрам без контрольной.
pub(crate) fn check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn find_triple_guard(m: &[u8]) -> Option<usize> {
    m.windows(3).position(|w| w == [1, 1, 1])
}

fn is_unit_run(m: &[u8], at: usize, len: usize) -> bool {
    m.get(at..at + len)
        .is_some_and(|w| w.iter().all(|&v| v == 1))
}

fn window4(m: &[u8], at: usize) -> Option<[u8; 4]> {
    m.get(at..at + 4).map(|w| [w[0], w[1], w[2], w[3]])
}

/// Ближайшая цифра по манхэттенскому расстоянию между ширинами.
fn nearest(pat: &[u8; 4], widths: impl Fn(usize) -> [u8; 4]) -> (u8, u32) {
    (0..10)
        .map(|d| {
            let dist = widths(d)
                .iter()
                .zip(pat)
                .map(|(&a, &b)| u32::from(a.abs_diff(b)))
                .sum::<u32>();
            (d as u8, dist)
        })
        .min_by_key(|&(_, dist)| dist)
        .unwrap_or((0, u32::MAX))
}

/// Синтез идеальной строки пикселей (чёрный=0, белый=255) по 12 или 13 цифрам.
/// Для 12 цифр (UPC-A) контрольная цифра пересчитывается, для 13 берётся как есть.
/// Возвращает `None` на нецифровом вводе или неверной длине.
pub fn synthesize_row(digits: &str, unit: usize) -> Option<Vec<u8>> {
    let ds: Vec<u8> = digits
        .bytes()
        .map(|c| c.is_ascii_digit().then(|| c - b'0'))
        .collect::<Option<_>>()?;
    let mut code = [0u8; 13];
    match ds.len() {
        12 => {
            code[1..12].copy_from_slice(&ds[..11]);
            code[12] = check_digit(&code[..12]);
        }
        13 => code.copy_from_slice(&ds),
        _ => return None,
    }

    let mask = PARITY_MASKS[usize::from(code[0])];
    let mut widths: Vec<u8> = vec![9, 1, 1, 1];
    for (i, &d) in code[1..7].iter().enumerate() {
        let g = mask & (0x20 >> i) != 0;
        let w = if g { g_widths(usize::from(d)) } else { L_WIDTHS[usize::from(d)] };
        widths.extend(w);
    }
    widths.extend([1, 1, 1, 1, 1]);
    for &d in &code[7..13] {
        widths.extend(L_WIDTHS[usize::from(d)]);
    }
    widths.extend([1, 1, 1, 9]);

    Some(widths_to_pixels(&widths, unit))
}
