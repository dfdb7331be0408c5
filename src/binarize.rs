//! Бинаризация строки кадра и перевод в ширины баров (модули).
//!
//! Основной путь — адаптивный порог по скользящему среднему (кадры с камеры
//! почти всегда освещены неравномерно); глобальный порог остаётся фоллбэком.

/// Минимальное и максимальное полуокно адаптивного порога.
const ADAPTIVE_WIN_MIN: usize = 8;
const ADAPTIVE_WIN_MAX: usize = 64;
/// Сдвиг порога в сторону «белого»: пиксель чёрный, только если заметно темнее среднего.
const ADAPTIVE_BIAS: i32 = 5;

/// Глобальный порог: среднее между средней яркостью и серединой [min, max].
#[inline]
pub fn global_threshold(row: &[u8]) -> u8 {
    if row.is_empty() {
        return 0;
    }
    let (min_v, max_v) = row
        .iter()
        .fold((u8::MAX, 0u8), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let sum: u64 = row.iter().map(|&v| u64::from(v)).sum();
    let mean = sum / row.len() as u64;
    let mid = (u64::from(min_v) + u64::from(max_v)) / 2;
    ((mean + mid) / 2) as u8
}

/// Глобальная бинаризация строки: true = чёрный.
pub fn binarize_row(row: &[u8]) -> Vec<bool> {
    let t = global_threshold(row);
    row.iter().map(|&v| v < t).collect()
}

/// Адаптивная бинаризация: полуокно = width/32 в пределах [8, 64].
pub fn binarize_row_adaptive(row: &[u8]) -> Vec<bool> {
    let n = row.len();
    if n == 0 {
        return Vec::new();
    }
    let win = (n / 32).clamp(ADAPTIVE_WIN_MIN, ADAPTIVE_WIN_MAX);

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0u32);
    let mut acc = 0u32;
    for &v in row {
        acc += u32::from(v);
        prefix.push(acc);
    }

    (0..n)
        .map(|i| {
            let left = i.saturating_sub(win);
            let right = (i + win).min(n - 1);
            let len = (right - left + 1) as u32;
            let mean = ((prefix[right + 1] - prefix[left]) / len) as i32;
            i32::from(row[i]) < mean - ADAPTIVE_BIAS
        })
        .collect()
}

/// Длины серий одинакового цвета, начиная с первого пикселя.
pub fn runs(bits: &[bool]) -> Vec<usize> {
    let mut out = Vec::new();
    let mut iter = bits.iter();
    let Some(&first) = iter.next() else {
        return out;
    };
    let (mut cur, mut len) = (first, 1usize);
    for &b in iter {
        if b == cur {
            len += 1;
        } else {
            out.push(len);
            cur = b;
            len = 1;
        }
    }
    out.push(len);
    out
}

/// Перевести ширины серий в модули 1..=4.
/// Базовый модуль — нижний квартиль ширин: тихие зоны по краям его не сдвигают.
pub fn to_modules(run_lengths: &[usize]) -> Vec<u8> {
    if run_lengths.is_empty() {
        return Vec::new();
    }
    let mut sorted = run_lengths.to_vec();
    sorted.sort_unstable();
    let base = sorted[sorted.len() / 4].max(1);
    run_lengths
        .iter()
        .map(|&w| ((w + base / 2) / base).clamp(1, 4) as u8)
        .collect()
}

/// Строка → серии в пикселях. Сначала адаптивно; если серий меньше `min_runs` — глобально.
pub fn row_runs(row: &[u8], min_runs: usize) -> Option<Vec<usize>> {
    let adaptive = runs(&binarize_row_adaptive(row));
    if adaptive.len() >= min_runs {
        return Some(adaptive);
    }
    let global = runs(&binarize_row(row));
    (global.len() >= min_runs).then_some(global)
}

/// Строка → модули 1..=4 (см. [`row_runs`], [`to_modules`]).
pub fn row_modules(row: &[u8], min_runs: usize) -> Option<Vec<u8>> {
    row_runs(row, min_runs).map(|r| to_modules(&r))
}
