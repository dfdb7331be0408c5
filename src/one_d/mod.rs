//! Программный (фоллбэк) ридер линейных кодов: EAN-13/UPC-A и Code 128.

pub mod code128;
pub mod ean13;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::image::GrayImage;
use crate::symbology::{BarcodeFormat, RawDetection};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Сколько строк сканировать (равномерно по высоте).
    pub scan_rows: usize,
    /// Строки короче этого (в пикселях) даже не пробуем.
    pub min_modules: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scan_rows: 15,
            min_modules: 30,
        }
    }
}

/// Декодировать все поддерживаемые символики сканированием нескольких строк.
/// На каждой строке сначала EAN-13/UPC-A, потом Code 128.
/// Дубликаты с разных строк схлопываются; порядок — сверху вниз.
/// Кадр, буфер которого короче `width * height`, пропускается целиком.
pub fn decode_rows(img: &GrayImage<'_>, opts: &DecodeOptions) -> Vec<RawDetection> {
    let mut out: Vec<RawDetection> = Vec::new();
    if img.is_empty() {
        return out;
    }
    if !img.is_consistent() {
        trace!(width = img.width, height = img.height, len = img.data.len(), "malformed frame");
        return out;
    }
    let rows = opts.scan_rows.clamp(1, img.height);
    for i in 0..rows {
        let y = (i * (img.height - 1)) / (rows - 1).max(1);
        let Some(hit) = decode_row(img.row(y), opts) else {
            continue;
        };
        if !out.contains(&hit) {
            out.push(hit);
        }
    }
    out
}

fn decode_row(row: &[u8], opts: &DecodeOptions) -> Option<RawDetection> {
    if let Some(text) = ean13::decode_row(row, opts) {
        let format = if text.len() == 12 {
            BarcodeFormat::UpcA
        } else {
            BarcodeFormat::Ean13
        };
        return Some(RawDetection::new(text, format));
    }
    let text = code128::decode_row(row, opts)?;
    let raw = code128::gs1_gtin(&text).map(str::to_string).unwrap_or(text);
    Some(RawDetection::new(raw, BarcodeFormat::Code128))
}

/// Ширины в модулях → пиксели (0 = чёрный, 255 = белый), начиная с белой тихой зоны.
pub(crate) fn widths_to_pixels(widths: &[u8], unit: usize) -> Vec<u8> {
    let total: usize = widths.iter().map(|&w| usize::from(w)).sum();
    let mut pix = Vec::with_capacity(total * unit);
    for (i, &w) in widths.iter().enumerate() {
        let val = if i % 2 == 0 { 255 } else { 0 };
        pix.extend(std::iter::repeat(val).take(usize::from(w) * unit));
    }
    pix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::LumaImage;

    #[test]
    fn same_code_on_every_row_is_reported_once() {
        let row = ean13::synthesize_row("4006381333931", 2).unwrap();
        let img = LumaImage::from_row(&row, 20);
        let found = decode_rows(&img.as_gray(), &DecodeOptions::default());
        assert_eq!(found, vec![RawDetection::new("4006381333931", BarcodeFormat::Ean13)]);
    }

    #[test]
    fn twelve_digit_read_is_upca() {
        let row = ean13::synthesize_row("036000291452", 2).unwrap();
        let img = LumaImage::from_row(&row, 4);
        let found = decode_rows(&img.as_gray(), &DecodeOptions::default());
        assert_eq!(found[0].format, BarcodeFormat::UpcA);
    }

    #[test]
    fn code128_is_read_after_ean() {
        let row = code128::synthesize_row("036000291452", code128::CodeSet::C, 2).unwrap();
        let img = LumaImage::from_row(&row, 6);
        let found = decode_rows(&img.as_gray(), &DecodeOptions::default());
        assert_eq!(found, vec![RawDetection::new("036000291452", BarcodeFormat::Code128)]);
        let result = found[0].normalize(false).unwrap();
        assert_eq!(result.barcode, "0036000291452");
        assert_eq!(result.format, BarcodeFormat::Code128);
    }

    #[test]
    fn gs1_128_reports_the_gtin() {
        let row =
            code128::synthesize_row("\u{1d}0110012345678902", code128::CodeSet::C, 2).unwrap();
        let img = LumaImage::from_row(&row, 3);
        let found = decode_rows(&img.as_gray(), &DecodeOptions::default());
        assert_eq!(found, vec![RawDetection::new("10012345678902", BarcodeFormat::Code128)]);
        assert_eq!(found[0].normalize(true).unwrap().barcode, "10012345678902");
    }

    #[test]
    fn short_buffer_is_skipped() {
        let img = LumaImage {
            data: vec![255; 10],
            width: 100,
            height: 10,
        };
        assert!(decode_rows(&img.as_gray(), &DecodeOptions::default()).is_empty());
    }

    #[test]
    fn empty_image_is_fine() {
        let img = LumaImage {
            data: Vec::new(),
            width: 0,
            height: 0,
        };
        assert!(decode_rows(&img.as_gray(), &DecodeOptions::default()).is_empty());
    }
}
