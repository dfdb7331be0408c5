// src/symbology.rs
//
// Имена символик совпадают с теми, что отдают нативные детекторы платформы.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::normalize_with;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "ean_8")]
    Ean8,
    UpcA,
    UpcE,
    #[serde(rename = "code_128")]
    Code128,
    #[serde(rename = "code_39")]
    Code39,
    #[serde(rename = "code_93")]
    Code93,
    Codabar,
    Itf,
    QrCode,
    DataMatrix,
    #[serde(rename = "pdf417")]
    Pdf417,
    Aztec,
}

impl BarcodeFormat {
    pub const ALL: [Self; 13] = [
        Self::Ean13,
        Self::Ean8,
        Self::UpcA,
        Self::UpcE,
        Self::Code128,
        Self::Code39,
        Self::Code93,
        Self::Codabar,
        Self::Itf,
        Self::QrCode,
        Self::DataMatrix,
        Self::Pdf417,
        Self::Aztec,
    ];

    /// Набор, на который настраивается нативный детектор по умолчанию:
    /// розничные линейные коды плюс два самых частых 2D.
    pub const RETAIL: [Self; 8] = [
        Self::Ean13,
        Self::Ean8,
        Self::UpcA,
        Self::UpcE,
        Self::Code128,
        Self::Code39,
        Self::QrCode,
        Self::DataMatrix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ean13 => "ean_13",
            Self::Ean8 => "ean_8",
            Self::UpcA => "upc_a",
            Self::UpcE => "upc_e",
            Self::Code128 => "code_128",
            Self::Code39 => "code_39",
            Self::Code93 => "code_93",
            Self::Codabar => "codabar",
            Self::Itf => "itf",
            Self::QrCode => "qr_code",
            Self::DataMatrix => "data_matrix",
            Self::Pdf417 => "pdf417",
            Self::Aztec => "aztec",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown barcode format {0:?}")]
pub struct UnknownFormat(pub String);

impl FromStr for BarcodeFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Сырой результат декодера до нормализации.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDetection {
    pub raw_value: String,
    pub format: BarcodeFormat,
}

impl RawDetection {
    #[inline]
    pub fn new(raw_value: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            raw_value: raw_value.into(),
            format,
        }
    }

    /// Пропустить через нормализатор. Символика остаётся той, что сообщил декодер.
    pub fn normalize(&self, verify_check_digit: bool) -> Option<ScanResult> {
        normalize_with(&self.raw_value, verify_check_digit).map(|barcode| ScanResult {
            barcode,
            format: self.format,
        })
    }
}

/// Итог успешного сканирования: нормализованный код и символика.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub barcode: String,
    pub format: BarcodeFormat,
}

/// Первая детекция, прошедшая нормализацию.
pub fn first_normalized<'a>(
    hits: impl IntoIterator<Item = &'a RawDetection>,
    verify_check_digit: bool,
) -> Option<ScanResult> {
    hits.into_iter().find_map(|h| h.normalize(verify_check_digit))
}
