//! Настройки сканера. Все поля с дефолтами: частичный конфиг тоже валиден.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::one_d::DecodeOptions;
use crate::symbology::BarcodeFormat;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Сколько ждать готовности видео после привязки потока.
    pub metadata_timeout_ms: u64,
    /// Период опроса программного декодера.
    pub poll_interval_ms: u64,
    /// Период кадров для часов по умолчанию (если платформа не дала свои).
    pub frame_interval_ms: u64,
    /// Желаемое разрешение для первых двух попыток захвата.
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// Символики для нативного детектора.
    pub formats: Vec<BarcodeFormat>,
    /// Отклонять коды с неверной контрольной цифрой GS1.
    pub verify_check_digit: bool,
    pub decode: DecodeOptions,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            metadata_timeout_ms: 5_000,
            poll_interval_ms: 100,
            frame_interval_ms: 16,
            ideal_width: 1280,
            ideal_height: 720,
            formats: BarcodeFormat::RETAIL.to_vec(),
            verify_check_digit: false,
            decode: DecodeOptions::default(),
        }
    }
}

impl ScannerConfig {
    #[inline]
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    /// Никогда не меньше 1 мс: нулевой период превратил бы опрос в busy-loop.
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}
