//! Выбор стратегии декодирования. Решение принимается один раз на сессию.

pub mod native;
pub mod software;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ScannerConfig;
use crate::image::LumaImage;
use crate::platform::Platform;
use crate::symbology::RawDetection;

pub use native::{DetectError, FrameClock, IntervalClock, NativeBarcodeApi, NativeDetector, NativeStrategy};
pub use software::SoftwareStrategy;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Native,
    Software,
}

/// Источник сырых детекций для цикла декодирования.
#[async_trait]
pub trait FrameDecoder: Send {
    fn kind(&self) -> StrategyKind;

    /// Дождаться момента следующей попытки (кадр дисплея или тик опроса).
    async fn wait_next(&mut self);

    /// Одна попытка на кадре. Ошибки попытки — просто пустой результат.
    async fn decode(&mut self, frame: &LumaImage) -> Vec<RawDetection>;
}

/// Нативный детектор на пересечение настроенных и поддерживаемых символик.
pub fn native_detector(platform: &Platform, config: &ScannerConfig) -> Option<Arc<dyn NativeDetector>> {
    let api = platform.barcode_api.as_ref()?;
    let supported = api.supported_formats();
    let formats: Vec<_> = config
        .formats
        .iter()
        .copied()
        .filter(|f| supported.contains(f))
        .collect();
    if formats.is_empty() {
        debug!("native detector supports none of the configured formats");
        return None;
    }
    match api.create_detector(&formats) {
        Ok(detector) => Some(detector),
        Err(err) => {
            warn!(%err, "native detector unavailable, using software decoder");
            None
        }
    }
}

pub fn select_strategy(platform: &Platform, config: &ScannerConfig) -> Box<dyn FrameDecoder> {
    let strategy: Box<dyn FrameDecoder> = match native_detector(platform, config) {
        Some(detector) => Box::new(NativeStrategy::new(detector, platform.frame_clock(config))),
        None => Box::new(SoftwareStrategy::new(
            config.poll_interval(),
            config.decode.clone(),
        )),
    };
    debug!(strategy = ?strategy.kind(), "decode strategy selected");
    strategy
}
