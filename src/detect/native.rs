//! Нативный детектор платформы: один запрос детекции на кадр дисплея.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::trace;

use crate::detect::{FrameDecoder, StrategyKind};
use crate::image::LumaImage;
use crate::symbology::{BarcodeFormat, RawDetection};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("barcode detection failed: {0}")]
pub struct DetectError(pub String);

/// Фабрика детекторов, если платформа их предоставляет.
pub trait NativeBarcodeApi: Send + Sync {
    /// Какие символики платформа умеет распознавать.
    fn supported_formats(&self) -> Vec<BarcodeFormat> {
        BarcodeFormat::ALL.to_vec()
    }

    fn create_detector(&self, formats: &[BarcodeFormat]) -> Result<Arc<dyn NativeDetector>, DetectError>;
}

#[async_trait]
pub trait NativeDetector: Send + Sync {
    async fn detect(&self, image: &LumaImage) -> Result<Vec<RawDetection>, DetectError>;
}

/// Часы перерисовки: `next_frame` завершается не чаще одного раза за кадр дисплея.
#[async_trait]
pub trait FrameClock: Send + Sync {
    async fn next_frame(&self);
}

/// Часы по таймеру, когда платформа не дала своих.
#[derive(Clone, Copy, Debug)]
pub struct IntervalClock {
    period: Duration,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for IntervalClock {
    /// ~60 Гц.
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&self) {
        tokio::time::sleep(self.period).await;
    }
}

pub struct NativeStrategy {
    detector: Arc<dyn NativeDetector>,
    clock: Arc<dyn FrameClock>,
}

impl NativeStrategy {
    pub fn new(detector: Arc<dyn NativeDetector>, clock: Arc<dyn FrameClock>) -> Self {
        Self { detector, clock }
    }
}

#[async_trait]
impl FrameDecoder for NativeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    async fn wait_next(&mut self) {
        self.clock.next_frame().await;
    }

    async fn decode(&mut self, frame: &LumaImage) -> Vec<RawDetection> {
        match self.detector.detect(frame).await {
            Ok(hits) => hits,
            Err(err) => {
                trace!(%err, "native detection miss");
                Vec::new()
            }
        }
    }
}
