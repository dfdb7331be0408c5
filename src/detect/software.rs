//! Программный фоллбэк: встроенный ридер EAN-13/UPC-A и Code 128 по таймеру.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::detect::{FrameDecoder, StrategyKind};
use crate::image::LumaImage;
use crate::one_d::{decode_rows, DecodeOptions};
use crate::symbology::RawDetection;

pub struct SoftwareStrategy {
    ticker: Interval,
    opts: DecodeOptions,
}

impl SoftwareStrategy {
    /// Должен создаваться внутри рантайма tokio (таймер).
    pub fn new(period: Duration, opts: DecodeOptions) -> Self {
        let mut ticker = interval(period);
        // пропущенные тики не догоняем пачкой
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker, opts }
    }
}

#[async_trait]
impl FrameDecoder for SoftwareStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Software
    }

    async fn wait_next(&mut self) {
        self.ticker.tick().await;
    }

    async fn decode(&mut self, frame: &LumaImage) -> Vec<RawDetection> {
        decode_rows(&frame.as_gray(), &self.opts)
    }
}
