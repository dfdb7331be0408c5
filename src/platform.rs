// src/platform.rs
//
// Набор возможностей платформы, с которым работает сканер.
// Что не передано явно — заменяется встроенным (таймерные часы, PGM-хост).

use std::sync::Arc;

use crate::camera::MediaDevices;
use crate::config::ScannerConfig;
use crate::detect::{FrameClock, IntervalClock, NativeBarcodeApi};
use crate::still::{ImageHost, PgmImageHost};

#[derive(Clone)]
pub struct Platform {
    pub media: Arc<dyn MediaDevices>,
    pub barcode_api: Option<Arc<dyn NativeBarcodeApi>>,
    pub clock: Option<Arc<dyn FrameClock>>,
    pub images: Arc<dyn ImageHost>,
}

impl Platform {
    pub fn new(media: Arc<dyn MediaDevices>) -> Self {
        Self {
            media,
            barcode_api: None,
            clock: None,
            images: Arc::new(PgmImageHost::default()),
        }
    }

    pub fn with_barcode_api(mut self, api: Arc<dyn NativeBarcodeApi>) -> Self {
        self.barcode_api = Some(api);
        self
    }

    pub fn with_frame_clock(mut self, clock: Arc<dyn FrameClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_image_host(mut self, images: Arc<dyn ImageHost>) -> Self {
        self.images = images;
        self
    }

    pub(crate) fn frame_clock(&self, config: &ScannerConfig) -> Arc<dyn FrameClock> {
        match &self.clock {
            Some(clock) => Arc::clone(clock),
            None => Arc::new(IntervalClock::new(config.frame_interval())),
        }
    }
}
