//! Распознавание статичного изображения: сначала нативный детектор,
//! потом встроенный ридер; оба пути через нормализатор.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::ScannerConfig;
use crate::detect::NativeDetector;
use crate::error::ScanError;
use crate::image::{LumaImage, PgmError};
use crate::one_d::decode_rows;
use crate::symbology::{first_normalized, ScanResult};

pub enum ImageSource {
    /// Уже декодированный кадр.
    Frame(LumaImage),
    /// Закодированный файл; загружается через [`ImageHost`].
    Encoded(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("no image registered at {0}")]
    Missing(String),
    #[error(transparent)]
    Pgm(#[from] PgmError),
    #[error("{0}")]
    Other(String),
}

/// Загрузка изображений через временные URL (аналог object URL).
/// Каждый созданный URL должен быть отозван.
#[async_trait]
pub trait ImageHost: Send + Sync {
    fn create_object_url(&self, bytes: Vec<u8>) -> String;

    fn revoke_object_url(&self, url: &str);

    async fn load(&self, url: &str) -> Result<LumaImage, ImageLoadError>;
}

/// Временный URL, отзываемый при выходе из области видимости на любом пути.
struct ObjectUrl<'a> {
    host: &'a dyn ImageHost,
    url: String,
}

impl<'a> ObjectUrl<'a> {
    fn create(host: &'a dyn ImageHost, bytes: Vec<u8>) -> Self {
        let url = host.create_object_url(bytes);
        Self { host, url }
    }
}

impl Drop for ObjectUrl<'_> {
    fn drop(&mut self) {
        self.host.revoke_object_url(&self.url);
    }
}

/// Встроенный хост: хранит байты в памяти и понимает бинарный PGM.
#[derive(Default)]
pub struct PgmImageHost {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    next_id: AtomicU64,
}

impl PgmImageHost {
    /// Сколько URL ещё не отозвано.
    pub fn live_urls(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ImageHost for PgmImageHost {
    fn create_object_url(&self, bytes: Vec<u8>) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:ultrascan/{id}");
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(url.clone(), bytes);
        }
        url
    }

    fn revoke_object_url(&self, url: &str) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.remove(url);
        }
    }

    async fn load(&self, url: &str) -> Result<LumaImage, ImageLoadError> {
        let bytes = {
            let blobs = self
                .blobs
                .lock()
                .map_err(|e| ImageLoadError::Other(e.to_string()))?;
            blobs
                .get(url)
                .cloned()
                .ok_or_else(|| ImageLoadError::Missing(url.to_string()))?
        };
        Ok(LumaImage::from_pgm(&bytes)?)
    }
}

/// Распознать код на изображении.
pub async fn scan_image(
    source: ImageSource,
    host: &dyn ImageHost,
    native: Option<&dyn NativeDetector>,
    config: &ScannerConfig,
) -> Result<ScanResult, ScanError> {
    let frame = match source {
        ImageSource::Frame(frame) => frame,
        ImageSource::Encoded(bytes) => {
            let url = ObjectUrl::create(host, bytes);
            let loaded = host.load(&url.url).await;
            loaded.map_err(ScanError::unreadable_image)?
        }
    };
    if !frame.is_consistent() {
        return Err(ScanError::unreadable_image(format_args!(
            "{}x{} frame with {} bytes",
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    if let Some(detector) = native {
        match detector.detect(&frame).await {
            Ok(hits) => {
                if let Some(result) = first_normalized(&hits, config.verify_check_digit) {
                    return Ok(result);
                }
            }
            Err(err) => debug!(%err, "native image detection failed, trying software decoder"),
        }
    }

    let hits = decode_rows(&frame.as_gray(), &config.decode);
    first_normalized(&hits, config.verify_check_digit).ok_or(ScanError::NoBarcodeInImage)
}
