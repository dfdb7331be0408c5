//! Точки подключения платформы: захват медиа, поток, видеотрек, видеосинк.
//!
//! Реализации живут снаружи (браузерная привязка, нативный бэкенд, фейки в тестах).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::camera::constraints::MediaConstraints;
use crate::image::LumaImage;

/// Ошибки платформы. Имена повторяют стандартные ошибки захвата медиа.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    NotAllowed(String),
    #[error("security error: {0}")]
    Security(String),
    #[error("no matching camera: {0}")]
    NotFound(String),
    #[error("camera is unavailable: {0}")]
    NotReadable(String),
    #[error("constraint {0:?} cannot be satisfied")]
    Overconstrained(String),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("media capture requires a secure context")]
    InsecureContext,
    #[error("video was not ready after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Other(String),
}

/// Что умеет трек. Пока интересен только фонарик.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackCapabilities {
    pub torch: bool,
}

/// Доступ к камерам устройства.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Защищённый контекст (HTTPS или localhost).
    fn is_secure_context(&self) -> bool;

    /// Есть ли вообще API захвата.
    fn has_capture_api(&self) -> bool;

    /// Запросить видеопоток. Может показать пользователю запрос разрешения.
    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError>;
}

pub trait MediaStream: Send + Sync {
    fn video_tracks(&self) -> Vec<Arc<dyn VideoTrack>>;

    /// Остановить все треки потока. Не ждёт фактического освобождения устройства.
    fn stop_all(&self) {
        for track in self.video_tracks() {
            track.stop();
        }
    }
}

#[async_trait]
pub trait VideoTrack: Send + Sync {
    fn label(&self) -> String {
        String::new()
    }

    fn capabilities(&self) -> TrackCapabilities;

    async fn apply_torch(&self, on: bool) -> Result<(), CaptureError>;

    fn stop(&self);
}

/// Поверхность, на которую выводится видео и с которой берутся кадры.
/// Принадлежит вызывающему коду; сессия только привязывает к ней поток.
#[async_trait]
pub trait VideoSink: Send + Sync {
    fn attach(&self, stream: Arc<dyn MediaStream>);

    fn detach(&self);

    /// Завершается, когда метаданные видео загружены.
    async fn ready(&self) -> Result<(), CaptureError>;

    async fn play(&self) -> Result<(), CaptureError>;

    /// Текущий кадр в градациях серого; `None`, пока кадров нет.
    fn current_frame(&self) -> Option<LumaImage>;
}
