//! Жизненный цикл камеры: захват с ослаблением ограничений, привязка к синку,
//! фонарик, освобождение.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::camera::constraints::{fallback_chain, MediaConstraints};
use crate::camera::device::{CaptureError, MediaDevices, MediaStream, VideoSink, VideoTrack};
use crate::config::ScannerConfig;

/// Живая сессия. Существует от успешного старта до `stop_scanning`.
struct CameraSession {
    stream: Arc<dyn MediaStream>,
    /// Первый видеотрек потока — через него управляем фонариком.
    track: Option<Arc<dyn VideoTrack>>,
    sink: Arc<dyn VideoSink>,
    torch_on: bool,
    /// Флаг активности; отменяется при остановке.
    active: CancellationToken,
}

pub struct CameraManager {
    devices: Arc<dyn MediaDevices>,
    chain: [MediaConstraints; 3],
    metadata_timeout: Duration,
    session: Option<CameraSession>,
}

impl CameraManager {
    pub fn new(devices: Arc<dyn MediaDevices>, config: &ScannerConfig) -> Self {
        Self {
            devices,
            chain: fallback_chain(config),
            metadata_timeout: config.metadata_timeout(),
            session: None,
        }
    }

    /// Запустить камеру на `sink`. Готовый поток (`existing`) принимается как есть,
    /// без повторного запроса разрешения. Предыдущая сессия останавливается.
    pub async fn start_scanning(
        &mut self,
        sink: Arc<dyn VideoSink>,
        existing: Option<Arc<dyn MediaStream>>,
    ) -> Result<(), CaptureError> {
        self.stop_scanning();

        let stream = match existing {
            Some(stream) => {
                debug!("adopting pre-authorized stream");
                self.bind(&sink, stream).await?
            }
            None => self.acquire(&sink).await?,
        };
        let track = stream.video_tracks().into_iter().next();
        let label = track.as_ref().map(|t| t.label()).unwrap_or_default();
        info!(track = %label, "camera session started");
        self.session = Some(CameraSession {
            stream,
            track,
            sink,
            torch_on: false,
            active: CancellationToken::new(),
        });
        Ok(())
    }

    /// Остановить все треки и забыть сессию. Повторный вызов ничего не делает.
    pub fn stop_scanning(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.active.cancel();
        session.stream.stop_all();
        session.sink.detach();
        info!("camera session stopped");
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Токен активности текущей сессии; отменяется в `stop_scanning`.
    pub fn active_token(&self) -> Option<CancellationToken> {
        self.session.as_ref().map(|s| s.active.clone())
    }

    pub fn is_torch_supported(&self) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.track.as_ref())
            .is_some_and(|t| t.capabilities().torch)
    }

    /// Переключить фонарик. Без сессии или без поддержки — `false`.
    /// Если платформа отказала, состояние не меняется и возвращается прежнее.
    pub async fn toggle_torch(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(track) = session.track.clone() else {
            return false;
        };
        if !track.capabilities().torch {
            return false;
        }
        let next = !session.torch_on;
        match track.apply_torch(next).await {
            Ok(()) => {
                session.torch_on = next;
                debug!(torch = next, "torch toggled");
            }
            Err(err) => warn!(%err, "failed to apply torch constraint"),
        }
        session.torch_on
    }

    async fn acquire(&self, sink: &Arc<dyn VideoSink>) -> Result<Arc<dyn MediaStream>, CaptureError> {
        if !self.devices.is_secure_context() {
            return Err(CaptureError::InsecureContext);
        }
        if !self.devices.has_capture_api() {
            return Err(CaptureError::NotSupported(
                "media capture API is unavailable".to_string(),
            ));
        }

        let mut last_err = None;
        for (attempt, constraints) in self.chain.iter().enumerate() {
            debug!(attempt, ?constraints, "requesting camera");
            let stream = match self.devices.get_user_media(constraints).await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(attempt, %err, "camera request failed");
                    last_err = Some(err);
                    continue;
                }
            };
            match self.bind(sink, stream).await {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    warn!(attempt, %err, "camera stream could not start");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| CaptureError::NotFound("no camera".to_string())))
    }

    /// Привязать поток к синку, дождаться метаданных и запустить воспроизведение.
    /// При ошибке поток останавливается, синк отвязывается.
    async fn bind(
        &self,
        sink: &Arc<dyn VideoSink>,
        stream: Arc<dyn MediaStream>,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        sink.attach(Arc::clone(&stream));
        let started = async {
            timeout(self.metadata_timeout, sink.ready())
                .await
                .map_err(|_| CaptureError::Timeout(self.metadata_timeout))??;
            sink.play().await
        }
        .await;

        if let Err(err) = started {
            stream.stop_all();
            sink.detach();
            return Err(err);
        }
        Ok(stream)
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.stop_scanning();
    }
}
