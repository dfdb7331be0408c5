// src/scanner.rs
//
// Верхний уровень: сессия камеры + выбранная стратегия + цикл декодирования.
// Один сканер — одна живая сессия; результат сессии приходит одним сообщением.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::camera::{CameraManager, MediaStream, VideoSink};
use crate::config::ScannerConfig;
use crate::detect::{native_detector, select_strategy, FrameDecoder, StrategyKind};
use crate::error::ScanError;
use crate::platform::Platform;
use crate::still::{self, ImageSource};
use crate::symbology::{first_normalized, ScanResult};

/// Ожидание результата одной сессии.
pub struct ScanHandle {
    rx: oneshot::Receiver<ScanResult>,
    strategy: StrategyKind,
}

impl ScanHandle {
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Первый распознанный код; `None`, если сессию остановили раньше.
    pub async fn detected(self) -> Option<ScanResult> {
        self.rx.await.ok()
    }

    /// Неблокирующая проверка.
    pub fn try_detected(&mut self) -> Option<ScanResult> {
        self.rx.try_recv().ok()
    }
}

pub struct Scanner {
    platform: Platform,
    config: ScannerConfig,
    camera: CameraManager,
    task: Option<JoinHandle<()>>,
}

impl Scanner {
    pub fn new(platform: Platform, config: ScannerConfig) -> Self {
        let camera = CameraManager::new(Arc::clone(&platform.media), &config);
        Self {
            platform,
            config,
            camera,
            task: None,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Запустить камеру и цикл декодирования. Должен вызываться внутри рантайма tokio.
    ///
    /// Ошибки захвата классифицируются и возвращаются здесь; после старта
    /// ошибок больше нет — только результат или остановка.
    pub async fn start_scanning(
        &mut self,
        sink: Arc<dyn VideoSink>,
        existing: Option<Arc<dyn MediaStream>>,
    ) -> Result<ScanHandle, ScanError> {
        self.stop_scanning();

        if let Err(err) = self.camera.start_scanning(Arc::clone(&sink), existing).await {
            let err = ScanError::from(err);
            warn!(kind = ?err.kind(), %err, "scan could not start");
            return Err(err);
        }
        let active = self
            .camera
            .active_token()
            .ok_or_else(|| ScanError::unknown("camera session ended during start"))?;

        let decoder = select_strategy(&self.platform, &self.config);
        let strategy = decoder.kind();
        let (tx, rx) = oneshot::channel();
        self.task = Some(tokio::spawn(decode_loop(
            decoder,
            sink,
            active,
            tx,
            self.config.verify_check_digit,
        )));
        Ok(ScanHandle { rx, strategy })
    }

    /// Остановить сессию. Идемпотентно. Детекция, идущая в этот момент,
    /// доработает, но её результат будет отброшен.
    pub fn stop_scanning(&mut self) {
        self.camera.stop_scanning();
        self.task = None;
    }

    pub fn is_scanning(&self) -> bool {
        self.camera.is_active() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn toggle_torch(&mut self) -> bool {
        self.camera.toggle_torch().await
    }

    pub fn is_torch_supported(&self) -> bool {
        self.camera.is_torch_supported()
    }

    /// Распознать статичное изображение; камера не нужна.
    pub async fn scan_image(&self, source: ImageSource) -> Result<ScanResult, ScanError> {
        let native = native_detector(&self.platform, &self.config);
        still::scan_image(
            source,
            self.platform.images.as_ref(),
            native.as_deref(),
            &self.config,
        )
        .await
    }
}

/// Цикл: тик стратегии → кадр → детекция → нормализация.
/// Флаг активности проверяется перед каждым тиком и после каждой детекции.
async fn decode_loop(
    mut decoder: Box<dyn FrameDecoder>,
    sink: Arc<dyn VideoSink>,
    active: CancellationToken,
    tx: oneshot::Sender<ScanResult>,
    verify_check_digit: bool,
) {
    let mut attempts = 0u64;
    loop {
        tokio::select! {
            biased;
            () = active.cancelled() => break,
            () = decoder.wait_next() => {}
        }
        let Some(frame) = sink.current_frame() else {
            continue;
        };
        if !frame.is_consistent() {
            trace!(
                width = frame.width,
                height = frame.height,
                len = frame.data.len(),
                "skipping malformed frame"
            );
            continue;
        }
        attempts += 1;
        let hits = decoder.decode(&frame).await;
        if active.is_cancelled() {
            break;
        }
        if let Some(result) = first_normalized(&hits, verify_check_digit) {
            info!(barcode = %result.barcode, format = %result.format, attempts, "barcode detected");
            let _ = tx.send(result);
            return;
        }
    }
    debug!(attempts, "decode loop stopped");
}
