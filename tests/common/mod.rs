// tests/common/mod.rs
//
// Фейковая платформа для интеграционных тестов: устройства со сценарием ответов,
// треки, которые помнят, остановлены ли они, синк с управляемой готовностью
// и детектор со счётчиком вызовов.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ultrascan::one_d::code128::CodeSet;
use ultrascan::prelude::*;

pub struct FakeTrack {
    pub label: String,
    pub torch: bool,
    pub fail_torch: bool,
    stopped: AtomicBool,
    applied: Mutex<Vec<bool>>,
}

impl FakeTrack {
    pub fn new(label: impl Into<String>, torch: bool) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            torch,
            fail_torch: false,
            stopped: AtomicBool::new(false),
            applied: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_torch(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            torch: true,
            fail_torch: true,
            stopped: AtomicBool::new(false),
            applied: Mutex::new(Vec::new()),
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn applied(&self) -> Vec<bool> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoTrack for FakeTrack {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities { torch: self.torch }
    }

    async fn apply_torch(&self, on: bool) -> Result<(), CaptureError> {
        if self.fail_torch {
            return Err(CaptureError::Other("torch constraint rejected".into()));
        }
        self.applied.lock().unwrap().push(on);
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

pub struct FakeStream {
    pub tracks: Vec<Arc<FakeTrack>>,
}

impl FakeStream {
    pub fn with_track(track: Arc<FakeTrack>) -> Arc<dyn MediaStream> {
        Arc::new(Self {
            tracks: vec![track],
        })
    }
}

impl MediaStream for FakeStream {
    fn video_tracks(&self) -> Vec<Arc<dyn VideoTrack>> {
        self.tracks
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn VideoTrack>)
            .collect()
    }
}

/// Ответ устройства на очередной запрос камеры.
pub enum Grant {
    Camera { torch: bool },
    Fail(CaptureError),
}

pub struct FakeDevices {
    pub secure: bool,
    pub capture_api: bool,
    script: Mutex<VecDeque<Grant>>,
    requests: Mutex<Vec<MediaConstraints>>,
    issued: Mutex<Vec<Arc<FakeTrack>>>,
}

impl FakeDevices {
    /// Без сценария каждый запрос выдаёт камеру без фонарика.
    pub fn new() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    pub fn scripted(script: Vec<Grant>) -> Arc<Self> {
        Arc::new(Self {
            secure: true,
            capture_api: true,
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
        })
    }

    pub fn insecure() -> Arc<Self> {
        Arc::new(Self {
            secure: false,
            capture_api: true,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
        })
    }

    pub fn without_capture_api() -> Arc<Self> {
        Arc::new(Self {
            secure: true,
            capture_api: false,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.requests.lock().unwrap().clone()
    }

    pub fn issued(&self) -> Vec<Arc<FakeTrack>> {
        self.issued.lock().unwrap().clone()
    }

    pub fn live_tracks(&self) -> usize {
        self.issued().iter().filter(|t| !t.is_stopped()).count()
    }
}

#[async_trait]
impl MediaDevices for FakeDevices {
    fn is_secure_context(&self) -> bool {
        self.secure
    }

    fn has_capture_api(&self) -> bool {
        self.capture_api
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, CaptureError> {
        self.requests.lock().unwrap().push(constraints.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next.unwrap_or(Grant::Camera { torch: false }) {
            Grant::Camera { torch } => {
                let n = self.issued.lock().unwrap().len();
                let track = FakeTrack::new(format!("camera {n}"), torch);
                self.issued.lock().unwrap().push(Arc::clone(&track));
                Ok(FakeStream::with_track(track))
            }
            Grant::Fail(err) => Err(err),
        }
    }
}

pub struct FakeSink {
    frame: Mutex<Option<LumaImage>>,
    attached: Mutex<Option<Arc<dyn MediaStream>>>,
    /// Сколько первых `ready` завершатся ошибкой.
    fail_ready: AtomicUsize,
    never_ready: bool,
    pub attaches: AtomicUsize,
}

impl FakeSink {
    pub fn new(frame: Option<LumaImage>) -> Arc<Self> {
        Self::build(frame, 0, false)
    }

    pub fn failing_ready(times: usize) -> Arc<Self> {
        Self::build(None, times, false)
    }

    pub fn never_ready() -> Arc<Self> {
        Self::build(None, 0, true)
    }

    fn build(frame: Option<LumaImage>, fail_ready: usize, never_ready: bool) -> Arc<Self> {
        Arc::new(Self {
            frame: Mutex::new(frame),
            attached: Mutex::new(None),
            fail_ready: AtomicUsize::new(fail_ready),
            never_ready,
            attaches: AtomicUsize::new(0),
        })
    }

    pub fn is_attached(&self) -> bool {
        self.attached.lock().unwrap().is_some()
    }

    pub fn show(&self, frame: LumaImage) {
        *self.frame.lock().unwrap() = Some(frame);
    }
}

#[async_trait]
impl VideoSink for FakeSink {
    fn attach(&self, stream: Arc<dyn MediaStream>) {
        self.attaches.fetch_add(1, Ordering::SeqCst);
        *self.attached.lock().unwrap() = Some(stream);
    }

    fn detach(&self) {
        *self.attached.lock().unwrap() = None;
    }

    async fn ready(&self) -> Result<(), CaptureError> {
        if self.never_ready {
            std::future::pending::<()>().await;
        }
        let left = self.fail_ready.load(Ordering::SeqCst);
        if left > 0 {
            self.fail_ready.store(left - 1, Ordering::SeqCst);
            return Err(CaptureError::NotReadable("metadata never loaded".into()));
        }
        Ok(())
    }

    async fn play(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn current_frame(&self) -> Option<LumaImage> {
        self.frame.lock().unwrap().clone()
    }
}

/// Детектор: первые `hit_on - 1` вызовов — промахи (ошибка или шум), дальше — `hit`.
pub struct FakeDetector {
    calls: AtomicUsize,
    hit_on: usize,
    hit: RawDetection,
    delay: Option<Duration>,
}

impl FakeDetector {
    pub fn new(hit_on: usize, hit: RawDetection) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            hit_on,
            hit,
            delay: None,
        })
    }

    pub fn slow(hit: RawDetection, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            hit_on: 1,
            hit,
            delay: Some(delay),
        })
    }

    /// Никогда ничего не находит.
    pub fn blind() -> Arc<Self> {
        Self::new(usize::MAX, RawDetection::new("", BarcodeFormat::Ean13))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NativeDetector for FakeDetector {
    async fn detect(&self, _image: &LumaImage) -> Result<Vec<RawDetection>, DetectError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if n >= self.hit_on {
            return Ok(vec![self.hit.clone()]);
        }
        if n % 2 == 1 {
            Err(DetectError("transient miss".into()))
        } else {
            // частичное чтение: слишком мало цифр
            Ok(vec![RawDetection::new("12345", BarcodeFormat::Code128)])
        }
    }
}

pub struct FakeBarcodeApi {
    pub detector: Arc<FakeDetector>,
    pub supported: Vec<BarcodeFormat>,
    pub requested: Mutex<Vec<BarcodeFormat>>,
}

impl FakeBarcodeApi {
    pub fn new(detector: Arc<FakeDetector>) -> Arc<Self> {
        Arc::new(Self {
            detector,
            supported: BarcodeFormat::ALL.to_vec(),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn supporting(detector: Arc<FakeDetector>, supported: Vec<BarcodeFormat>) -> Arc<Self> {
        Arc::new(Self {
            detector,
            supported,
            requested: Mutex::new(Vec::new()),
        })
    }
}

impl NativeBarcodeApi for FakeBarcodeApi {
    fn supported_formats(&self) -> Vec<BarcodeFormat> {
        self.supported.clone()
    }

    fn create_detector(
        &self,
        formats: &[BarcodeFormat],
    ) -> Result<Arc<dyn NativeDetector>, DetectError> {
        *self.requested.lock().unwrap() = formats.to_vec();
        Ok(Arc::clone(&self.detector) as Arc<dyn NativeDetector>)
    }
}

/// Кадр с синтетическим EAN-13/UPC-A.
pub fn barcode_frame(digits: &str) -> LumaImage {
    let row = ultrascan::one_d::ean13::synthesize_row(digits, 2).expect("12 or 13 digits");
    LumaImage::from_row(&row, 24)
}

/// Кадр с синтетическим Code 128 в наборе C (чётное число цифр, GS = FNC1).
pub fn code128_frame(text: &str) -> LumaImage {
    let row = ultrascan::one_d::code128::synthesize_row(text, CodeSet::C, 2).expect("set C text");
    LumaImage::from_row(&row, 24)
}

/// Буфер короче, чем обещают размеры.
pub fn torn_frame() -> LumaImage {
    LumaImage {
        data: vec![255; 10],
        width: 100,
        height: 10,
    }
}

pub fn blank_frame() -> LumaImage {
    LumaImage {
        data: vec![255; 64 * 64],
        width: 64,
        height: 64,
    }
}
