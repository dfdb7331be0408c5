//! `use ultrascan::prelude::*;` — всё, что нужно для подключения платформы и сканирования.

pub use crate::camera::{
    CaptureError, FacingMode, MediaConstraints, MediaDevices, MediaStream, Requirement,
    TrackCapabilities, VideoSink, VideoTrack,
};
pub use crate::config::ScannerConfig;
pub use crate::detect::{
    DetectError, FrameClock, IntervalClock, NativeBarcodeApi, NativeDetector, StrategyKind,
};
pub use crate::error::{ScanError, ScanErrorKind};
pub use crate::image::{GrayImage, LumaImage};
pub use crate::normalize::{normalize, normalize_with};
pub use crate::platform::Platform;
pub use crate::scanner::{ScanHandle, Scanner};
pub use crate::still::{ImageHost, ImageLoadError, ImageSource, PgmImageHost};
pub use crate::symbology::{BarcodeFormat, RawDetection, ScanResult};
