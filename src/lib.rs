#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Публичные модули
pub mod camera;     // сессия камеры: захват, фоллбэк ограничений, фонарик
pub mod config;     // ScannerConfig
pub mod detect;     // выбор стратегии: нативный детектор или программный ридер
pub mod error;      // ScanError и классификация ошибок платформы
pub mod image;      // GrayImage/LumaImage, PGM
pub mod normalize;  // сырые строки → розничный код
pub mod platform;   // набор возможностей платформы
pub mod prelude;    // удобные re-export'ы
pub mod scanner;    // верхний уровень
pub mod still;      // статичные изображения
pub mod symbology;  // BarcodeFormat, RawDetection, ScanResult

pub mod binarize;   // бинаризация строки для 1D
pub mod one_d;      // встроенный декодер EAN-13/UPC-A и Code 128

pub use crate::config::ScannerConfig;
pub use crate::error::{ScanError, ScanErrorKind};
pub use crate::image::{GrayImage, LumaImage};
pub use crate::normalize::normalize;
pub use crate::platform::Platform;
pub use crate::scanner::{ScanHandle, Scanner};
pub use crate::symbology::{BarcodeFormat, RawDetection, ScanResult};
