// src/error.rs
//
// Ошибки уровня сканера. Всё, что пришло от платформы, классифицируется
// здесь в один из четырёх видов; наружу другие типы не уходят.

use serde::Serialize;
use thiserror::Error;

use crate::camera::CaptureError;

pub const PERMISSION_MESSAGE: &str =
    "Camera access was denied. Allow camera access or enter the barcode manually.";
pub const NOT_FOUND_MESSAGE: &str = "No camera was found on this device.";
pub const NOT_SUPPORTED_MESSAGE: &str =
    "Camera access is not supported here. A secure (HTTPS) context is required.";
pub const NO_BARCODE_IN_IMAGE_MESSAGE: &str = "No barcode detected in image.";

/// Вид ошибки — то, что видит вызывающий код при ветвлении.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanErrorKind {
    Permission,
    NotSupported,
    NotFound,
    Unknown,
    /// Только для статичных изображений.
    NoBarcodeInImage,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("{0}")]
    Permission(String),
    #[error("{0}")]
    NotSupported(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unknown(String),
    #[error("{}", NO_BARCODE_IN_IMAGE_MESSAGE)]
    NoBarcodeInImage,
}

impl ScanError {
    pub fn permission() -> Self {
        Self::Permission(PERMISSION_MESSAGE.to_string())
    }

    pub fn not_found() -> Self {
        Self::NotFound(NOT_FOUND_MESSAGE.to_string())
    }

    pub fn not_supported() -> Self {
        Self::NotSupported(NOT_SUPPORTED_MESSAGE.to_string())
    }

    pub fn unknown(detail: impl std::fmt::Display) -> Self {
        Self::Unknown(format!("Failed to start the camera: {detail}"))
    }

    pub fn unreadable_image(detail: impl std::fmt::Display) -> Self {
        Self::Unknown(format!("Failed to read image: {detail}"))
    }

    pub fn kind(&self) -> ScanErrorKind {
        match self {
            Self::Permission(_) => ScanErrorKind::Permission,
            Self::NotSupported(_) => ScanErrorKind::NotSupported,
            Self::NotFound(_) => ScanErrorKind::NotFound,
            Self::Unknown(_) => ScanErrorKind::Unknown,
            Self::NoBarcodeInImage => ScanErrorKind::NoBarcodeInImage,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Стоит ли предлагать ручной ввод вместо повторной попытки.
    pub fn suggests_manual_entry(&self) -> bool {
        matches!(self, Self::Permission(_) | Self::NotFound(_))
    }
}

impl From<CaptureError> for ScanError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NotAllowed(_) | CaptureError::Security(_) => Self::permission(),
            CaptureError::NotFound(_) => Self::not_found(),
            CaptureError::NotSupported(_) | CaptureError::InsecureContext => Self::not_supported(),
            other => Self::unknown(other),
        }
    }
}
