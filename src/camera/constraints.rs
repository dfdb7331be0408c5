//! Ограничения запроса камеры и порядок их ослабления.

use crate::config::ScannerConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FacingMode {
    /// Задняя камера.
    Environment,
    /// Фронтальная камера.
    User,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Requirement<T> {
    Exact(T),
    Ideal(T),
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MediaConstraints {
    pub facing_mode: Option<Requirement<FacingMode>>,
    pub width: Option<Requirement<u32>>,
    pub height: Option<Requirement<u32>>,
}

impl MediaConstraints {
    /// `video: true` — любая камера.
    pub fn any_camera() -> Self {
        Self::default()
    }

    pub fn back_camera(facing: Requirement<FacingMode>, width: u32, height: u32) -> Self {
        Self {
            facing_mode: Some(facing),
            width: Some(Requirement::Ideal(width)),
            height: Some(Requirement::Ideal(height)),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.facing_mode.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Строго задняя → желательно задняя → любая.
pub fn fallback_chain(config: &ScannerConfig) -> [MediaConstraints; 3] {
    let (w, h) = (config.ideal_width, config.ideal_height);
    [
        MediaConstraints::back_camera(Requirement::Exact(FacingMode::Environment), w, h),
        MediaConstraints::back_camera(Requirement::Ideal(FacingMode::Environment), w, h),
        MediaConstraints::any_camera(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_relaxes_towards_any_camera() {
        let chain = fallback_chain(&ScannerConfig::default());
        assert_eq!(
            chain[0].facing_mode,
            Some(Requirement::Exact(FacingMode::Environment))
        );
        assert_eq!(
            chain[1].facing_mode,
            Some(Requirement::Ideal(FacingMode::Environment))
        );
        assert_eq!(chain[1].width, Some(Requirement::Ideal(1280)));
        assert!(chain[2].is_unconstrained());
    }
}
