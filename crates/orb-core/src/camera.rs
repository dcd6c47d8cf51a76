//! Orthographic viewport: the visible world rectangle and its mapping to
//! screen pixels.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// How a base world area is fitted onto a screen of a different aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMode {
    /// The whole base area stays visible; the longer screen axis shows extra world.
    #[default]
    FitToScreen,
    /// The base area covers the whole screen; the shorter axis is cropped.
    FillScreen,
    /// The base area is stretched to the screen, ignoring aspect.
    Stretch,
}

/// Visible world rectangle centred on `center`, drawn onto a screen whose
/// origin is the top-left corner with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Viewport {
    /// A viewport showing exactly `width × height` world units on a screen
    /// of the same size in pixels.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            width,
            height,
            screen_width: width,
            screen_height: height,
        }
    }

    /// Fits a `base_width × base_height` world area to a screen.
    pub fn fit(base_width: f32, base_height: f32, screen_width: f32, screen_height: f32, mode: FitMode) -> Self {
        let base_aspect = base_width / base_height;
        let screen_aspect = screen_width / screen_height;
        let (width, height) = match mode {
            FitMode::Stretch => (base_width, base_height),
            FitMode::FitToScreen if screen_aspect > base_aspect => (base_height * screen_aspect, base_height),
            FitMode::FitToScreen => (base_width, base_width / screen_aspect),
            FitMode::FillScreen if screen_aspect > base_aspect => (base_width, base_width / screen_aspect),
            FitMode::FillScreen => (base_height * screen_aspect, base_height),
        };
        Self {
            center: Vec2::ZERO,
            width,
            height,
            screen_width,
            screen_height,
        }
    }

    /// Screen pixel to world point.
    pub fn unproject(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            self.center.x + (screen.x / self.screen_width - 0.5) * self.width,
            self.center.y + (0.5 - screen.y / self.screen_height) * self.height,
        )
    }

    /// World point to screen pixel.
    pub fn project(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            ((world.x - self.center.x) / self.width + 0.5) * self.screen_width,
            (0.5 - (world.y - self.center.y) / self.height) * self.screen_height,
        )
    }

    /// Distance from the centre to a corner.
    pub fn circumscribed_radius(&self) -> f32 {
        Vec2::new(self.width, self.height).length() / 2.0
    }

    /// Side of the largest square centred in the view.
    pub fn square_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_unproject_roundtrip_corners() {
        let view = Viewport {
            center: Vec2::new(2.0, -1.0),
            width: 48.0,
            height: 96.0,
            screen_width: 480.0,
            screen_height: 960.0,
        };
        assert_eq!(view.unproject(Vec2::new(0.0, 0.0)), Vec2::new(-22.0, 47.0));
        assert_eq!(view.unproject(Vec2::new(240.0, 480.0)), view.center);
        let p = Vec2::new(10.0, 20.0);
        assert!(view.unproject(view.project(p)).distance(p) < 1e-4);
    }

    #[test]
    fn test_fit_modes() {
        let wide = Viewport::fit(48.0, 48.0, 1920.0, 1080.0, FitMode::FitToScreen);
        assert_eq!(wide.height, 48.0);
        assert!(wide.width > 48.0);

        let fill = Viewport::fit(48.0, 48.0, 1920.0, 1080.0, FitMode::FillScreen);
        assert_eq!(fill.width, 48.0);
        assert!(fill.height < 48.0);

        let tall = Viewport::fit(48.0, 48.0, 1080.0, 1920.0, FitMode::FitToScreen);
        assert_eq!(tall.width, 48.0);
        assert!(tall.height > 48.0);

        let stretch = Viewport::fit(48.0, 48.0, 1080.0, 1920.0, FitMode::Stretch);
        assert_eq!((stretch.width, stretch.height), (48.0, 48.0));
    }

    #[test]
    fn test_circumscribed_radius() {
        let view = Viewport::new(48.0, 48.0);
        assert!((view.circumscribed_radius() - 24.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
        assert_eq!(view.square_side(), 48.0);
    }
}
