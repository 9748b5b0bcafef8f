//! Canvas sizing and device pixel ratio.

use sketch_core::{Point, Rect, Size};

use crate::error::{RenderError, RenderResult};

/// The canvas's CSS box and the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// CSS width in pixels.
    pub css_width: f32,
    /// CSS height in pixels.
    pub css_height: f32,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            css_width: 800.0,
            css_height: 600.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Create a validated viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is negative or not finite, or the
    /// pixel ratio is not positive.
    pub fn new(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> RenderResult<Self> {
        let valid_extent = |v: f32| v.is_finite() && v >= 0.0;
        if !valid_extent(css_width) || !valid_extent(css_height) {
            return Err(RenderError::InvalidViewport(format!(
                "size {css_width}x{css_height}"
            )));
        }
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return Err(RenderError::InvalidViewport(format!(
                "device pixel ratio {device_pixel_ratio}"
            )));
        }
        Ok(Self {
            css_width,
            css_height,
            device_pixel_ratio,
        })
    }

    /// Backing store size in physical pixels: `round(css * dpr)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.css_width * self.device_pixel_ratio).round() as u32,
            (self.css_height * self.device_pixel_ratio).round() as u32,
        )
    }

    /// The visible canvas area at `zoom` (1.0 = 100%).
    #[must_use]
    pub fn visible_area(&self, zoom: f32) -> Rect {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        Rect::new(
            Point::new(0.0, 0.0),
            Size::new(self.css_width / zoom, self.css_height / zoom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_rounds() {
        let vp = Viewport::new(801.0, 600.5, 1.5).expect("viewport");
        assert_eq!(vp.backing_size(), (1202, 901));
    }

    #[test]
    fn rejects_bad_ratio() {
        assert!(Viewport::new(100.0, 100.0, 0.0).is_err());
        assert!(Viewport::new(f32::NAN, 100.0, 1.0).is_err());
    }

    #[test]
    fn zoom_shrinks_visible_area() {
        let vp = Viewport::default();
        let area = vp.visible_area(2.0);
        assert!((area.size.width - 400.0).abs() < f32::EPSILON);
        assert!((area.size.height - 300.0).abs() < f32::EPSILON);
    }
}
