//! Drawing primitives the frame loop renders through.
//!
//! Coordinates are surface pixels with the origin at the top-left corner and
//! `y` growing downward.

use glam::Vec2;

use crate::star::Bounds;

/// An RGBA color with channels nominally in 0.0-1.0.
///
/// Alpha is carried as emitted and may exceed 1.0; clamping is left to
/// whatever consumes the color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from 8-bit RGB channels and an alpha value.
    pub fn from_rgb8(rgb: [u8; 3], a: f32) -> Self {
        Self {
            r: rgb[0] as f32 / 255.0,
            g: rgb[1] as f32 / 255.0,
            b: rgb[2] as f32 / 255.0,
            a,
        }
    }

    /// Same color with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A 2D drawing surface.
pub trait Canvas {
    /// Erase everything inside `bounds`.
    fn clear(&mut self, bounds: Bounds);

    /// Fill an axis-aligned square of side `size` centered at `center`.
    fn fill_square(&mut self, center: Vec2, size: f32, color: Rgba);

    /// Stroke a straight line of the given width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn clear(&mut self, bounds: Bounds) {
        (**self).clear(bounds)
    }

    fn fill_square(&mut self, center: Vec2, size: f32, color: Rgba) {
        (**self).fill_square(center, size, color)
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        (**self).stroke_line(from, to, width, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb8() {
        let c = Rgba::from_rgb8([255, 0, 51], 0.5);
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.2, 0.5));
    }

    #[test]
    fn test_alpha_is_not_clamped() {
        let c = Rgba::from_rgb8([99, 99, 99], 1.0).with_alpha(1.2);
        assert_eq!(c.a, 1.2);
    }
}
