//! Geometric primitives: points, device-pixel rectangles, and rectangles
//! normalised to the surface size.

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };
}

/// Surface size in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in device pixels, edges inclusive-exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Rectangle whose coordinates are fractions of the surface size, as the
/// remote proxy reports caret and input-area bounds.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FloatRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl FloatRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Scales to device pixels. Coordinates truncate toward zero.
    pub fn to_device(&self, surface: Size) -> IntRect {
        IntRect {
            left: (self.left * surface.width) as i32,
            top: (self.top * surface.height) as i32,
            right: ((self.left + self.width) * surface.width) as i32,
            bottom: ((self.top + self.height) * surface.height) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_rect_scales_to_surface() {
        let rect = FloatRect::new(0.25, 0.5, 0.5, 0.25);
        let device = rect.to_device(Size::new(200.0, 100.0));
        assert_eq!(device, IntRect::new(50, 50, 150, 75));
        assert_eq!(device.width(), 100);
        assert_eq!(device.height(), 25);
    }

    #[test]
    fn to_device_truncates_fractions() {
        let rect = FloatRect::new(0.333, 0.0, 0.001, 0.5);
        let device = rect.to_device(Size::new(10.0, 10.0));
        assert_eq!(device, IntRect::new(3, 0, 3, 5));
    }
}
