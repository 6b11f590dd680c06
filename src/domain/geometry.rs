//! Geometric types for screen placement and document coordinates

use std::ops::{Add, Mul, Sub};

use serde::Serialize;

/// Integer rectangle in canvas pixels (left/top inclusive, right/bottom exclusive)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from its top-left corner and size
    pub fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, x: i32, y: i32) -> Rect {
        Rect {
            left: self.left + x,
            top: self.top + y,
            right: self.right + x,
            bottom: self.bottom + y,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// A placement rectangle is usable only with a positive area
    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Top-left corner as a screen point
    pub fn top_left(&self) -> ScreenPoint {
        ScreenPoint::new(self.left as f64, self.top as f64)
    }
}

/// A point (or vector) in canvas pixel space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        (self - other).length()
    }

    pub fn dot(self, other: ScreenPoint) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (determinant of the two column vectors)
    pub fn cross(self, other: ScreenPoint) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for ScreenPoint {
    type Output = ScreenPoint;

    fn add(self, rhs: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ScreenPoint {
    type Output = ScreenPoint;

    fn sub(self, rhs: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for ScreenPoint {
    type Output = ScreenPoint;

    fn mul(self, rhs: f64) -> ScreenPoint {
        ScreenPoint::new(self.x * rhs, self.y * rhs)
    }
}

/// A point in document (TikZ) units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: WorldPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_translate_keeps_size() {
        let r = Rect::from_origin_size(10, 20, 100, 50).translate(-5, 7);
        assert_eq!(r, Rect::new(5, 27, 105, 77));
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
    }

    #[test]
    fn test_rect_validity() {
        assert!(Rect::new(0, 0, 1, 1).is_valid());
        assert!(!Rect::new(0, 0, 0, 10).is_valid());
        assert!(!Rect::default().is_valid());
    }

    #[test]
    fn test_screen_point_cross_and_dot() {
        let u = ScreenPoint::new(100.0, 0.0);
        let v = ScreenPoint::new(0.0, 100.0);
        assert_eq!(u.cross(v), 10_000.0);
        assert_eq!(u.dot(v), 0.0);
        assert_eq!((u - v).length(), 100.0 * 2f64.sqrt());
    }
}
