//! Points and rectangles in page space.

use serde::Serialize;

/// A point in unrotated page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by two corners.
///
/// `min` is the corner the rectangle was drawn from and `max` the opposite
/// one; a negative width or height leaves `max` below or left of `min`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    /// Starting corner
    pub min: Point,
    /// Opposite corner
    pub max: Point,
}

impl Rect {
    /// Rectangle from origin and size, as the `re` operator takes them.
    ///
    /// ```
    /// use pdftext::geometry::Rect;
    ///
    /// let r = Rect::new(10.0, 20.0, 5.0, 8.0);
    /// assert_eq!(r.max.x, 15.0);
    /// assert_eq!(r.max.y, 28.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_points(x, y, x + width, y + height)
    }

    /// Rectangle from two corners.
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Horizontal extent (may be negative).
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent (may be negative).
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_extent() {
        let r = Rect::new(0.0, 0.0, -4.0, 3.0);
        assert_eq!(r.width(), -4.0);
        assert_eq!(r.height(), 3.0);
        assert_eq!(Rect::from_points(0.0, 0.0, -4.0, 3.0), r);
    }
}
