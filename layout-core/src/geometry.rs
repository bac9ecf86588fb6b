//! Plain geometry shared by the document model and the scene graph.
//!
//! All values are in document units (see [`crate::Unit`]).

use serde::{Deserialize, Serialize};

/// A point in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Bounds {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow the rectangle outward by `amount` on every side.
    #[must_use]
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Shrink the rectangle inward by `amount` on every side.
    #[must_use]
    pub fn inset(&self, amount: f32) -> Self {
        self.expand(-amount)
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// The position of one of the four corners.
    #[must_use]
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.right(), self.y),
            Corner::BottomLeft => Point::new(self.x, self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// Whether every field is finite and both dimensions are positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// A square of side `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Point, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }
}

/// One of the four corners of a rectangle; also identifies a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl Corner {
    /// All corners in drawing order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Whether dragging this corner moves the left edge.
    #[must_use]
    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this corner moves the top edge.
    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_and_inset() {
        let trim = Bounds::new(0.0, 0.0, 210.0, 297.0);
        assert_eq!(trim.expand(3.0), Bounds::new(-3.0, -3.0, 216.0, 303.0));
        assert_eq!(trim.inset(5.0), Bounds::new(5.0, 5.0, 200.0, 287.0));
    }

    #[test]
    fn test_contains_edges() {
        let b = Bounds::new(10.0, 10.0, 20.0, 20.0);
        assert!(b.contains(Point::new(10.0, 10.0)));
        assert!(b.contains(Point::new(30.0, 30.0)));
        assert!(!b.contains(Point::new(30.1, 15.0)));
    }

    #[test]
    fn test_validity() {
        assert!(Bounds::new(-5.0, -5.0, 0.5, 2.0).is_valid());
        assert!(!Bounds::new(0.0, 0.0, -5.0, 10.0).is_valid());
        assert!(!Bounds::new(0.0, 0.0, 10.0, 0.0).is_valid());
        assert!(!Bounds::new(f32::NAN, 0.0, 10.0, 10.0).is_valid());
        assert!(!Bounds::new(0.0, 0.0, f32::INFINITY, 10.0).is_valid());
    }

    #[test]
    fn test_corners() {
        let b = Bounds::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(b.corner(Corner::BottomRight), Point::new(4.0, 6.0));
        assert_eq!(b.corner(Corner::TopRight), Point::new(4.0, 2.0));
        assert!(Corner::BottomLeft.is_left());
        assert!(!Corner::BottomLeft.is_top());
    }
}
