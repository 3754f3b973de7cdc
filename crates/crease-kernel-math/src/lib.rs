#![warn(missing_docs)]

//! Math types for the crease pop-up card kernel.
//!
//! Thin wrappers around nalgebra providing the 2D types the sketch engine
//! works in: points, vectors, axis-aligned rectangles, and tolerance
//! constants. Sketch coordinates are screen-like: `x` grows to the right
//! and `y` grows downward.

use serde::{Deserialize, Serialize};

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D sketch space.
pub type Vec2 = nalgebra::Vector2<f64>;

/// Euclidean distance between two points.
pub fn distance(p: &Point2, q: &Point2) -> f64 {
    (q - p).norm()
}

/// Midpoint of the segment `a`–`b`.
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Z component of the 2D cross product `u × v`.
pub fn cross(u: &Vec2, v: &Vec2) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Orthogonal projection of `point` onto the infinite line through `a` and `b`.
///
/// The parameter `t = dot(point - a, b - a) / |b - a|²` is not clamped, so the
/// result may lie outside the segment. A zero-length line (`a == b`) projects
/// everything onto `a`.
pub fn nearest_point_on_line(point: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return *a;
    }
    let t = (point - a).dot(&ab) / len_sq;
    a + ab * t
}

/// An axis-aligned rectangle given by its origin corner and size.
///
/// Width and height may be negative while a rectangle is being dragged out;
/// [`Rect::normalized`] flips them positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X of the origin corner.
    pub x: f64,
    /// Y of the origin corner.
    pub y: f64,
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
}

impl Rect {
    /// Rectangle from origin corner and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two opposite corners.
    pub fn from_corners(a: &Point2, b: &Point2) -> Self {
        Self::new(a.x, a.y, b.x - a.x, b.y - a.y).normalized()
    }

    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Same rectangle with non-negative width and height.
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }

    /// Minimum X.
    pub fn min_x(&self) -> f64 {
        self.normalized().x
    }

    /// Minimum Y.
    pub fn min_y(&self) -> f64 {
        self.normalized().y
    }

    /// Maximum X.
    pub fn max_x(&self) -> f64 {
        let n = self.normalized();
        n.x + n.width
    }

    /// Maximum Y.
    pub fn max_y(&self) -> f64 {
        let n = self.normalized();
        n.y + n.height
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Whether `p` lies inside or on the border.
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Whether the two rectangles overlap (touching borders count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Self {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in sketch units (points).
    pub linear: f64,
}

impl Tolerance {
    /// Default sketch tolerance (1e-6 units).
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let d = distance(&Point2::new(0.0, 0.0), &Point2::new(3.0, 4.0));
        assert_relative_eq!(d, 5.0);
    }

    #[test]
    fn test_nearest_point_on_line_is_on_line() {
        let a = Point2::new(1.0, 1.0);
        let b = Point2::new(7.0, 4.0);
        for p in [
            Point2::new(0.0, 10.0),
            Point2::new(-20.0, 3.0),
            Point2::new(50.0, -8.0),
        ] {
            let q = nearest_point_on_line(&p, &a, &b);
            assert!(cross(&(q - a), &(b - a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nearest_point_on_line_not_clamped() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let q = nearest_point_on_line(&Point2::new(25.0, 3.0), &a, &b);
        assert_relative_eq!(q.x, 25.0);
        assert_relative_eq!(q.y, 0.0);
    }

    #[test]
    fn test_nearest_point_on_degenerate_line() {
        let a = Point2::new(2.0, 2.0);
        let q = nearest_point_on_line(&Point2::new(5.0, 9.0), &a, &a);
        assert_eq!(q, a);
    }

    #[test]
    fn test_rect_normalized_and_contains() {
        let r = Rect::from_corners(&Point2::new(100.0, 90.0), &Point2::new(20.0, 40.0));
        assert_relative_eq!(r.x, 20.0);
        assert_relative_eq!(r.y, 40.0);
        assert_relative_eq!(r.width, 80.0);
        assert_relative_eq!(r.height, 50.0);
        assert!(r.contains(&Point2::new(50.0, 50.0)));
        assert!(!r.contains(&Point2::new(10.0, 50.0)));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 9.0, 10.0, 1.0);
        let c = Rect::new(11.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        let u = a.union(&c);
        assert_relative_eq!(u.max_x(), 12.0);
    }

    #[test]
    fn test_rect_from_points() {
        assert!(Rect::from_points(&[]).is_none());
        let pts = [Point2::new(3.0, -1.0), Point2::new(-2.0, 4.0)];
        let r = Rect::from_points(&pts).unwrap();
        assert_relative_eq!(r.min_x(), -2.0);
        assert_relative_eq!(r.max_y(), 4.0);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(1.0 + 1e-7, 2.0);
        assert!(tol.points_equal(&a, &b));
        assert!(!tol.points_equal(&a, &Point2::new(1.001, 2.0)));
    }
}
