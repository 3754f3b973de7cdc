//! Bernstein-basis Bezier evaluation.

use crease_kernel_math::Point2;

/// Evaluate a cubic Bezier at `t ∈ [0, 1]`.
pub fn evaluate_cubic(t: f64, p0: &Point2, p1: &Point2, p2: &Point2, p3: &Point2) -> Point2 {
    let mt = 1.0 - t;
    let b0 = mt * mt * mt;
    let b1 = 3.0 * mt * mt * t;
    let b2 = 3.0 * mt * t * t;
    let b3 = t * t * t;
    Point2::new(
        b0 * p0.x + b1 * p1.x + b2 * p2.x + b3 * p3.x,
        b0 * p0.y + b1 * p1.y + b2 * p2.y + b3 * p3.y,
    )
}

/// Evaluate a quadratic Bezier at `t ∈ [0, 1]`.
pub fn evaluate_quad(t: f64, p0: &Point2, p1: &Point2, p2: &Point2) -> Point2 {
    let mt = 1.0 - t;
    let b0 = mt * mt;
    let b1 = 2.0 * mt * t;
    let b2 = t * t;
    Point2::new(
        b0 * p0.x + b1 * p1.x + b2 * p2.x,
        b0 * p0.y + b1 * p1.y + b2 * p2.y,
    )
}
