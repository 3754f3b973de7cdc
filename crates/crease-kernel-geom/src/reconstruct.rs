//! Smooth curves through point sequences.
//!
//! Two reconstructions are provided:
//!
//! - [`curve_through_points`] walks a (usually simplified) point list in
//!   strides of three and emits one cubic per stride, anchoring each cubic
//!   at the midpoint between its second control and the following point so
//!   consecutive cubics join with a continuous tangent.
//! - [`catmull_rom_through`] interpolates every point with a Catmull-Rom
//!   spline converted to cubic Beziers. `alpha` selects the knot
//!   parameterization (0 uniform, 0.5 centripetal, 1 chordal).

use crease_kernel_math::{distance, midpoint, Point2};

use crate::curve::Curve;
use crate::{GeomError, Result};

/// Smooth piecewise-cubic curve through `points`.
///
/// Fewer than four points produce a single straight segment from the first
/// to the last point. Otherwise full strides emit cubics whose end anchor is
/// the midpoint of the stride's second control and the next point; the tail
/// is closed with a cubic (four points left), a cubic with a doubled control
/// (three points left), or a line. The curve always starts at the first
/// point and ends at the last one.
pub fn curve_through_points(points: &[Point2]) -> Result<Curve> {
    let n = points.len();
    if n == 0 {
        return Err(GeomError::TooFewPoints { needed: 1, got: 0 });
    }

    let mut curve = Curve::new();
    curve.move_to(points[0]);
    if n < 4 {
        curve.line_to(points[n - 1]);
        return Ok(curve);
    }

    let mut base = 0;
    while n - 1 - base >= 4 {
        let c1 = points[base + 1];
        let c2 = points[base + 2];
        let anchor = midpoint(&c2, &points[base + 4]);
        curve.cubic_to(c1, c2, anchor);
        // The anchor replaces points[base + 3] as the next stride's start.
        base += 3;
    }

    match n - 1 - base {
        3 => curve.cubic_to(points[base + 1], points[base + 2], points[base + 3]),
        2 => curve.cubic_to(points[base + 1], points[base + 1], points[base + 2]),
        1 => curve.line_to(points[base + 1]),
        _ => {}
    }
    Ok(curve)
}

/// Cubic Bezier control points for the Catmull-Rom span `p1 → p2`.
fn catmull_rom_controls(
    p0: &Point2,
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    alpha: f64,
) -> (Point2, Point2) {
    let eps = 1e-9;
    let d1 = distance(p0, p1);
    let d2 = distance(p1, p2);
    let d3 = distance(p2, p3);

    let b1 = if d1 > eps {
        let d1a = d1.powf(alpha);
        let d1a2 = d1.powf(2.0 * alpha);
        let d2a = d2.powf(alpha);
        let d2a2 = d2.powf(2.0 * alpha);
        let k = 2.0 * d1a2 + 3.0 * d1a * d2a + d2a2;
        let m = 3.0 * d1a * (d1a + d2a);
        if m > eps {
            Point2::from((p2.coords * d1a2 - p0.coords * d2a2 + p1.coords * k) / m)
        } else {
            *p1
        }
    } else {
        *p1
    };

    let b2 = if d3 > eps {
        let d3a = d3.powf(alpha);
        let d3a2 = d3.powf(2.0 * alpha);
        let d2a = d2.powf(alpha);
        let d2a2 = d2.powf(2.0 * alpha);
        let k = 2.0 * d3a2 + 3.0 * d3a * d2a + d2a2;
        let m = 3.0 * d3a * (d3a + d2a);
        if m > eps {
            Point2::from((p1.coords * d3a2 - p3.coords * d2a2 + p2.coords * k) / m)
        } else {
            *p2
        }
    } else {
        *p2
    };

    (b1, b2)
}

/// Append Catmull-Rom cubics for spans starting at `first_span`.
///
/// The caller is responsible for the curve already standing at
/// `points[first_span]`.
fn append_catmull_rom(
    curve: &mut Curve,
    points: &[Point2],
    closed: bool,
    alpha: f64,
    first_span: usize,
) {
    let n = points.len();
    let spans = if closed { n } else { n - 1 };
    for i in first_span..spans {
        let p0 = if i == 0 {
            if closed {
                points[n - 1]
            } else {
                points[0]
            }
        } else {
            points[i - 1]
        };
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let p3 = if closed {
            points[(i + 2) % n]
        } else if i + 2 < n {
            points[i + 2]
        } else {
            p2
        };
        let (b1, b2) = catmull_rom_controls(&p0, &p1, &p2, &p3, alpha);
        curve.cubic_to(b1, b2, p2);
    }
}

/// Catmull-Rom spline through at least four points.
///
/// A closed spline wraps around and ends with an explicit `Close`.
pub fn catmull_rom_through(points: &[Point2], closed: bool, alpha: f64) -> Result<Curve> {
    if points.len() < 4 {
        return Err(GeomError::TooFewPoints {
            needed: 4,
            got: points.len(),
        });
    }
    let mut curve = Curve::new();
    curve.move_to(points[0]);
    append_catmull_rom(&mut curve, points, closed, alpha, 0);
    if closed {
        curve.close();
    }
    Ok(curve)
}

/// Live freehand stroke through touch samples.
///
/// With more than three samples, an open stroke is a straight lead-in from
/// the first to the second sample, a Catmull-Rom spline through the rest,
/// and a straight lead-out to `cursor`; a closed stroke is a closed spline.
/// With fewer samples the stroke is a straight line from the first sample to
/// `cursor`. The result always passes through the first sample and, when
/// open, ends at `cursor`.
pub fn freehand_path(points: &[Point2], cursor: Point2, closed: bool, alpha: f64) -> Curve {
    if points.len() <= 3 {
        let start = points.first().copied().unwrap_or(cursor);
        return Curve::line(start, cursor);
    }
    if closed {
        let mut curve = Curve::new();
        curve.move_to(points[0]);
        append_catmull_rom(&mut curve, points, true, alpha, 0);
        curve.close();
        return curve;
    }
    let mut curve = Curve::line(points[0], points[1]);
    append_catmull_rom(&mut curve, points, false, alpha, 1);
    curve.line_to(cursor);
    curve
}
