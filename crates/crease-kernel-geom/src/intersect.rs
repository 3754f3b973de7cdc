//! Curve/curve intersection on flattened polylines.

use crease_kernel_math::{cross, Point2, Tolerance};

use crate::curve::Curve;
use crate::sample::flatten;
use crate::DEFAULT_BEZIER_INCREMENTS;

/// Parametric slack so that crossings exactly on a segment end are found.
const PARAM_EPS: f64 = 1e-9;

/// Intersection of segments `a1 → a2` and `b1 → b2` as `(t, point)` where
/// `t` is the parameter along the first segment. Parallel segments never
/// intersect.
fn segment_hit(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> Option<(f64, Point2)> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = cross(&r, &s);
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let qp = b1 - a1;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;
    let range = -PARAM_EPS..=1.0 + PARAM_EPS;
    if range.contains(&t) && range.contains(&u) {
        let t = t.clamp(0.0, 1.0);
        Some((t, a1 + r * t))
    } else {
        None
    }
}

/// Intersection point of two segments, end points included.
pub fn segment_intersection(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> Option<Point2> {
    segment_hit(a1, a2, b1, b2).map(|(_, p)| p)
}

/// Whether two segments cross or touch.
pub fn segments_intersect(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> bool {
    segment_hit(a1, a2, b1, b2).is_some()
}

/// Intersections of `a` and `b` at the default flattening increment.
///
/// See [`intersect_with`].
pub fn intersect(a: &Curve, b: &Curve) -> Option<Vec<Point2>> {
    intersect_with(a, b, DEFAULT_BEZIER_INCREMENTS)
}

/// Intersections of `a` and `b` ordered along `a`.
///
/// Both curves are flattened at `increments` and every pair of polyline
/// segments is tested. Hits closer than [`Tolerance::DEFAULT`] to an earlier
/// hit are dropped, so a crossing through a shared vertex is reported once.
/// Returns `None` when the curves do not meet.
pub fn intersect_with(a: &Curve, b: &Curve, increments: f64) -> Option<Vec<Point2>> {
    let tol = Tolerance::DEFAULT;
    let polys_a = flatten(a, increments);
    let polys_b = flatten(b, increments);

    let mut hits: Vec<(f64, Point2)> = Vec::new();
    let mut base = 0.0;
    for poly in &polys_a {
        for (i, wa) in poly.windows(2).enumerate() {
            for other in &polys_b {
                for wb in other.windows(2) {
                    if let Some((t, p)) = segment_hit(&wa[0], &wa[1], &wb[0], &wb[1]) {
                        hits.push((base + i as f64 + t, p));
                    }
                }
            }
        }
        base += poly.len() as f64;
    }

    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    let mut out: Vec<Point2> = Vec::with_capacity(hits.len());
    for (_, p) in hits {
        if !out.iter().any(|q| tol.points_equal(q, &p)) {
            out.push(p);
        }
    }
    (!out.is_empty()).then_some(out)
}
