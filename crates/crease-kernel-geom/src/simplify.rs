//! Douglas-Peucker polyline simplification.

use crease_kernel_math::{cross, distance, Point2};

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// plain distance to `a` when the line is degenerate.
fn perpendicular_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len = ab.norm();
    if len <= f64::EPSILON {
        return distance(p, a);
    }
    cross(&ab, &(p - a)).abs() / len
}

fn douglas_peucker(points: &[Point2], epsilon: f64, keep: &mut [bool], offset: usize) {
    if points.len() < 3 {
        return;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let (index, max_dist) = points[1..points.len() - 1]
        .iter()
        .enumerate()
        .map(|(i, p)| (i + 1, perpendicular_distance(p, &first, &last)))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

    if max_dist > epsilon {
        keep[offset + index] = true;
        douglas_peucker(&points[..=index], epsilon, keep, offset);
        douglas_peucker(&points[index..], epsilon, keep, offset + index);
    }
}

fn simplify_open(points: &[Point2], epsilon: f64) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    douglas_peucker(points, epsilon, &mut keep, 0);
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Simplify a polyline, dropping points closer than `epsilon` to the chord
/// of their span.
///
/// A closed sequence (`first == last`, compared exactly) is simplified once,
/// rotated so its seam moves to the midpoint of the result, and simplified
/// again. This keeps the seam from surviving as a spurious corner. It is a
/// heuristic double pass, not an optimal closed-curve simplification. The
/// output of a closed input is still closed.
pub fn simplify(points: &[Point2], epsilon: f64) -> Vec<Point2> {
    let closed = points.len() > 3 && points.first() == points.last();
    let first_pass = simplify_open(points, epsilon);
    if !closed || first_pass.len() < 4 {
        return first_pass;
    }

    // Drop the duplicated seam, rotate, and re-close on the new seam.
    let ring = &first_pass[..first_pass.len() - 1];
    let mid = ring.len() / 2;
    let mut rotated = Vec::with_capacity(ring.len() + 1);
    rotated.extend_from_slice(&ring[mid..]);
    rotated.extend_from_slice(&ring[..mid]);
    rotated.push(ring[mid]);
    simplify_open(&rotated, epsilon)
}
