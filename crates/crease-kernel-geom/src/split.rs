//! Cutting a curve into polylines at points that lie on it.

use crease_kernel_math::{distance, Point2, Tolerance};

use crate::curve::Curve;
use crate::sample::flatten;

/// How far a breaker may sit from the flattened curve and still cut it.
const ON_CURVE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy)]
struct Breaker {
    segment: usize,
    t: f64,
    point: Point2,
}

/// Locate `point` on `poly` as (segment index, parameter).
fn locate(poly: &[Point2], point: &Point2) -> Option<Breaker> {
    let mut best: Option<(f64, Breaker)> = None;
    for (i, w) in poly.windows(2).enumerate() {
        let ab = w[1] - w[0];
        let len_sq = ab.norm_squared();
        let t = if len_sq <= f64::EPSILON {
            0.0
        } else {
            ((point - w[0]).dot(&ab) / len_sq).clamp(0.0, 1.0)
        };
        let d = distance(point, &(w[0] + ab * t));
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((
                d,
                Breaker {
                    segment: i,
                    t,
                    point: *point,
                },
            ));
        }
    }
    best.and_then(|(d, b)| (d <= ON_CURVE_TOLERANCE).then_some(b))
}

fn push_vertex(piece: &mut Vec<Point2>, p: Point2, tol: &Tolerance) {
    if piece.last().map_or(true, |last| !tol.points_equal(last, &p)) {
        piece.push(p);
    }
}

/// Breakers win over coincident vertices so pieces end exactly on them.
fn push_breaker(piece: &mut Vec<Point2>, p: Point2, tol: &Tolerance) {
    match piece.last_mut() {
        Some(last) if tol.points_equal(last, &p) => *last = p,
        _ => piece.push(p),
    }
}

fn split_polyline(poly: &[Point2], breakers: &[Point2], tol: &Tolerance) -> Vec<Vec<Point2>> {
    if poly.len() < 2 {
        return Vec::new();
    }
    let mut located: Vec<Breaker> = breakers.iter().filter_map(|b| locate(poly, b)).collect();
    located.sort_by(|a, b| a.segment.cmp(&b.segment).then(a.t.total_cmp(&b.t)));

    let mut pieces = Vec::with_capacity(located.len() + 1);
    let mut current = vec![poly[0]];
    let mut next = 0;
    for i in 0..poly.len() - 1 {
        while next < located.len() && located[next].segment == i {
            let p = located[next].point;
            push_breaker(&mut current, p, tol);
            pieces.push(std::mem::replace(&mut current, vec![p]));
            next += 1;
        }
        push_vertex(&mut current, poly[i + 1], tol);
    }
    pieces.push(current);

    let closed = poly.len() > 2 && tol.points_equal(&poly[0], &poly[poly.len() - 1]);
    if closed && pieces.len() > 1 {
        // The seam is not a cut: join the trailing piece to the leading one.
        let first = pieces.remove(0);
        if let Some(mut last) = pieces.pop() {
            for p in first.into_iter().skip(1) {
                push_vertex(&mut last, p, tol);
            }
            pieces.insert(0, last);
        }
    }

    pieces.retain(|piece| piece.len() >= 2);
    pieces
}

/// Split `curve` at `breakers`.
///
/// The curve is flattened at `increments`; each subpath is cut at every
/// breaker lying on it (breakers off the curve are ignored) and the pieces
/// are returned in curve order. Pieces start and end exactly at their
/// breakers. On a closed subpath the seam is not a cut, so with `k` breakers
/// it yields `k` pieces. Zero-length pieces are dropped.
pub fn split_by_points(curve: &Curve, breakers: &[Point2], increments: f64) -> Vec<Vec<Point2>> {
    let tol = Tolerance::DEFAULT;
    flatten(curve, increments)
        .iter()
        .flat_map(|poly| split_polyline(poly, breakers, &tol))
        .collect()
}
