//! Sampling and flattening curves into points.
//!
//! [`sample`] is the step-length sampler used for simplification and
//! reconstruction. It uses each segment's bounding-box diagonal as a stand-in
//! for arc length, so tightly curved segments with a short chord get fewer
//! samples than their true length would call for. [`flatten`] subdivides
//! Bezier segments at a fixed parameter increment instead; intersection,
//! nearest-point queries and splitting all run on the flattened polyline so
//! that they agree with each other exactly.

use crease_kernel_math::{distance, Point2, Rect};

use crate::bezier::{evaluate_cubic, evaluate_quad};
use crate::curve::{Curve, PathCommand};
use crate::{GeomError, Result};

fn control_rect(points: &[Point2]) -> Rect {
    Rect::from_points(points).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
}

fn step_count(bounds: Rect, step_length: f64) -> usize {
    let diag = bounds.diagonal();
    if diag <= f64::EPSILON {
        return 1;
    }
    ((diag / step_length).ceil() as usize).max(1)
}

/// Sample a curve into an ordered point sequence.
///
/// Each drawing segment contributes `ceil(diagonal / step_length)` points
/// (at least one) where `diagonal` is the bounding-box diagonal of the
/// segment's control points. `MoveTo` contributes its own point and `Close`
/// repeats the subpath's first sampled point.
pub fn sample(curve: &Curve, step_length: f64) -> Result<Vec<Point2>> {
    if !step_length.is_finite() || step_length <= 0.0 {
        return Err(GeomError::InvalidStep(step_length));
    }
    if curve.is_empty() {
        return Err(GeomError::EmptyCurve);
    }

    let mut out = Vec::new();
    let mut current = Point2::origin();
    let mut subpath_first = Point2::origin();

    for cmd in curve.commands() {
        match *cmd {
            PathCommand::MoveTo { p } => {
                out.push(p);
                current = p;
                subpath_first = p;
            }
            PathCommand::LineTo { p } => {
                let n = step_count(Rect::from_corners(&current, &p), step_length);
                for i in 1..=n {
                    let t = i as f64 / n as f64;
                    out.push(current + (p - current) * t);
                }
                current = p;
            }
            PathCommand::QuadTo { c, p } => {
                let bounds = control_rect(&[current, c, p]);
                let n = step_count(bounds, step_length);
                for i in 1..=n {
                    out.push(evaluate_quad(i as f64 / n as f64, &current, &c, &p));
                }
                current = p;
            }
            PathCommand::CubicTo { c1, c2, p } => {
                let bounds = control_rect(&[current, c1, c2, p]);
                let n = step_count(bounds, step_length);
                for i in 1..=n {
                    out.push(evaluate_cubic(i as f64 / n as f64, &current, &c1, &c2, &p));
                }
                current = p;
            }
            PathCommand::Close => {
                out.push(subpath_first);
                current = subpath_first;
            }
        }
    }
    Ok(out)
}

/// Flatten a curve into one polyline per subpath.
///
/// Lines contribute their end point; Bezier segments are evaluated every
/// `increments` of their parameter. `Close` appends the subpath start.
pub fn flatten(curve: &Curve, increments: f64) -> Vec<Vec<Point2>> {
    let steps = if increments.is_finite() && increments > 0.0 {
        ((1.0 / increments).round() as usize).max(1)
    } else {
        1
    };

    let mut polylines: Vec<Vec<Point2>> = Vec::new();
    let mut current = Point2::origin();
    let mut start = Point2::origin();

    for cmd in curve.commands() {
        if !matches!(cmd, PathCommand::MoveTo { .. }) && polylines.is_empty() {
            polylines.push(vec![current]);
        }
        match *cmd {
            PathCommand::MoveTo { p } => {
                polylines.push(vec![p]);
                current = p;
                start = p;
            }
            PathCommand::LineTo { p } => {
                push_point(&mut polylines, p);
                current = p;
            }
            PathCommand::QuadTo { c, p } => {
                for i in 1..=steps {
                    let t = i as f64 / steps as f64;
                    push_point(&mut polylines, evaluate_quad(t, &current, &c, &p));
                }
                current = p;
            }
            PathCommand::CubicTo { c1, c2, p } => {
                for i in 1..=steps {
                    let t = i as f64 / steps as f64;
                    push_point(&mut polylines, evaluate_cubic(t, &current, &c1, &c2, &p));
                }
                current = p;
            }
            PathCommand::Close => {
                push_point(&mut polylines, start);
                current = start;
            }
        }
    }
    polylines
}

fn push_point(polylines: &mut [Vec<Point2>], p: Point2) {
    if let Some(last) = polylines.last_mut() {
        last.push(p);
    }
}

fn closest_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// The nearest point on the flattened curve to `point`.
///
/// Returns `None` for an empty curve.
pub fn nearest_point_on_curve(curve: &Curve, point: &Point2, increments: f64) -> Option<Point2> {
    let mut best: Option<(f64, Point2)> = None;
    for poly in flatten(curve, increments) {
        let candidates: Vec<Point2> = if poly.len() == 1 {
            poly.clone()
        } else {
            poly.windows(2)
                .map(|w| closest_on_segment(point, &w[0], &w[1]))
                .collect()
        };
        for q in candidates {
            let d = distance(point, &q);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, q));
            }
        }
    }
    best.map(|(_, q)| q)
}

/// Hit test a stroked curve.
///
/// Returns the nearest point on the curve if `point` lies within `radius`
/// of it.
pub fn hit_test(curve: &Curve, point: &Point2, radius: f64, increments: f64) -> Option<Point2> {
    let nearest = nearest_point_on_curve(curve, point, increments)?;
    (distance(point, &nearest) <= radius).then_some(nearest)
}
