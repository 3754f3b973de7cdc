//! Boundary sanitization.

use crease_kernel_geom::{Curve, PathCommand};
use crease_kernel_math::{Point2, Tolerance};

use crate::{PlaneError, Result};

/// Turn a concatenation of edge curves into one closed subpath.
///
/// Every `MoveTo` after the first becomes a `LineTo`; one that lands on the
/// current point is dropped. Interior `Close` commands become lines back to
/// their subpath start. Curve segment types are preserved and the result
/// ends with a single `Close`.
pub fn sanitize(curve: &Curve) -> Result<Curve> {
    let tol = Tolerance::DEFAULT;
    let mut out = Curve::new();
    let mut current: Option<Point2> = None;
    let mut subpath_start = Point2::origin();

    for cmd in curve.commands() {
        match *cmd {
            PathCommand::MoveTo { p } => match current {
                None => {
                    out.move_to(p);
                    subpath_start = p;
                    current = Some(p);
                }
                Some(c) if tol.points_equal(&c, &p) => {}
                Some(_) => {
                    out.line_to(p);
                    current = Some(p);
                }
            },
            PathCommand::Close => {
                if let Some(c) = current {
                    if !tol.points_equal(&c, &subpath_start) {
                        out.line_to(subpath_start);
                    }
                    current = Some(subpath_start);
                }
            }
            other => {
                out.push(other);
                if let PathCommand::LineTo { p }
                | PathCommand::QuadTo { p, .. }
                | PathCommand::CubicTo { p, .. } = other
                {
                    if current.is_none() {
                        subpath_start = p;
                    }
                    current = Some(p);
                }
            }
        }
    }

    if out.is_empty() {
        return Err(PlaneError::EmptyBoundary);
    }
    out.close();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_sanitize_joins_subpaths() {
        let mut joined = Curve::line(p(0.0, 0.0), p(10.0, 0.0));
        let mut arc = Curve::new();
        arc.move_to(p(10.0, 0.0));
        arc.cubic_to(p(15.0, 5.0), p(15.0, 10.0), p(10.0, 10.0));
        joined.append(&arc);
        joined.append(&Curve::line(p(10.0, 10.0), p(0.0, 0.0)));
        assert_eq!(joined.subpath_count(), 3);

        let clean = sanitize(&joined).unwrap();
        assert_eq!(clean.subpath_count(), 1);
        assert!(clean.is_closed());
        assert!(clean
            .commands()
            .iter()
            .any(|c| matches!(c, PathCommand::CubicTo { .. })));
        // One move, three drawn segments, one close.
        assert_eq!(clean.len(), 5);
    }

    #[test]
    fn test_sanitize_bridges_gaps_and_closes() {
        let mut gappy = Curve::line(p(0.0, 0.0), p(10.0, 0.0));
        gappy.append(&Curve::line(p(10.0, 5.0), p(0.0, 5.0)));
        let clean = sanitize(&gappy).unwrap();
        assert_eq!(
            clean.commands(),
            &[
                PathCommand::MoveTo { p: p(0.0, 0.0) },
                PathCommand::LineTo { p: p(10.0, 0.0) },
                PathCommand::LineTo { p: p(10.0, 5.0) },
                PathCommand::LineTo { p: p(0.0, 5.0) },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_sanitize_flattens_inner_close() {
        let mut loop_ = Curve::polyline(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]);
        loop_.close();
        loop_.append(&Curve::line(p(0.0, 0.0), p(-5.0, 0.0)));
        let clean = sanitize(&loop_).unwrap();
        assert_eq!(clean.subpath_count(), 1);
        let closes = clean
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::Close))
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(&Curve::new()), Err(PlaneError::EmptyBoundary));
    }
}
