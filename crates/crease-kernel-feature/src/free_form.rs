//! Hand-drawn outline.
//!
//! A free-form shape is a freehand stroke smoothed through Catmull-Rom
//! segments. Once it crosses a driving fold it receives three chord folds
//! per occluded span (top, middle and bottom) and its outline is cut into
//! pieces at every chord end and fold crossing. The outline beyond the top
//! and bottom chords is dropped, so those chords border the parent's planes
//! and only the side arcs between them remain as cuts.

use std::hash::Hasher;

use crease_kernel_geom::{
    catmull_rom_through, curve_through_points, flatten, freehand_path, intersect_with, simplify,
    split_by_points, Curve, GeomError,
};
use crease_kernel_math::{distance, Point2, Rect, Tolerance};
use crease_kernel_topo::{Edge, EdgeKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feature::{FeatureOption, FoldShape, RawEdges, ShapeContext, Validity};
use crate::fingerprint::hash_curve;
use crate::FeatureParams;

/// Free-form payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeForm {
    path: Option<Curve>,
    interpolation_points: Vec<Point2>,
    closed: bool,
}

impl FreeForm {
    /// Stroke with a single sample at `start`.
    pub fn new(start: Point2) -> Self {
        Self {
            path: None,
            interpolation_points: vec![start],
            closed: false,
        }
    }

    /// Restore a persisted stroke.
    pub fn from_parts(path: Option<Curve>, interpolation_points: Vec<Point2>, closed: bool) -> Self {
        Self {
            path,
            interpolation_points,
            closed,
        }
    }

    /// The smoothed outline, once there is one.
    pub fn path(&self) -> Option<&Curve> {
        self.path.as_ref()
    }

    /// Touch samples the outline interpolates.
    pub fn interpolation_points(&self) -> &[Point2] {
        &self.interpolation_points
    }

    /// Whether the stroke has closed on itself.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Replace the outline.
    pub fn set_path(&mut self, path: Curve) {
        self.closed = path.is_closed();
        self.path = Some(path);
    }

    /// Extend the live stroke to `cursor` and return the current outline.
    ///
    /// Samples closer than `min_point_spacing` to the previous one are
    /// ignored. The stroke closes once it has more than `close_min_points`
    /// samples and the cursor is back within twice `min_line_length` of the
    /// first sample.
    pub fn path_through_touch_points(&mut self, cursor: Point2, params: &FeatureParams) -> &Curve {
        let far_enough = self
            .interpolation_points
            .last()
            .map_or(true, |last| distance(last, &cursor) > params.min_point_spacing);

        if far_enough || self.path.is_none() {
            if far_enough {
                self.interpolation_points.push(cursor);
            }
            let first = self.interpolation_points.first().copied().unwrap_or(cursor);
            self.closed = self.interpolation_points.len() > params.close_min_points
                && distance(&first, &cursor) < params.min_line_length * 2.0;
            let path = freehand_path(
                &self.interpolation_points,
                cursor,
                self.closed,
                params.catmull_rom_alpha,
            );
            self.path = Some(path);
        }
        self.path.get_or_insert_with(|| Curve::line(cursor, cursor))
    }

    /// Close the stroke with a closed spline through every sample.
    pub fn close_stroke(&mut self, params: &FeatureParams) -> Result<(), GeomError> {
        let points = &self.interpolation_points;
        let path = if points.len() >= 4 {
            catmull_rom_through(points, true, params.catmull_rom_alpha)?
        } else if points.len() >= 2 {
            let mut c = Curve::polyline(points);
            c.close();
            c
        } else {
            return Err(GeomError::TooFewPoints {
                needed: 2,
                got: points.len(),
            });
        };
        self.set_path(path);
        Ok(())
    }
}

/// Chord of `path` along the horizontal line at `y` that covers the span
/// `[xa, xb]`.
fn chord_at(
    path: &Curve,
    bounds: &Rect,
    y: f64,
    xa: f64,
    xb: f64,
    params: &FeatureParams,
) -> Option<Edge> {
    let probe = Curve::line(
        Point2::new(bounds.min_x() - 1.0, y),
        Point2::new(bounds.max_x() + 1.0, y),
    );
    let hits = intersect_with(&probe, path, params.bezier_increments)?;
    let mid = (xa + xb) / 2.0;
    let overlap = |c: &[Point2]| c[1].x.min(xb) - c[0].x.max(xa);
    let pair = hits
        .chunks_exact(2)
        .find(|c| c[0].x <= mid && mid <= c[1].x)
        .or_else(|| {
            hits.chunks_exact(2)
                .filter(|c| overlap(c) > 0.0)
                .max_by(|a, b| overlap(a).total_cmp(&overlap(b)))
        })?;
    Some(Edge::straight(pair[0], pair[1], EdgeKind::Fold))
}

/// Chord folds for every span the outline hides of the driving fold.
///
/// For a hidden span with the outline reaching from `min_y` to `max_y` and
/// the driving fold at `F`, the top fold `T` sits halfway between `min_y`
/// and `F`, the bottom fold `B` halfway between `F` and `max_y`, and the
/// middle fold at `T + (B - F)`. A span without all three chords makes the
/// shape invalid.
pub(crate) fn truncate_with_folds(
    path: &Curve,
    fold_y: f64,
    crossings: &[Point2],
    params: &FeatureParams,
) -> (Vec<Edge>, Validity) {
    let Some(bounds) = path.control_bounds() else {
        return (Vec::new(), Validity::Invalid);
    };
    let outline: Vec<Point2> = flatten(path, params.bezier_increments).concat();

    let mut chords = Vec::new();
    let mut valid = crossings.len() >= 2;
    for pair in crossings.chunks_exact(2) {
        let (xa, xb) = (pair[0].x.min(pair[1].x), pair[0].x.max(pair[1].x));
        let (min_y, max_y) = outline
            .iter()
            .filter(|p| p.x >= xa && p.x <= xb)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !(min_y < fold_y && fold_y < max_y) {
            valid = false;
            continue;
        }
        let top = (min_y + fold_y) / 2.0;
        let bottom = (fold_y + max_y) / 2.0;
        let middle = top + (bottom - fold_y);

        let found: Option<Vec<Edge>> = [top, middle, bottom]
            .iter()
            .map(|y| chord_at(path, &bounds, *y, xa, xb, params))
            .collect();
        match found {
            Some(c) => chords.extend(c),
            None => valid = false,
        }
    }
    debug!(chords = chords.len(), valid, "truncated free-form");
    let validity = if valid { Validity::Valid } else { Validity::Invalid };
    (chords, validity)
}

/// Outline cut at `breakers`, each piece smoothed back into a curve.
pub(crate) fn outline_split_by_points(
    path: &Curve,
    breakers: &[Point2],
    params: &FeatureParams,
) -> Vec<Edge> {
    split_by_points(path, breakers, params.bezier_increments)
        .into_iter()
        .filter_map(|piece| {
            let simplified = simplify(&piece, params.simplify_epsilon);
            curve_through_points(&simplified).ok()
        })
        .map(|curve| Edge::along(curve, EdgeKind::Cut))
        .collect()
}

/// How far past a chord an outline piece may reach and still count as
/// lying beyond it.
const CAP_TOLERANCE: f64 = 1e-6;

/// Drop the outline caps above each top chord and below each bottom chord.
///
/// `chords` holds top, middle and bottom chords in groups of three. A cap
/// is a piece that runs between the two ends of its chord and stays on the
/// far side of it.
fn drop_caps(outline: Vec<Edge>, chords: &[Edge]) -> Vec<Edge> {
    let tol = Tolerance::DEFAULT;
    let is_cap = |piece: &Edge| {
        let Some(bounds) = piece.curve.control_bounds() else {
            return false;
        };
        chords.chunks_exact(3).any(|span| {
            let (top, bottom) = (&span[0], &span[2]);
            (piece.same_span(top, &tol) && bounds.max_y() <= top.start.y + CAP_TOLERANCE)
                || (piece.same_span(bottom, &tol) && bounds.min_y() >= bottom.start.y - CAP_TOLERANCE)
        })
    };
    outline.into_iter().filter(|piece| !is_cap(piece)).collect()
}

impl FoldShape for FreeForm {
    fn raw_edges(&self, ctx: &ShapeContext<'_>) -> RawEdges {
        let Some(path) = &self.path else {
            let start = ctx.start.unwrap_or_else(Point2::origin);
            return RawEdges {
                others: vec![Edge::straight(start, Point2::origin(), EdgeKind::Cut)],
                ..RawEdges::default()
            };
        };

        let attachment = ctx.attachment.filter(|a| !a.crossings.is_empty());
        let Some(attachment) = attachment else {
            return RawEdges {
                others: vec![Edge::along(path.clone(), EdgeKind::Cut)],
                ..RawEdges::default()
            };
        };

        let (chords, validity) =
            truncate_with_folds(path, attachment.fold.start.y, &attachment.crossings, ctx.params);
        let mut breakers: Vec<Point2> = chords.iter().flat_map(|c| [c.start, c.end]).collect();
        breakers.extend_from_slice(&attachment.crossings);
        let mut outline = outline_split_by_points(path, &breakers, ctx.params);
        if validity == Validity::Valid {
            outline = drop_caps(outline, &chords);
        }

        RawEdges {
            folds: chords,
            others: outline,
            validity,
            master: false,
        }
    }

    /// Keeps the fold up to the first crossing, the bridges between every
    /// other crossing pair, and the fold after the last crossing.
    fn split_fold_by_occlusion(
        &self,
        _ctx: &ShapeContext<'_>,
        fold: &Edge,
        crossings: &[Point2],
    ) -> Vec<Edge> {
        let (Some(first), Some(last)) = (crossings.first(), crossings.last()) else {
            return vec![fold.clone()];
        };
        let mut pieces = vec![Edge::straight(fold.start, *first, EdgeKind::Fold)];
        let mut i = 1;
        while i + 1 < crossings.len() {
            let tip = crossings[i];
            let across = Point2::new(crossings[i + 1].x, tip.y);
            pieces.push(Edge::straight(tip, across, EdgeKind::Fold));
            i += 2;
        }
        pieces.push(Edge::straight(*last, fold.end, EdgeKind::Fold));
        pieces
    }

    fn bounding_box(&self, _ctx: &ShapeContext<'_>) -> Option<Rect> {
        self.path.as_ref()?.control_bounds()
    }

    fn spans_fold(&self, ctx: &ShapeContext<'_>, fold: &Edge) -> Option<Vec<Point2>> {
        intersect_with(&fold.curve, self.path.as_ref()?, ctx.params.bezier_increments)
    }

    fn tap_options(&self, is_leaf: bool, _horizontal_folds: usize) -> Vec<FeatureOption> {
        let mut options = vec![FeatureOption::DeleteFeature];
        if is_leaf {
            options.push(FeatureOption::AddFolds);
        }
        options
    }

    fn hash_payload(&self, h: &mut dyn Hasher) {
        match &self.path {
            Some(path) => {
                h.write_u8(1);
                hash_curve(h, path);
            }
            None => h.write_u8(0),
        }
    }
}
