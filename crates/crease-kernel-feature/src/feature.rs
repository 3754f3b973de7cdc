//! The feature node, its variants and the capability interface they share.

use std::hash::Hasher;

use crease_kernel_geom::{nearest_point_on_curve, segment_intersection};
use crease_kernel_math::{distance, Point2, Rect, Tolerance};
use crease_kernel_topo::Edge;
use serde::{Deserialize, Serialize};

use crate::box_fold::BoxFold;
use crate::fingerprint::{hash_edge, hash_opt_point, hash_points};
use crate::free_form::FreeForm;
use crate::master_card::MasterCard;
use crate::polygon::Polygon;
use crate::{FeatureId, FeatureParams};

/// How far a child's driving fold may sit from a parent fold and still be
/// considered part of it.
const FOLD_MATCH_TOLERANCE: f64 = 1e-3;

/// Which variant a new feature should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Rectangular pop-up.
    BoxFold,
    /// The card itself.
    MasterCard,
    /// Hand-drawn outline.
    FreeForm,
    /// Straight-sided outline through placed points.
    Polygon,
}

/// Whether a feature can actually be folded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// No known way to make this fold.
    Invalid,
    /// Can be folded in real life.
    #[default]
    Valid,
}

/// Edits offered when a feature is tapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureOption {
    /// Remove the feature and its descendants.
    DeleteFeature,
    /// Add folds to a leaf.
    AddFolds,
    /// Drag existing folds.
    MoveFolds,
    /// Drag outline points.
    MovePoints,
}

/// A child's link to its parent.
///
/// Parent and driving fold are one value, so a feature has a parent exactly
/// when it has a driving fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// The feature whose fold is crossed.
    pub parent: FeatureId,
    /// The crossed fold, as it was when the child was attached.
    pub fold: Edge,
    /// Where the child's outline crosses the fold, ordered along it.
    pub crossings: Vec<Point2>,
}

/// Variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "shape")]
pub enum FeatureVariant {
    /// Rectangular pop-up.
    BoxFold(BoxFold),
    /// The card itself.
    MasterCard(MasterCard),
    /// Hand-drawn outline.
    FreeForm(FreeForm),
    /// Straight-sided outline.
    Polygon(Polygon),
}

/// Everything a variant may look at besides its own payload.
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    /// Designer-facing start anchor.
    pub start: Option<Point2>,
    /// Designer-facing end anchor.
    pub end: Option<Point2>,
    /// Link to the parent, if attached (or provisionally attached).
    pub attachment: Option<&'a Attachment>,
    /// Geometry settings.
    pub params: &'a FeatureParams,
}

impl ShapeContext<'_> {
    /// Top-left and bottom-right corners of the anchor rectangle.
    pub fn corners(&self) -> Option<(Point2, Point2)> {
        let (s, e) = (self.start?, self.end?);
        Some((
            Point2::new(s.x.min(e.x), s.y.min(e.y)),
            Point2::new(s.x.max(e.x), s.y.max(e.y)),
        ))
    }
}

/// Edges a variant produces by itself, before its folds are split around
/// children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEdges {
    /// Horizontal folds children may hang off.
    pub folds: Vec<Edge>,
    /// Cuts and any other edges.
    pub others: Vec<Edge>,
    /// Whether the shape could be made foldable.
    pub validity: Validity,
    /// Edges belong to the master card frame.
    pub master: bool,
}

/// A feature's generated edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generated {
    /// Folds first, then the remaining edges.
    pub edges: Vec<Edge>,
    /// Horizontal folds after splitting, sorted by y.
    pub horizontal_folds: Vec<Edge>,
    /// Validity of the generated shape.
    pub validity: Validity,
}

/// Capabilities every feature variant provides.
pub trait FoldShape {
    /// The variant's own folds and cuts.
    fn raw_edges(&self, ctx: &ShapeContext<'_>) -> RawEdges;

    /// Cut `fold` into the fragments left visible around this shape.
    fn split_fold_by_occlusion(
        &self,
        _ctx: &ShapeContext<'_>,
        fold: &Edge,
        _crossings: &[Point2],
    ) -> Vec<Edge> {
        vec![fold.clone()]
    }

    /// Axis-aligned bounds, or `None` while the shape is not placed yet.
    fn bounding_box(&self, ctx: &ShapeContext<'_>) -> Option<Rect>;

    /// Crossing points with `fold` if the shape spans it.
    fn spans_fold(&self, ctx: &ShapeContext<'_>, fold: &Edge) -> Option<Vec<Point2>>;

    /// Edits offered on tap.
    fn tap_options(&self, is_leaf: bool, horizontal_folds: usize) -> Vec<FeatureOption>;

    /// Feed the payload into a fingerprint.
    fn hash_payload(&self, _h: &mut dyn Hasher) {}
}

/// Anchor-diagonal span test: both anchors lie strictly inside the fold's
/// x range and the segment between them crosses the fold.
pub(crate) fn anchors_span_fold(ctx: &ShapeContext<'_>, fold: &Edge) -> Option<Vec<Point2>> {
    let (start, end) = (ctx.start?, ctx.end?);
    let f_min = fold.start.x.min(fold.end.x);
    let f_max = fold.start.x.max(fold.end.x);
    let inside = |x: f64| f_min < x && x < f_max;
    if !(inside(start.x) && inside(end.x)) {
        return None;
    }
    segment_intersection(&fold.start, &fold.end, &start, &end).map(|p| vec![p])
}

/// One drawn shape in the fold tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldFeature {
    /// Start anchor (top-left once finalized).
    pub start: Option<Point2>,
    /// End anchor (bottom-right once finalized).
    pub end: Option<Point2>,
    /// Variant payload.
    pub variant: FeatureVariant,
    pub(crate) attachment: Option<Attachment>,
    pub(crate) children: Vec<FeatureId>,
    pub(crate) validity: Validity,
    pub(crate) cache: Option<EdgeCache>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EdgeCache {
    pub key: u64,
    pub generated: Generated,
}

impl FoldFeature {
    fn with_variant(variant: FeatureVariant, start: Option<Point2>, end: Option<Point2>) -> Self {
        Self {
            start,
            end,
            variant,
            attachment: None,
            children: Vec::new(),
            validity: Validity::Valid,
            cache: None,
        }
    }

    /// Master card spanning two corners.
    pub fn master_card(top_left: Point2, bottom_right: Point2) -> Self {
        let mut f = Self::with_variant(
            FeatureVariant::MasterCard(MasterCard),
            Some(top_left),
            Some(bottom_right),
        );
        f.fix_start_end_point();
        f
    }

    /// Box fold started at `start`; the end follows the drag.
    pub fn box_fold(start: Point2) -> Self {
        Self::with_variant(FeatureVariant::BoxFold(BoxFold), Some(start), None)
    }

    /// Free-form stroke started at `start`.
    pub fn free_form(start: Point2) -> Self {
        Self::with_variant(
            FeatureVariant::FreeForm(FreeForm::new(start)),
            Some(start),
            Some(start),
        )
    }

    /// Polygon whose first vertex is `start`.
    pub fn polygon(start: Point2) -> Self {
        let mut f = Self::with_variant(FeatureVariant::Polygon(Polygon::default()), Some(start), None);
        f.add_polygon_point(start);
        f
    }

    /// New feature of the given kind at `start`.
    pub fn of_kind(kind: FeatureKind, start: Point2) -> Self {
        match kind {
            FeatureKind::BoxFold => Self::box_fold(start),
            FeatureKind::MasterCard => Self::master_card(start, start),
            FeatureKind::FreeForm => Self::free_form(start),
            FeatureKind::Polygon => Self::polygon(start),
        }
    }

    /// Rebuild a feature from persisted parts. Links are restored by the
    /// tree.
    pub fn from_parts(
        variant: FeatureVariant,
        start: Option<Point2>,
        end: Option<Point2>,
        validity: Validity,
    ) -> Self {
        let mut f = Self::with_variant(variant, start, end);
        f.validity = validity;
        f
    }

    /// The variant's kind.
    pub fn kind(&self) -> FeatureKind {
        match self.variant {
            FeatureVariant::BoxFold(_) => FeatureKind::BoxFold,
            FeatureVariant::MasterCard(_) => FeatureKind::MasterCard,
            FeatureVariant::FreeForm(_) => FeatureKind::FreeForm,
            FeatureVariant::Polygon(_) => FeatureKind::Polygon,
        }
    }

    fn shape(&self) -> &dyn FoldShape {
        match &self.variant {
            FeatureVariant::BoxFold(s) => s,
            FeatureVariant::MasterCard(s) => s,
            FeatureVariant::FreeForm(s) => s,
            FeatureVariant::Polygon(s) => s,
        }
    }

    fn context<'a>(&'a self, params: &'a FeatureParams) -> ShapeContext<'a> {
        ShapeContext {
            start: self.start,
            end: self.end,
            attachment: self.attachment.as_ref(),
            params,
        }
    }

    /// Link to the parent.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Parent feature, if any.
    pub fn parent(&self) -> Option<FeatureId> {
        self.attachment.as_ref().map(|a| a.parent)
    }

    /// The parent fold this feature crosses.
    pub fn driving_fold(&self) -> Option<&Edge> {
        self.attachment.as_ref().map(|a| &a.fold)
    }

    /// Record a parent without linking into it, for live previews.
    pub fn set_provisional_attachment(&mut self, attachment: Option<Attachment>) {
        self.attachment = attachment;
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[FeatureId] {
        &self.children
    }

    /// A leaf has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Validity as of the last edge generation.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Free-form payload.
    pub fn as_free_form(&self) -> Option<&FreeForm> {
        match &self.variant {
            FeatureVariant::FreeForm(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable free-form payload.
    pub fn as_free_form_mut(&mut self) -> Option<&mut FreeForm> {
        match &mut self.variant {
            FeatureVariant::FreeForm(s) => Some(s),
            _ => None,
        }
    }

    /// Polygon payload.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match &self.variant {
            FeatureVariant::Polygon(s) => Some(s),
            _ => None,
        }
    }

    /// Append a polygon vertex; the end anchor follows it. Other variants
    /// ignore the call.
    pub fn add_polygon_point(&mut self, point: Point2) {
        if let FeatureVariant::Polygon(poly) = &mut self.variant {
            poly.add_point(point);
            self.end = Some(point);
        }
    }

    /// Move the polygon vertex near `from` to `to`. Returns whether a
    /// vertex moved.
    pub fn move_poly_point(&mut self, from: &Point2, to: Point2, radius: f64) -> bool {
        let FeatureVariant::Polygon(poly) = &mut self.variant else {
            return false;
        };
        let moved = poly.move_poly_point(from, to, radius);
        if moved {
            self.start = poly.points().first().copied();
            self.end = poly.points().last().copied();
        }
        moved
    }

    /// Follow the cursor during a drag.
    pub fn track_cursor(&mut self, cursor: Point2, params: &FeatureParams) {
        match &mut self.variant {
            FeatureVariant::BoxFold(_) => self.end = Some(cursor),
            FeatureVariant::MasterCard(_) => {}
            FeatureVariant::FreeForm(shape) => {
                self.end = Some(cursor);
                shape.path_through_touch_points(cursor, params);
            }
            FeatureVariant::Polygon(poly) => {
                let far_enough = poly
                    .points()
                    .last()
                    .map_or(true, |last| distance(last, &cursor) > params.min_point_spacing);
                if far_enough {
                    self.add_polygon_point(cursor);
                }
            }
        }
    }

    /// Normalize the anchors to top-left / bottom-right.
    pub fn fix_start_end_point(&mut self) {
        if let (Some(s), Some(e)) = (self.start, self.end) {
            self.start = Some(Point2::new(s.x.min(e.x), s.y.min(e.y)));
            self.end = Some(Point2::new(s.x.max(e.x), s.y.max(e.y)));
        }
    }

    /// Bounds, or `None` while the feature is not placed yet.
    pub fn bounding_box(&self, params: &FeatureParams) -> Option<Rect> {
        self.shape().bounding_box(&self.context(params))
    }

    /// Span test: crossing points if the feature's footprint crosses `fold`.
    pub fn spans_fold(&self, fold: &Edge, params: &FeatureParams) -> Option<Vec<Point2>> {
        let ctx = self.context(params);
        let shape = self.shape();
        let bounds = shape.bounding_box(&ctx)?;
        let fold_rect = fold
            .curve
            .control_bounds()
            .unwrap_or_else(|| Rect::from_corners(&fold.start, &fold.end));
        if !bounds.intersects(&fold_rect) {
            return None;
        }
        shape.spans_fold(&ctx, fold)
    }

    /// Fragments of `fold` left visible around this feature.
    pub fn split_fold_by_occlusion(
        &self,
        fold: &Edge,
        crossings: &[Point2],
        params: &FeatureParams,
    ) -> Vec<Edge> {
        self.shape()
            .split_fold_by_occlusion(&self.context(params), fold, crossings)
    }

    /// Edits offered on tap, given the current number of horizontal folds.
    pub fn tap_options(&self, horizontal_folds: usize) -> Vec<FeatureOption> {
        self.shape().tap_options(self.is_leaf(), horizontal_folds)
    }

    /// Generate edges, splitting horizontal folds around `children`.
    pub fn generate(&self, children: &[&FoldFeature], params: &FeatureParams) -> Generated {
        let raw = self.shape().raw_edges(&self.context(params));
        let tol = Tolerance::DEFAULT;

        let mut horizontal: Vec<Edge> = raw
            .folds
            .iter()
            .flat_map(|fold| edge_split_by_children(fold, children, params))
            .filter(|e| !is_empty_edge(e, &tol))
            .collect();
        horizontal.sort_by(|a, b| a.start.y.total_cmp(&b.start.y));

        let mut edges = horizontal.clone();
        edges.extend(raw.others.into_iter().filter(|e| !is_empty_edge(e, &tol)));
        if raw.master {
            for e in edges.iter_mut().chain(horizontal.iter_mut()) {
                e.is_master = true;
            }
        }
        Generated {
            edges,
            horizontal_folds: horizontal,
            validity: raw.validity,
        }
    }

    /// Feed everything that shapes this feature's footprint into `h`.
    pub(crate) fn hash_footprint(&self, h: &mut dyn Hasher) {
        h.write_u8(self.kind() as u8);
        hash_opt_point(h, self.start.as_ref());
        hash_opt_point(h, self.end.as_ref());
        self.shape().hash_payload(h);
        match &self.attachment {
            Some(a) => {
                h.write_u8(1);
                hash_edge(h, &a.fold);
                hash_points(h, &a.crossings);
            }
            None => h.write_u8(0),
        }
    }
}

/// A zero-length single segment. Closed loops also start where they end
/// but are kept.
fn is_empty_edge(edge: &Edge, tol: &Tolerance) -> bool {
    edge.is_degenerate(tol) && edge.curve.segments().len() <= 1
}

/// Whether `child_fold` lies along `fold`.
fn lies_on(child_fold: &Edge, fold: &Edge, params: &FeatureParams) -> bool {
    [child_fold.start, child_fold.end].iter().all(|p| {
        nearest_point_on_curve(&fold.curve, p, params.bezier_increments)
            .is_some_and(|q| distance(p, &q) <= FOLD_MATCH_TOLERANCE)
    })
}

/// Split `fold` around every child whose driving fold lies along it.
///
/// Children are applied in order, each splitting whichever current
/// fragment it spans.
pub fn edge_split_by_children(
    fold: &Edge,
    children: &[&FoldFeature],
    params: &FeatureParams,
) -> Vec<Edge> {
    let mut fragments = vec![fold.clone()];
    for child in children {
        let Some(attachment) = child.attachment() else {
            continue;
        };
        if !lies_on(&attachment.fold, fold, params) {
            continue;
        }
        fragments = fragments
            .into_iter()
            .flat_map(|frag| match child.spans_fold(&frag, params) {
                Some(crossings) => child.split_fold_by_occlusion(&frag, &crossings, params),
                None => vec![frag],
            })
            .collect();
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_kernel_topo::EdgeKind;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn attached_box(start: Point2, end: Point2, fold: &Edge) -> FoldFeature {
        let mut b = FoldFeature::box_fold(start);
        b.end = Some(end);
        let params = FeatureParams::default();
        let crossings = b.spans_fold(fold, &params).unwrap();
        b.set_provisional_attachment(Some(Attachment {
            parent: FeatureId::default(),
            fold: fold.clone(),
            crossings,
        }));
        b
    }

    #[test]
    fn test_fix_start_end_point() {
        let mut b = FoldFeature::box_fold(p(100.0, 90.0));
        b.end = Some(p(20.0, 40.0));
        b.fix_start_end_point();
        assert_eq!(b.start, Some(p(20.0, 40.0)));
        assert_eq!(b.end, Some(p(100.0, 90.0)));
    }

    #[test]
    fn test_tree_link_is_structural() {
        let fold = Edge::straight(p(0.0, 60.0), p(200.0, 60.0), EdgeKind::Fold);
        let b = attached_box(p(20.0, 40.0), p(100.0, 90.0), &fold);
        assert_eq!(b.parent().is_some(), b.driving_fold().is_some());
        let free = FoldFeature::box_fold(p(0.0, 0.0));
        assert_eq!(free.parent().is_some(), free.driving_fold().is_some());
    }

    #[test]
    fn test_bounding_box_needs_anchors() {
        let params = FeatureParams::default();
        let b = FoldFeature::box_fold(p(10.0, 10.0));
        assert!(b.bounding_box(&params).is_none());
        let fold = Edge::straight(p(0.0, 20.0), p(100.0, 20.0), EdgeKind::Fold);
        assert!(b.spans_fold(&fold, &params).is_none());
    }

    #[test]
    fn test_split_by_children_applies_each_child() {
        let params = FeatureParams::default();
        let fold = Edge::straight(p(0.0, 150.0), p(200.0, 150.0), EdgeKind::Fold);
        let a = attached_box(p(20.0, 100.0), p(60.0, 200.0), &fold);
        let b = attached_box(p(120.0, 100.0), p(180.0, 200.0), &fold);
        let fragments = edge_split_by_children(&fold, &[&a, &b], &params);
        let spans: Vec<(f64, f64)> = fragments.iter().map(|e| (e.start.x, e.end.x)).collect();
        assert_eq!(spans, vec![(0.0, 20.0), (60.0, 120.0), (180.0, 200.0)]);

        // A child hanging off another fold leaves this one alone.
        let other = Edge::straight(p(0.0, 30.0), p(200.0, 30.0), EdgeKind::Fold);
        let c = attached_box(p(20.0, 10.0), p(60.0, 50.0), &other);
        assert_eq!(edge_split_by_children(&fold, &[&c], &params).len(), 1);
    }

    #[test]
    fn test_generate_marks_master() {
        let params = FeatureParams::default();
        let m = FoldFeature::master_card(p(0.0, 0.0), p(200.0, 300.0));
        let g = m.generate(&[], &params);
        assert!(g.edges.iter().all(|e| e.is_master));
        assert!(g.horizontal_folds.iter().all(|e| e.is_master));
    }
}
