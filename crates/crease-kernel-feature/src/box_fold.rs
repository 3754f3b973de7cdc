//! Rectangular pop-up.
//!
//! ```text
//!                  h0
//!            S- - - - -
//!         s0 |         | e0
//!            |     h1  |
//!            - - - - - -
//!         s1 |         | e1
//!     _ _ _ _|         |_ _ _ _ _ driving
//!            |         |
//!         s2 |     h2  | e2
//!            - - - - - E
//! ```

use crease_kernel_math::{Point2, Rect};
use crease_kernel_topo::{Edge, EdgeKind};
use serde::{Deserialize, Serialize};

use crate::feature::{anchors_span_fold, FeatureOption, FoldShape, RawEdges, ShapeContext};

/// Box fold payload. The shape is fully described by its anchors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxFold;

impl FoldShape for BoxFold {
    fn raw_edges(&self, ctx: &ShapeContext<'_>) -> RawEdges {
        let Some((tl, br)) = ctx.corners() else {
            return RawEdges::default();
        };

        let h0 = Edge::straight(tl, Point2::new(br.x, tl.y), EdgeKind::Fold);
        let h2 = Edge::straight(Point2::new(tl.x, br.y), br, EdgeKind::Fold);

        let Some(drive) = ctx.attachment.map(|a| &a.fold) else {
            let s0 = Edge::straight(br, Point2::new(br.x, tl.y), EdgeKind::Cut);
            let e0 = Edge::straight(tl, Point2::new(tl.x, br.y), EdgeKind::Cut);
            return RawEdges {
                folds: vec![h0, h2],
                others: vec![s0, e0],
                ..RawEdges::default()
            };
        };

        // The middle fold sits as far below the top as the driving fold sits
        // above the bottom.
        let drive_y = drive.start.y;
        let h1_y = tl.y + (br.y - drive_y);
        let h1 = Edge::straight(Point2::new(tl.x, h1_y), Point2::new(br.x, h1_y), EdgeKind::Fold);

        // The driving fold's span under the box joins the cuts but is not an
        // edge of the box.
        let mut levels = vec![tl.y, drive_y, h1_y, br.y];
        levels.sort_by(f64::total_cmp);

        let mut cuts = Vec::with_capacity(6);
        for pair in levels.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            cuts.push(Edge::straight(
                Point2::new(tl.x, upper),
                Point2::new(tl.x, lower),
                EdgeKind::Cut,
            ));
            cuts.push(Edge::straight(
                Point2::new(br.x, upper),
                Point2::new(br.x, lower),
                EdgeKind::Cut,
            ));
        }

        RawEdges {
            folds: vec![h0, h1, h2],
            others: cuts,
            ..RawEdges::default()
        }
    }

    /// The box hides the fold between its left and right sides.
    fn split_fold_by_occlusion(
        &self,
        ctx: &ShapeContext<'_>,
        fold: &Edge,
        _crossings: &[Point2],
    ) -> Vec<Edge> {
        let Some((tl, br)) = ctx.corners() else {
            return vec![fold.clone()];
        };
        let y = fold.start.y;
        vec![
            Edge::straight(fold.start, Point2::new(tl.x, y), EdgeKind::Fold),
            Edge::straight(Point2::new(br.x, y), fold.end, EdgeKind::Fold),
        ]
    }

    fn bounding_box(&self, ctx: &ShapeContext<'_>) -> Option<Rect> {
        let (tl, br) = ctx.corners()?;
        Some(Rect::from_corners(&tl, &br))
    }

    fn spans_fold(&self, ctx: &ShapeContext<'_>, fold: &Edge) -> Option<Vec<Point2>> {
        anchors_span_fold(ctx, fold)
    }

    fn tap_options(&self, is_leaf: bool, _horizontal_folds: usize) -> Vec<FeatureOption> {
        let mut options = vec![FeatureOption::DeleteFeature];
        if is_leaf {
            options.push(FeatureOption::AddFolds);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use crate::feature::{Attachment, FeatureOption, FoldFeature};
    use crate::{FeatureId, FeatureParams};
    use crease_kernel_math::Point2;
    use crease_kernel_topo::{Edge, EdgeKind};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn placed_box() -> FoldFeature {
        let mut b = FoldFeature::box_fold(p(20.0, 40.0));
        b.end = Some(p(100.0, 90.0));
        b
    }

    fn drive() -> Edge {
        Edge::straight(p(0.0, 60.0), p(200.0, 60.0), EdgeKind::Fold)
    }

    fn attach(b: &mut FoldFeature) {
        let params = FeatureParams::default();
        let crossings = b.spans_fold(&drive(), &params).unwrap();
        b.set_provisional_attachment(Some(Attachment {
            parent: FeatureId::default(),
            fold: drive(),
            crossings,
        }));
    }

    #[test]
    fn test_unattached_box_has_four_edges() {
        let g = placed_box().generate(&[], &FeatureParams::default());
        assert_eq!(g.edges.len(), 4);
        let folds = g.edges.iter().filter(|e| e.kind == EdgeKind::Fold).count();
        assert_eq!(folds, 2);
        assert_eq!(g.horizontal_folds.len(), 2);
        assert_eq!(g.horizontal_folds[0].start.y, 40.0);
        assert_eq!(g.horizontal_folds[1].start.y, 90.0);
    }

    #[test]
    fn test_driven_box_adds_middle_fold_and_cuts() {
        let mut b = placed_box();
        attach(&mut b);
        let g = b.generate(&[], &FeatureParams::default());

        let folds: Vec<&Edge> = g.edges.iter().filter(|e| e.kind == EdgeKind::Fold).collect();
        let cuts = g.edges.iter().filter(|e| e.kind == EdgeKind::Cut).count();
        assert_eq!(folds.len(), 3);
        assert!(cuts >= 2);
        assert_eq!(cuts, 6);

        let ys: Vec<f64> = g.horizontal_folds.iter().map(|e| e.start.y).collect();
        assert_eq!(ys, vec![40.0, 70.0, 90.0]);
    }

    #[test]
    fn test_symmetric_box_drops_zero_length_cuts() {
        let mut b = FoldFeature::box_fold(p(20.0, 30.0));
        b.end = Some(p(100.0, 90.0));
        attach(&mut b);
        let g = b.generate(&[], &FeatureParams::default());
        // h1 lands on the driving fold, so the cut between them vanishes.
        let cuts = g.edges.iter().filter(|e| e.kind == EdgeKind::Cut).count();
        assert_eq!(cuts, 4);
    }

    #[test]
    fn test_occlusion_split_covers_fold() {
        let params = FeatureParams::default();
        let mut b = placed_box();
        attach(&mut b);
        let fold = drive();
        let crossings = b.spans_fold(&fold, &params).unwrap();
        let pieces = b.split_fold_by_occlusion(&fold, &crossings, &params);
        assert_eq!(pieces.len(), 2);

        // Left piece, the box's own span, then the right piece.
        let (l, r) = (&pieces[0], &pieces[1]);
        let (box_left, box_right) = (b.start.unwrap().x, b.end.unwrap().x);
        assert_eq!(l.start.x, fold.start.x);
        assert_eq!(l.end.x, box_left);
        assert_eq!(r.start.x, box_right);
        assert_eq!(r.end.x, fold.end.x);
        let covered = (l.end.x - l.start.x) + (box_right - box_left) + (r.end.x - r.start.x);
        assert_eq!(covered, fold.end.x - fold.start.x);
    }

    #[test]
    fn test_span_requires_anchors_inside_fold() {
        let params = FeatureParams::default();
        let b = placed_box();
        assert!(b.spans_fold(&drive(), &params).is_some());

        let short = Edge::straight(p(50.0, 60.0), p(200.0, 60.0), EdgeKind::Fold);
        assert!(b.spans_fold(&short, &params).is_none());

        let below = Edge::straight(p(0.0, 95.0), p(200.0, 95.0), EdgeKind::Fold);
        assert!(b.spans_fold(&below, &params).is_none());
    }

    #[test]
    fn test_tap_options() {
        let b = placed_box();
        assert_eq!(
            b.tap_options(2),
            vec![FeatureOption::DeleteFeature, FeatureOption::AddFolds]
        );
    }
}
