//! The card itself: the root of every fold tree.
//!
//! ```text
//!         top
//!   S_______________
//!   |              |
//! l0|              |r0
//!   |              |
//!   |_ _ master _ _|
//!   |              |
//! l1|              |r1
//!   |              |
//!   ---------------E
//!        bottom
//! ```

use crease_kernel_math::{Point2, Rect};
use crease_kernel_topo::{Edge, EdgeKind};
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureOption, FoldShape, RawEdges, ShapeContext};

/// Master card payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterCard;

impl MasterCard {
    /// The top cut, which anchors plane orientation.
    pub fn top_edge(top_left: Point2, bottom_right: Point2) -> Edge {
        Edge::straight(top_left, Point2::new(bottom_right.x, top_left.y), EdgeKind::Cut)
    }
}

impl FoldShape for MasterCard {
    fn raw_edges(&self, ctx: &ShapeContext<'_>) -> RawEdges {
        let Some((tl, br)) = ctx.corners() else {
            return RawEdges::default();
        };
        let mid_y = tl.y + (br.y - tl.y) / 2.0;
        let left_mid = Point2::new(tl.x, mid_y);
        let right_mid = Point2::new(br.x, mid_y);

        let top = Self::top_edge(tl, br);
        let bottom = Edge::straight(br, Point2::new(tl.x, br.y), EdgeKind::Cut);
        let l0 = Edge::straight(tl, left_mid, EdgeKind::Cut);
        let l1 = Edge::straight(left_mid, Point2::new(tl.x, br.y), EdgeKind::Cut);
        let r1 = Edge::straight(br, right_mid, EdgeKind::Cut);
        let r0 = Edge::straight(right_mid, Point2::new(br.x, tl.y), EdgeKind::Cut);
        let master = Edge::straight(left_mid, right_mid, EdgeKind::Fold);

        RawEdges {
            folds: vec![master],
            others: vec![top, bottom, l0, l1, r0, r1],
            master: true,
            ..RawEdges::default()
        }
    }

    fn bounding_box(&self, ctx: &ShapeContext<'_>) -> Option<Rect> {
        let (tl, br) = ctx.corners()?;
        Some(Rect::from_corners(&tl, &br))
    }

    /// The root never hangs off another fold.
    fn spans_fold(&self, _ctx: &ShapeContext<'_>, _fold: &Edge) -> Option<Vec<Point2>> {
        None
    }

    fn tap_options(&self, _is_leaf: bool, _horizontal_folds: usize) -> Vec<FeatureOption> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::feature::FoldFeature;
    use crate::FeatureParams;
    use crease_kernel_math::Point2;
    use crease_kernel_topo::{Edge, EdgeKind};

    #[test]
    fn test_master_card_edges() {
        let m = FoldFeature::master_card(Point2::new(0.0, 0.0), Point2::new(200.0, 300.0));
        let g = m.generate(&[], &FeatureParams::default());
        let cuts = g.edges.iter().filter(|e| e.kind == EdgeKind::Cut).count();
        let folds: Vec<&Edge> = g.edges.iter().filter(|e| e.kind == EdgeKind::Fold).collect();
        assert_eq!(cuts, 6);
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].start, Point2::new(0.0, 150.0));
        assert_eq!(folds[0].end, Point2::new(200.0, 150.0));
        assert_eq!(g.horizontal_folds, vec![folds[0].clone()]);
        assert!(m.tap_options(1).is_empty());
    }

    #[test]
    fn test_master_never_spans() {
        let params = FeatureParams::default();
        let m = FoldFeature::master_card(Point2::new(0.0, 0.0), Point2::new(200.0, 300.0));
        let fold = Edge::straight(Point2::new(-10.0, 100.0), Point2::new(300.0, 100.0), EdgeKind::Fold);
        assert!(m.spans_fold(&fold, &params).is_none());
    }
}
