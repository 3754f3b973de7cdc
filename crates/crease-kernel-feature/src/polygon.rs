//! Straight-sided outline through user-placed vertices.

use std::hash::Hasher;

use crease_kernel_math::{distance, Point2, Rect};
use crease_kernel_topo::{Edge, EdgeKind};
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureOption, FoldShape, RawEdges, ShapeContext};
use crate::fingerprint::hash_points;

/// Polygon payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2>,
}

impl Polygon {
    /// Vertices in placement order.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Append a vertex.
    pub fn add_point(&mut self, point: Point2) {
        self.points.push(point);
    }

    /// Index of the vertex nearest to `point` within `radius`.
    pub fn poly_point_at(&self, point: &Point2, radius: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, distance(p, point)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Move the vertex near `from` to `to`.
    pub fn move_poly_point(&mut self, from: &Point2, to: Point2, radius: f64) -> bool {
        match self.poly_point_at(from, radius) {
            Some(i) => {
                self.points[i] = to;
                true
            }
            None => false,
        }
    }
}

impl FoldShape for Polygon {
    fn raw_edges(&self, _ctx: &ShapeContext<'_>) -> RawEdges {
        let others = self
            .points
            .windows(2)
            .map(|w| Edge::straight(w[0], w[1], EdgeKind::Cut))
            .collect();
        RawEdges {
            others,
            ..RawEdges::default()
        }
    }

    fn bounding_box(&self, _ctx: &ShapeContext<'_>) -> Option<Rect> {
        Rect::from_points(&self.points)
    }

    /// Polygons do not hang off folds yet.
    fn spans_fold(&self, _ctx: &ShapeContext<'_>, _fold: &Edge) -> Option<Vec<Point2>> {
        None
    }

    fn tap_options(&self, is_leaf: bool, horizontal_folds: usize) -> Vec<FeatureOption> {
        let mut options = vec![FeatureOption::DeleteFeature];
        if is_leaf && horizontal_folds >= 3 {
            options.push(FeatureOption::MoveFolds);
        }
        options.push(FeatureOption::MovePoints);
        options
    }

    fn hash_payload(&self, h: &mut dyn Hasher) {
        hash_points(h, &self.points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FoldFeature;
    use crate::FeatureParams;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_edges_follow_points() {
        let params = FeatureParams::default();
        let mut f = FoldFeature::polygon(p(0.0, 0.0));
        assert!(f.generate(&[], &params).edges.is_empty());
        f.add_polygon_point(p(10.0, 0.0));
        f.add_polygon_point(p(10.0, 10.0));
        let g = f.generate(&[], &params);
        assert_eq!(g.edges.len(), 2);
        assert!(g.edges.iter().all(|e| e.kind == EdgeKind::Cut));
        assert_eq!(g.edges[1].start, p(10.0, 0.0));
        assert_eq!(f.end, Some(p(10.0, 10.0)));
    }

    #[test]
    fn test_move_poly_point() {
        let mut f = FoldFeature::polygon(p(0.0, 0.0));
        f.add_polygon_point(p(10.0, 0.0));
        assert!(f.move_poly_point(&p(9.0, 1.0), p(12.0, 3.0), 5.0));
        assert_eq!(f.as_polygon().unwrap().points()[1], p(12.0, 3.0));
        assert_eq!(f.end, Some(p(12.0, 3.0)));
        assert!(!f.move_poly_point(&p(50.0, 50.0), p(0.0, 0.0), 5.0));
    }

    #[test]
    fn test_never_spans_and_tap_options() {
        let params = FeatureParams::default();
        let mut f = FoldFeature::polygon(p(10.0, 0.0));
        f.add_polygon_point(p(10.0, 100.0));
        let fold = Edge::straight(p(0.0, 50.0), p(100.0, 50.0), EdgeKind::Fold);
        assert!(f.spans_fold(&fold, &params).is_none());
        assert_eq!(
            f.tap_options(0),
            vec![FeatureOption::DeleteFeature, FeatureOption::MovePoints]
        );
        assert_eq!(
            f.tap_options(3),
            vec![
                FeatureOption::DeleteFeature,
                FeatureOption::MoveFolds,
                FeatureOption::MovePoints
            ]
        );
    }
}
