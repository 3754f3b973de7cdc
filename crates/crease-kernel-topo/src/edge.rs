//! Fold and cut edges.

use crease_kernel_geom::{hit_test, Curve};
use crease_kernel_math::{Point2, Tolerance};
use serde::{Deserialize, Serialize};

use crate::EdgeId;

/// What an edge does to the paper.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EdgeKind {
    /// Crease line.
    Fold,
    /// Cut line.
    #[default]
    Cut,
    /// Glue tab outline.
    Tab,
}

/// Which way a fold bends once the card is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoldDirection {
    /// Mountain fold.
    Hill,
    /// Valley fold.
    Valley,
    /// Not yet determined.
    #[default]
    Unknown,
}

fn dirty_by_default() -> bool {
    true
}

/// One fold or cut segment.
///
/// Edges carry no reference to the feature that produced them. Inside an
/// [`EdgeGraph`](crate::EdgeGraph) every edge is a half-edge whose `twin`
/// runs the same path backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Start point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
    /// Exact path from `start` to `end`.
    pub curve: Curve,
    /// Fold, cut or tab.
    pub kind: EdgeKind,
    /// Bend direction, assigned once planes are known.
    pub fold_direction: FoldDirection,
    /// Part of the master card frame.
    pub is_master: bool,
    /// Reverse half-edge, when the edge lives in a graph.
    #[serde(default)]
    pub twin: Option<EdgeId>,
    /// Plane assembly has not seen this edge yet.
    #[serde(skip, default = "dirty_by_default")]
    pub dirty: bool,
}

impl Edge {
    /// Edge along an arbitrary curve.
    pub fn new(start: Point2, end: Point2, curve: Curve, kind: EdgeKind) -> Self {
        Self {
            start,
            end,
            curve,
            kind,
            fold_direction: FoldDirection::Unknown,
            is_master: false,
            twin: None,
            dirty: true,
        }
    }

    /// Edge along the path's own first and last points.
    ///
    /// An empty path yields a degenerate edge at the origin.
    pub fn along(curve: Curve, kind: EdgeKind) -> Self {
        let start = curve.first_point().unwrap_or_else(Point2::origin);
        let end = curve.last_point().unwrap_or(start);
        Self::new(start, end, curve, kind)
    }

    /// Straight edge between two points.
    pub fn straight(start: Point2, end: Point2, kind: EdgeKind) -> Self {
        Self::new(start, end, Curve::line(start, end), kind)
    }

    /// Mark the edge as part of the master card.
    pub fn into_master(mut self) -> Self {
        self.is_master = true;
        self
    }

    /// The same edge traversed backwards, unpaired.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            curve: self.curve.reversed(),
            kind: self.kind,
            fold_direction: self.fold_direction,
            is_master: self.is_master,
            twin: None,
            dirty: true,
        }
    }

    /// Whether start and end coincide.
    pub fn is_degenerate(&self, tol: &Tolerance) -> bool {
        tol.points_equal(&self.start, &self.end)
    }

    /// Nearest point on the edge if `point` is within `radius` of it.
    pub fn hit_test(&self, point: &Point2, radius: f64, increments: f64) -> Option<Point2> {
        hit_test(&self.curve, point, radius, increments)
    }

    /// Vertical distance between the two edges' start points.
    pub fn y_distance_to(&self, other: &Edge) -> f64 {
        (self.start.y - other.start.y).abs()
    }

    /// Same end points in either direction.
    pub fn same_span(&self, other: &Edge, tol: &Tolerance) -> bool {
        (tol.points_equal(&self.start, &other.start) && tol.points_equal(&self.end, &other.end))
            || (tol.points_equal(&self.start, &other.end) && tol.points_equal(&self.end, &other.start))
    }

    /// Direction-independent identity used to remember erased edges.
    pub fn signature(&self) -> EdgeSignature {
        EdgeSignature::new(&self.start, &self.end, &self.curve, self.kind)
    }
}

/// End points quantized to a thousandth of a unit.
fn quantize(p: &Point2) -> (i64, i64) {
    ((p.x * 1000.0).round() as i64, (p.y * 1000.0).round() as i64)
}

/// Undirected, quantized key of an edge.
///
/// Two edges with the same kind, the same end points (in either order) and
/// the same control hull share a signature, so an edge regenerated by its
/// feature can still be recognized after the graph is rebuilt. The hull
/// tells apart curves that join the same two points along different paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeSignature {
    a: (i64, i64),
    b: (i64, i64),
    kind: EdgeKind,
    #[serde(default)]
    hull: [(i64, i64); 2],
}

impl EdgeSignature {
    /// Signature of a path between two points.
    pub fn new(start: &Point2, end: &Point2, curve: &Curve, kind: EdgeKind) -> Self {
        let (s, e) = (quantize(start), quantize(end));
        let (a, b) = if s <= e { (s, e) } else { (e, s) };
        // The control hull is the same whichever way the curve runs.
        let hull = curve.control_bounds().map_or([a, b], |r| {
            [
                quantize(&Point2::new(r.min_x(), r.min_y())),
                quantize(&Point2::new(r.max_x(), r.max_y())),
            ]
        });
        Self { a, b, kind, hull }
    }
}
