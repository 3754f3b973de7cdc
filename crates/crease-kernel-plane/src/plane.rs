//! The plane type.

use crease_kernel_geom::{flatten, Curve};
use crease_kernel_math::{cross, Point2};
use crease_kernel_topo::{EdgeGraph, EdgeId, EdgeKind};
use serde::{Deserialize, Serialize};

use crate::boundary::sanitize;
use crate::{PlaneError, Result};

/// Whether a region is a foldable panel or a cut-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneKind {
    /// No fold on the boundary: the region falls out of the card.
    Hole,
    /// A panel hinged on at least one fold.
    Plane,
}

/// How a panel stands when the card is opened to 90 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Lies flat with the base of the card.
    #[default]
    Horizontal,
    /// Stands upright with the back of the card.
    Vertical,
}

impl Orientation {
    /// The orientation across a fold.
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// One closed region of the edge graph.
///
/// Planes hold half-edge ids into the graph they were built from and are
/// rebuilt whenever that graph changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Half-edges around the region, head to tail.
    pub edges: Vec<EdgeId>,
    /// Hole or plane.
    pub kind: PlaneKind,
    /// Assigned by [`orient`](crate::orient).
    pub orientation: Orientation,
    /// Closed single-subpath boundary.
    pub boundary: Curve,
    outline: Vec<Point2>,
}

impl Plane {
    /// Build a plane from half-edges that form a closed walk.
    pub fn from_edges(graph: &EdgeGraph, edges: Vec<EdgeId>, increments: f64) -> Result<Self> {
        if edges.is_empty() {
            return Err(PlaneError::EmptyBoundary);
        }
        let mut joined = Curve::new();
        let mut has_fold = false;
        for id in &edges {
            let edge = graph.edge(*id)?;
            has_fold |= edge.kind == EdgeKind::Fold;
            joined.append(&edge.curve);
        }
        let boundary = sanitize(&joined)?;
        let outline = flatten(&boundary, increments)
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok(Self {
            edges,
            kind: if has_fold { PlaneKind::Plane } else { PlaneKind::Hole },
            orientation: Orientation::default(),
            boundary,
            outline,
        })
    }

    fn fold_by<F>(&self, graph: &EdgeGraph, better: F) -> Option<EdgeId>
    where
        F: Fn(f64, f64) -> bool,
    {
        let mut best: Option<(EdgeId, f64)> = None;
        for id in &self.edges {
            let Some(edge) = graph.get(*id) else { continue };
            if edge.kind != EdgeKind::Fold {
                continue;
            }
            if best.map_or(true, |(_, y)| better(edge.start.y, y)) {
                best = Some((*id, edge.start.y));
            }
        }
        best.map(|(id, _)| id)
    }

    /// The fold with the smallest start y.
    pub fn bottom_fold(&self, graph: &EdgeGraph) -> Option<EdgeId> {
        self.fold_by(graph, |y, best| y < best)
    }

    /// The fold with the largest start y.
    pub fn top_fold(&self, graph: &EdgeGraph) -> Option<EdgeId> {
        self.fold_by(graph, |y, best| y > best)
    }

    /// Flattened boundary, first point repeated at the end.
    pub fn outline(&self) -> &[Point2] {
        &self.outline
    }

    /// Shoelace area, positive for regions walked with the interior on the
    /// left.
    pub fn signed_area(&self) -> f64 {
        self.outline
            .windows(2)
            .map(|w| cross(&w[0].coords, &w[1].coords))
            .sum::<f64>()
            / 2.0
    }

    /// Area centroid, or the vertex mean for a zero-area outline.
    pub fn centroid(&self) -> Point2 {
        let area = self.signed_area();
        if area.abs() > f64::EPSILON {
            let (mut cx, mut cy) = (0.0, 0.0);
            for w in self.outline.windows(2) {
                let k = cross(&w[0].coords, &w[1].coords);
                cx += (w[0].x + w[1].x) * k;
                cy += (w[0].y + w[1].y) * k;
            }
            return Point2::new(cx / (6.0 * area), cy / (6.0 * area));
        }
        let n = self.outline.len().max(1) as f64;
        let sum = self
            .outline
            .iter()
            .fold(Point2::origin().coords, |acc, p| acc + p.coords);
        Point2::from(sum / n)
    }

    /// Winding-number containment test.
    pub fn contains(&self, point: &Point2) -> bool {
        let mut winding = 0i32;
        for w in self.outline.windows(2) {
            let (a, b) = (w[0], w[1]);
            let side = cross(&(b - a), &(point - a));
            if a.y <= point.y {
                if b.y > point.y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= point.y && side < 0.0 {
                winding -= 1;
            }
        }
        winding != 0
    }

    /// Signed extrusion of the panel in a 3D preview. Holes extrude the
    /// other way so they never sit coplanar with the panel around them.
    pub fn preview_extrusion(&self, depth: f64) -> f64 {
        match self.kind {
            PlaneKind::Plane => depth,
            PlaneKind::Hole => -depth,
        }
    }
}
