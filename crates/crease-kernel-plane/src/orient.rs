//! Plane discovery, orientation and fold direction.

use std::collections::VecDeque;

use crease_kernel_topo::{EdgeGraph, EdgeId, EdgeKind, FoldDirection};
use tracing::debug;

use crate::faces::find_faces;
use crate::plane::{Orientation, Plane};
use crate::Result;

/// Faces with no more area than this are dropped.
const MIN_PLANE_AREA: f64 = 1e-6;

/// Build every bounded plane of `graph` and orient them from `seed`.
///
/// `seed` is the card's top edge (either half); the plane under it stands
/// vertical.
pub fn assemble(graph: &EdgeGraph, seed: Option<EdgeId>, increments: f64) -> Result<Vec<Plane>> {
    let mut planes = Vec::new();
    for face in find_faces(graph) {
        let plane = Plane::from_edges(graph, face, increments)?;
        if plane.signed_area() > MIN_PLANE_AREA {
            planes.push(plane);
        }
    }
    orient(&mut planes, graph, seed);
    debug!(planes = planes.len(), "assembled planes");
    Ok(planes)
}

fn plane_with(planes: &[Plane], id: EdgeId) -> Option<usize> {
    planes.iter().position(|p| p.edges.contains(&id))
}

/// Alternate orientation across folds, breadth first from the plane that
/// holds `seed`. Planes not connected to it through folds stay horizontal.
pub fn orient(planes: &mut [Plane], graph: &EdgeGraph, seed: Option<EdgeId>) {
    for plane in planes.iter_mut() {
        plane.orientation = Orientation::Horizontal;
    }
    let Some(seed) = seed else { return };
    let start = plane_with(planes, seed).or_else(|| plane_with(planes, graph.twin(seed)?));
    let Some(start) = start else { return };

    let mut seen = vec![false; planes.len()];
    seen[start] = true;
    planes[start].orientation = Orientation::Vertical;
    let mut queue = VecDeque::from([start]);
    while let Some(i) = queue.pop_front() {
        let across: Vec<usize> = planes[i]
            .edges
            .iter()
            .filter(|id| graph.get(**id).is_some_and(|e| e.kind == EdgeKind::Fold))
            .filter_map(|id| plane_with(planes, graph.twin(*id)?))
            .collect();
        let flipped = planes[i].orientation.flipped();
        for j in across {
            if !seen[j] {
                seen[j] = true;
                planes[j].orientation = flipped;
                queue.push_back(j);
            }
        }
    }
    let unreached = seen.iter().filter(|s| !**s).count();
    if unreached > 0 {
        debug!(unreached, "planes not connected to the card top, left horizontal");
    }
}

/// Mountain or valley for every fold, from the planes on either side.
///
/// The upper plane is the one whose centroid has the smaller y. A vertical
/// plane above a horizontal one makes a valley, the reverse a hill; any
/// other arrangement, or a fold without a plane on both sides, is unknown.
pub fn fold_directions(planes: &[Plane], graph: &EdgeGraph) -> Vec<(EdgeId, FoldDirection)> {
    graph
        .iter_undirected()
        .filter(|(_, e)| e.kind == EdgeKind::Fold)
        .map(|(id, e)| {
            let sides = plane_with(planes, id).zip(e.twin.and_then(|t| plane_with(planes, t)));
            let direction = match sides {
                Some((a, b)) => {
                    let (upper, lower) = if planes[a].centroid().y <= planes[b].centroid().y {
                        (&planes[a], &planes[b])
                    } else {
                        (&planes[b], &planes[a])
                    };
                    match (upper.orientation, lower.orientation) {
                        (Orientation::Vertical, Orientation::Horizontal) => FoldDirection::Valley,
                        (Orientation::Horizontal, Orientation::Vertical) => FoldDirection::Hill,
                        _ => FoldDirection::Unknown,
                    }
                }
                None => FoldDirection::Unknown,
            };
            (id, direction)
        })
        .collect()
}
