//! Face discovery on the half-edge graph.
//!
//! Half-edges leaving each vertex are ordered by the angle of their start
//! tangent. Walking from a half-edge `h`, the next half-edge is the one just
//! before `twin(h)` in that order around `h`'s end vertex, which keeps the
//! face on the left of every step. Each half-edge lies on exactly one face;
//! bounded faces come out with positive area and the unbounded one with
//! negative area.

use std::collections::HashMap;

use crease_kernel_math::{distance, Point2};
use crease_kernel_topo::{Edge, EdgeGraph, EdgeId};
use tracing::debug;

/// End points closer than this are the same vertex.
const VERTEX_MERGE_TOLERANCE: f64 = 1e-3;

struct Half {
    id: EdgeId,
    twin: Option<EdgeId>,
    origin: usize,
    dest: usize,
    angle: f64,
}

fn vertex_index(vertices: &mut Vec<Point2>, p: &Point2) -> usize {
    if let Some(i) = vertices
        .iter()
        .position(|v| distance(v, p) <= VERTEX_MERGE_TOLERANCE)
    {
        return i;
    }
    vertices.push(*p);
    vertices.len() - 1
}

fn leaving_angle(edge: &Edge) -> f64 {
    let dir = edge
        .curve
        .start_tangent()
        .unwrap_or_else(|| edge.end - edge.start);
    dir.y.atan2(dir.x)
}

/// Every closed walk in the graph, as half-edge ids in walk order.
///
/// Walks are returned in creation order of their first half-edge and
/// include the unbounded outer face of each connected component.
pub fn find_faces(graph: &EdgeGraph) -> Vec<Vec<EdgeId>> {
    let mut vertices = Vec::new();
    let mut halves = Vec::with_capacity(graph.len() * 2);
    for (id, edge) in graph.iter_undirected() {
        let twin = edge.twin.and_then(|t| graph.get(t).map(|e| (t, e)));
        for (hid, h) in std::iter::once((id, edge)).chain(twin) {
            halves.push(Half {
                id: hid,
                twin: h.twin,
                origin: vertex_index(&mut vertices, &h.start),
                dest: vertex_index(&mut vertices, &h.end),
                angle: leaving_angle(h),
            });
        }
    }

    let index_of: HashMap<EdgeId, usize> = halves.iter().enumerate().map(|(i, h)| (h.id, i)).collect();

    let mut leaving: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
    for (i, h) in halves.iter().enumerate() {
        leaving[h.origin].push(i);
    }
    let mut slot = vec![0; halves.len()];
    for around in &mut leaving {
        around.sort_by(|a, b| halves[*a].angle.total_cmp(&halves[*b].angle));
        for (k, h) in around.iter().enumerate() {
            slot[*h] = k;
        }
    }

    let next = |i: usize| -> Option<usize> {
        let twin = *index_of.get(&halves[i].twin?)?;
        let around = &leaving[halves[i].dest];
        if halves[twin].origin != halves[i].dest || around.is_empty() {
            return None;
        }
        Some(around[(slot[twin] + around.len() - 1) % around.len()])
    };

    let mut used = vec![false; halves.len()];
    let mut faces = Vec::new();
    for start in 0..halves.len() {
        if used[start] {
            continue;
        }
        let mut walk = vec![start];
        used[start] = true;
        let mut cur = start;
        let closed = loop {
            let Some(n) = next(cur) else { break false };
            if n == start {
                break true;
            }
            if used[n] || walk.len() > halves.len() {
                break false;
            }
            used[n] = true;
            walk.push(n);
            cur = n;
        };
        if closed {
            faces.push(walk.into_iter().map(|i| halves[i].id).collect());
        }
    }
    debug!(vertices = vertices.len(), faces = faces.len(), "walked faces");
    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_kernel_topo::EdgeKind;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn line(graph: &mut EdgeGraph, a: Point2, b: Point2) -> EdgeId {
        graph.add_edge(Edge::straight(a, b, EdgeKind::Cut))
    }

    #[test]
    fn test_square_has_inner_and_outer_face() {
        let mut graph = EdgeGraph::new();
        line(&mut graph, p(0.0, 0.0), p(10.0, 0.0));
        line(&mut graph, p(10.0, 0.0), p(10.0, 10.0));
        line(&mut graph, p(10.0, 10.0), p(0.0, 10.0));
        line(&mut graph, p(0.0, 10.0), p(0.0, 0.0));
        let faces = find_faces(&graph);
        assert_eq!(faces.len(), 2);
        assert!(faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn test_every_half_edge_used_once() {
        let mut graph = EdgeGraph::new();
        line(&mut graph, p(0.0, 0.0), p(10.0, 0.0));
        line(&mut graph, p(10.0, 0.0), p(10.0, 10.0));
        line(&mut graph, p(10.0, 10.0), p(0.0, 10.0));
        line(&mut graph, p(0.0, 10.0), p(0.0, 0.0));
        line(&mut graph, p(0.0, 5.0), p(10.0, 5.0));
        // The divider's ends sit on the sides without splitting them, so it
        // hangs loose inside the square.
        let faces = find_faces(&graph);
        assert_eq!(faces.len(), 3);
        let used: usize = faces.iter().map(Vec::len).sum();
        assert_eq!(used, graph.len() * 2);
    }

    #[test]
    fn test_dangling_edge_walks_both_sides() {
        let mut graph = EdgeGraph::new();
        let a = line(&mut graph, p(0.0, 0.0), p(10.0, 0.0));
        let faces = find_faces(&graph);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0], vec![a, graph.twin(a).unwrap()]);
    }

    #[test]
    fn test_merges_nearby_vertices() {
        let mut graph = EdgeGraph::new();
        line(&mut graph, p(0.0, 0.0), p(10.0, 0.0));
        line(&mut graph, p(10.0, 0.0001), p(0.0, 10.0));
        line(&mut graph, p(0.0, 10.0), p(0.0, 0.0));
        let faces = find_faces(&graph);
        assert_eq!(faces.len(), 2);
    }
}
