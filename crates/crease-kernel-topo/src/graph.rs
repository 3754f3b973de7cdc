//! Half-edge arena.

use slotmap::SlotMap;
use tracing::debug;

use crate::edge::{Edge, EdgeSignature, FoldDirection};
use crate::{EdgeId, Result, TopoError};

/// Arena of paired half-edges.
///
/// Every undirected edge is stored twice, once per direction, and the two
/// halves reference each other through [`Edge::twin`]. Ids stay valid until
/// the edge is removed.
#[derive(Debug, Clone, Default)]
pub struct EdgeGraph {
    edges: SlotMap<EdgeId, Edge>,
    /// Primary half of each pair, in creation order.
    order: Vec<EdgeId>,
}

impl EdgeGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `edge` together with its reversed twin.
    ///
    /// Returns the id of the half running in `edge`'s own direction.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let reversed = edge.reversed();
        let id = self.edges.insert(edge);
        let twin = self.edges.insert(reversed);
        self.edges[id].twin = Some(twin);
        self.edges[twin].twin = Some(id);
        self.order.push(id);
        id
    }

    /// Remove an edge and its twin, returning the half that was asked for.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let edge = self.edges.remove(id).ok_or(TopoError::UnknownEdge(id))?;
        if let Some(twin) = edge.twin {
            self.edges.remove(twin);
            self.order.retain(|e| *e != id && *e != twin);
        } else {
            self.order.retain(|e| *e != id);
        }
        debug!(?id, "removed edge pair");
        Ok(edge)
    }

    /// Look up a half-edge.
    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Look up a half-edge, or fail.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(id).ok_or(TopoError::UnknownEdge(id))
    }

    /// Twin of a half-edge.
    pub fn twin(&self, id: EdgeId) -> Option<EdgeId> {
        self.edges.get(id)?.twin
    }

    /// Whether the id is live.
    pub fn contains(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Number of undirected edges.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the graph holds no edges.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// One half per pair, in creation order.
    pub fn iter_undirected(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.edges.get(*id).map(|e| (*id, e)))
    }

    /// Every half-edge, in arena order.
    pub fn half_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    /// `a` is `b` or its twin.
    pub fn loosely_equal(&self, a: EdgeId, b: EdgeId) -> bool {
        a == b || self.twin(a) == Some(b)
    }

    /// First undirected edge with the given signature.
    pub fn find_by_signature(&self, signature: &EdgeSignature) -> Option<EdgeId> {
        self.iter_undirected()
            .find(|(_, e)| e.signature() == *signature)
            .map(|(id, _)| id)
    }

    /// Set the fold direction on both halves of a pair.
    pub fn set_fold_direction(&mut self, id: EdgeId, direction: FoldDirection) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or(TopoError::UnknownEdge(id))?;
        edge.fold_direction = direction;
        if let Some(twin) = edge.twin {
            if let Some(t) = self.edges.get_mut(twin) {
                t.fold_direction = direction;
            }
        }
        Ok(())
    }

    /// Whether any half-edge has not been through plane assembly yet.
    pub fn has_dirty(&self) -> bool {
        self.edges.values().any(|e| e.dirty)
    }

    /// Clear every dirty flag.
    pub fn mark_clean(&mut self) {
        for edge in self.edges.values_mut() {
            edge.dirty = false;
        }
    }

    /// Check that every twin reference is symmetric.
    pub fn validate(&self) -> Result<()> {
        for (id, edge) in &self.edges {
            if let Some(twin) = edge.twin {
                let back = self.edges.get(twin).and_then(|t| t.twin);
                if back != Some(id) {
                    return Err(TopoError::TwinMismatch(id));
                }
            }
        }
        Ok(())
    }
}
