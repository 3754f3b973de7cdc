#![warn(missing_docs)]

//! Edge topology for the crease kernel.
//!
//! An [`Edge`] is one fold, cut or tab segment of the card. Edges are kept
//! in an [`EdgeGraph`], a slotmap arena of half-edges where each undirected
//! edge is stored once per direction and the two halves are paired through
//! their `twin` ids. Planes are discovered by walking these half-edges.

mod edge;
mod graph;

pub use edge::{Edge, EdgeKind, EdgeSignature, FoldDirection};
pub use graph::EdgeGraph;

use thiserror::Error;

slotmap::new_key_type! {
    /// Stable id of a half-edge in an [`EdgeGraph`].
    pub struct EdgeId;
}

/// Errors from edge graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopoError {
    /// The id does not name a live half-edge.
    #[error("unknown edge {0:?}")]
    UnknownEdge(EdgeId),

    /// A twin reference does not point back.
    #[error("twin of edge {0:?} does not reference it back")]
    TwinMismatch(EdgeId),
}

/// Result type for edge graph operations.
pub type Result<T> = std::result::Result<T, TopoError>;
