#![warn(missing_docs)]

//! Plane assembly for the crease kernel.
//!
//! A plane is one panel of the card: a closed region of the edge graph
//! whose boundary is stitched from the curves of the half-edges around it.
//! Faces are discovered with an angular walk over the [`EdgeGraph`], then
//! classified as holes or planes and given an orientation by alternating
//! across fold edges, starting from the panel under the card's top edge.
//!
//! # Example
//!
//! ```
//! use crease_kernel_math::Point2;
//! use crease_kernel_plane::{assemble, Orientation};
//! use crease_kernel_topo::{Edge, EdgeGraph, EdgeKind};
//!
//! let p = |x, y| Point2::new(x, y);
//! let mut graph = EdgeGraph::new();
//! let top = graph.add_edge(Edge::straight(p(0.0, 0.0), p(100.0, 0.0), EdgeKind::Cut));
//! graph.add_edge(Edge::straight(p(100.0, 0.0), p(100.0, 50.0), EdgeKind::Cut));
//! graph.add_edge(Edge::straight(p(100.0, 50.0), p(0.0, 50.0), EdgeKind::Fold));
//! graph.add_edge(Edge::straight(p(0.0, 50.0), p(0.0, 0.0), EdgeKind::Cut));
//!
//! let planes = assemble(&graph, Some(top), 0.02).unwrap();
//! assert_eq!(planes.len(), 1);
//! assert_eq!(planes[0].orientation, Orientation::Vertical);
//! assert!(planes[0].boundary.is_closed());
//! ```

mod boundary;
mod faces;
mod orient;
mod plane;

pub use boundary::sanitize;
pub use faces::find_faces;
pub use orient::{assemble, fold_directions, orient};
pub use plane::{Orientation, Plane, PlaneKind};

use crease_kernel_geom::GeomError;
use crease_kernel_topo::TopoError;
use thiserror::Error;

/// Errors from plane assembly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaneError {
    /// The boundary has no drawing commands.
    #[error("plane boundary is empty")]
    EmptyBoundary,

    /// Underlying curve operation failed.
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// The edge graph is inconsistent.
    #[error(transparent)]
    Topo(#[from] TopoError),
}

/// Result type for plane operations.
pub type Result<T> = std::result::Result<T, PlaneError>;
