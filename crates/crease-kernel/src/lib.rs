#![warn(missing_docs)]

//! Pop-up card sketch facade for crease.
//!
//! Provides the [`Sketch`] type: the fold tree of a card, the edge graph it
//! produces and the planes that graph encloses, driven by the feature
//! lifecycle of an interactive editor. Sketches persist as JSON snapshots
//! and cross thread boundaries through [`SharedSketch`].
//!
//! # Example
//!
//! ```
//! use crease_kernel::{EngineConfig, FeatureKind, Point2, Sketch};
//!
//! let mut sketch = Sketch::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(200.0, 300.0),
//!     EngineConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(sketch.current_edges().len(), 7);
//!
//! sketch.begin_feature(FeatureKind::BoxFold, Point2::new(50.0, 100.0)).unwrap();
//! sketch.update_feature(Point2::new(150.0, 200.0)).unwrap();
//! sketch.finalize_feature().unwrap();
//! assert_eq!(sketch.current_planes().len(), 4);
//! ```

pub use crease_kernel_feature;
pub use crease_kernel_geom;
pub use crease_kernel_math;
pub use crease_kernel_plane;
pub use crease_kernel_topo;

mod config;
mod shared;
mod sketch;
mod snapshot;
mod style;

pub use config::EngineConfig;
pub use shared::{RedrawGate, RedrawStart, RedrawStatus, SharedSketch};
pub use sketch::Sketch;
pub use snapshot::{FeatureRecord, SketchSnapshot, SNAPSHOT_VERSION};
pub use style::{Color, Medium, Palette, StrokeStyle};

pub use crease_kernel_feature::{FeatureId, FeatureKind, FeatureOption, Validity};
pub use crease_kernel_math::Point2;
pub use crease_kernel_plane::{Orientation, Plane, PlaneKind};
pub use crease_kernel_topo::{Edge, EdgeId, EdgeKind, FoldDirection};

use crease_kernel_feature::FeatureError;
use crease_kernel_geom::GeomError;
use crease_kernel_plane::PlaneError;
use crease_kernel_topo::TopoError;
use thiserror::Error;

/// Errors from sketch operations.
#[derive(Debug, Error)]
pub enum SketchError {
    /// No feature is being drawn.
    #[error("no feature is being drawn")]
    NoActiveFeature,

    /// A feature is already being drawn.
    #[error("a feature is already being drawn")]
    FeatureInProgress,

    /// The finished feature crosses no fold and was discarded.
    #[error("feature spans no fold")]
    NoSpannedFold,

    /// Master card edges cannot be erased.
    #[error("master card edges cannot be erased")]
    MasterEdge,

    /// The operation does not apply to this kind of feature.
    #[error("operation not available for {0:?}")]
    WrongFeatureKind(FeatureKind),

    /// Fold tree failure.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Edge graph failure.
    #[error(transparent)]
    Topo(#[from] TopoError),

    /// Plane assembly failure.
    #[error(transparent)]
    Plane(#[from] PlaneError),

    /// Curve operation failure.
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// JSON (de)serialization failed.
    #[error("snapshot serialization failed: {0}")]
    Persist(#[from] serde_json::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A snapshot describes an impossible tree.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for sketch operations.
pub type Result<T> = std::result::Result<T, SketchError>;
