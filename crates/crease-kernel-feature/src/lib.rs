#![warn(missing_docs)]

//! Fold features for the crease kernel.
//!
//! A feature is one shape the user drew on the card: a box fold, a
//! free-form outline, a polygon, or the master card itself. Features form a
//! tree rooted at the master card; a child hangs off the parent fold edge
//! its footprint crosses (its *driving fold*), and the parent's folds are
//! split around every child that occludes them.
//!
//! The tree is an arena ([`FeatureTree`]) indexed by [`FeatureId`]. Edge
//! generation is memoized per feature, keyed on a fingerprint of everything
//! that feeds it, so a cached edge list can never be stale.
//!
//! # Example
//!
//! ```
//! use crease_kernel_feature::{FeatureParams, FeatureTree, FoldFeature};
//! use crease_kernel_math::Point2;
//!
//! let params = FeatureParams::default();
//! let mut tree = FeatureTree::new(Point2::new(0.0, 0.0), Point2::new(200.0, 300.0));
//! let root = tree.root();
//!
//! let mut card = FoldFeature::box_fold(Point2::new(50.0, 100.0));
//! card.end = Some(Point2::new(150.0, 200.0));
//! let attachment = tree.find_spanned_fold(&card, &params).unwrap().unwrap();
//! assert_eq!(attachment.parent, root);
//! tree.attach(card, attachment).unwrap();
//!
//! // The master fold now has a gap under the box.
//! assert_eq!(tree.horizontal_folds(root, &params).unwrap().len(), 2);
//! ```

mod box_fold;
mod feature;
mod fingerprint;
mod free_form;
mod master_card;
mod polygon;
mod tree;

pub use box_fold::BoxFold;
pub use feature::{
    Attachment, FeatureKind, FeatureOption, FeatureVariant, FoldFeature, FoldShape, Generated,
    RawEdges, ShapeContext, Validity,
};
pub use free_form::FreeForm;
pub use master_card::MasterCard;
pub use polygon::Polygon;
pub use tree::FeatureTree;

use std::hash::Hasher;

use crease_kernel_geom::{GeomError, DEFAULT_BEZIER_INCREMENTS};
use thiserror::Error;

slotmap::new_key_type! {
    /// Stable id of a feature in a [`FeatureTree`].
    pub struct FeatureId;
}

/// Geometry settings that feed edge generation and hit testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureParams {
    /// Parameter step when flattening Bezier segments.
    pub bezier_increments: f64,
    /// Douglas-Peucker tolerance for smoothing split outlines.
    pub simplify_epsilon: f64,
    /// Base hit radius.
    pub hit_test_radius: f64,
    /// Multiplier on the hit radius for feature edge hits.
    pub feature_hit_scale: f64,
    /// Freehand samples closer than this to the previous one are ignored.
    pub min_point_spacing: f64,
    /// A freehand stroke closes only once it has more samples than this.
    pub close_min_points: usize,
    /// Shortest meaningful stroke; a stroke closes when the cursor comes
    /// back within twice this distance of its start.
    pub min_line_length: f64,
    /// Catmull-Rom knot parameterization.
    pub catmull_rom_alpha: f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            bezier_increments: DEFAULT_BEZIER_INCREMENTS,
            simplify_epsilon: 1.5,
            hit_test_radius: 10.0,
            feature_hit_scale: 3.5,
            min_point_spacing: 5.0,
            close_min_points: 7,
            min_line_length: 20.0,
            catmull_rom_alpha: 1.0,
        }
    }
}

impl FeatureParams {
    pub(crate) fn hash_into(&self, h: &mut dyn Hasher) {
        h.write_u64(self.bezier_increments.to_bits());
        h.write_u64(self.simplify_epsilon.to_bits());
    }
}

/// Errors from feature tree operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// The id does not name a live feature.
    #[error("unknown feature {0:?}")]
    UnknownFeature(FeatureId),

    /// The feature has no start or end point yet.
    #[error("feature has no anchor points yet")]
    MissingAnchor,

    /// The master card is the root and cannot be removed.
    #[error("the master card cannot be removed")]
    CannotRemoveRoot,

    /// A tree has exactly one master card.
    #[error("the tree already has a master card")]
    AlreadyAttached,

    /// Parent and child links disagree.
    #[error("feature {0:?} breaks the tree invariant")]
    BrokenTree(FeatureId),

    /// Underlying curve operation failed.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;
