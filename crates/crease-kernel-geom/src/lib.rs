#![warn(missing_docs)]

//! Curve geometry for the crease kernel.
//!
//! Provides the piecewise Bezier [`Curve`] type that every edge and plane
//! boundary is made of, together with the algorithms that operate on it:
//!
//! - [`bezier`]: Bernstein evaluation of quadratic and cubic segments
//! - [`sample`]: step-length sampling, flattening, nearest point and hit tests
//! - [`simplify`]: Douglas-Peucker polyline simplification
//! - [`reconstruct`]: smooth curves through point sequences (stride cubic
//!   smoothing and Catmull-Rom interpolation)
//! - [`intersect`]: curve/curve and segment/segment intersection
//! - [`split`]: cutting a curve at points known to lie on it
//!
//! # Example
//!
//! ```
//! use crease_kernel_geom::{intersect, Curve};
//! use crease_kernel_math::Point2;
//!
//! let fold = Curve::line(Point2::new(0.0, 100.0), Point2::new(200.0, 100.0));
//! let mut shape = Curve::new();
//! shape.move_to(Point2::new(50.0, 50.0));
//! shape.line_to(Point2::new(50.0, 150.0));
//! shape.line_to(Point2::new(150.0, 150.0));
//! shape.line_to(Point2::new(150.0, 50.0));
//! shape.close();
//!
//! let hits = intersect(&fold, &shape).unwrap();
//! assert_eq!(hits.len(), 2);
//! assert!(hits[0].x < hits[1].x);
//! ```

pub mod bezier;
mod curve;
pub mod intersect;
pub mod reconstruct;
pub mod sample;
pub mod simplify;
pub mod split;

pub use bezier::{evaluate_cubic, evaluate_quad};
pub use curve::{Curve, PathCommand, Segment};
pub use intersect::{intersect, intersect_with, segment_intersection, segments_intersect};
pub use reconstruct::{catmull_rom_through, curve_through_points, freehand_path};
pub use sample::{flatten, hit_test, nearest_point_on_curve, sample};
pub use simplify::simplify;
pub use split::split_by_points;

use thiserror::Error;

/// Default parameter increment used when flattening Bezier segments.
pub const DEFAULT_BEZIER_INCREMENTS: f64 = 0.02;

/// Errors from curve operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeomError {
    /// The curve has no commands.
    #[error("curve has no commands")]
    EmptyCurve,

    /// Not enough points to build the requested curve.
    #[error("need at least {needed} points, got {got}")]
    TooFewPoints {
        /// Minimum number of points required.
        needed: usize,
        /// Number of points supplied.
        got: usize,
    },

    /// Sampling step must be finite and positive.
    #[error("invalid sampling step: {0}")]
    InvalidStep(f64),
}

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, GeomError>;
