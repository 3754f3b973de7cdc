//! Hashing of the state that feeds edge generation.
//!
//! Floats are hashed by bit pattern, so `0.0` and `-0.0` differ. That only
//! costs a spurious cache miss.

use std::hash::Hasher;

use crease_kernel_geom::{Curve, PathCommand};
use crease_kernel_math::Point2;
use crease_kernel_topo::Edge;

pub(crate) fn hash_point(h: &mut dyn Hasher, p: &Point2) {
    h.write_u64(p.x.to_bits());
    h.write_u64(p.y.to_bits());
}

pub(crate) fn hash_opt_point(h: &mut dyn Hasher, p: Option<&Point2>) {
    match p {
        Some(p) => {
            h.write_u8(1);
            hash_point(h, p);
        }
        None => h.write_u8(0),
    }
}

pub(crate) fn hash_points(h: &mut dyn Hasher, points: &[Point2]) {
    h.write_usize(points.len());
    for p in points {
        hash_point(h, p);
    }
}

pub(crate) fn hash_curve(h: &mut dyn Hasher, curve: &Curve) {
    h.write_usize(curve.len());
    for cmd in curve.commands() {
        match cmd {
            PathCommand::MoveTo { p } => {
                h.write_u8(0);
                hash_point(h, p);
            }
            PathCommand::LineTo { p } => {
                h.write_u8(1);
                hash_point(h, p);
            }
            PathCommand::QuadTo { c, p } => {
                h.write_u8(2);
                hash_point(h, c);
                hash_point(h, p);
            }
            PathCommand::CubicTo { c1, c2, p } => {
                h.write_u8(3);
                hash_point(h, c1);
                hash_point(h, c2);
                hash_point(h, p);
            }
            PathCommand::Close => h.write_u8(4),
        }
    }
}

pub(crate) fn hash_edge(h: &mut dyn Hasher, edge: &Edge) {
    hash_point(h, &edge.start);
    hash_point(h, &edge.end);
    hash_curve(h, &edge.curve);
    h.write_u8(edge.kind as u8);
}
