//! Piecewise curve built from path drawing commands.

use crease_kernel_math::{Point2, Rect, Tolerance, Vec2};
use serde::{Deserialize, Serialize};

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum PathCommand {
    /// Start a new subpath at a point.
    MoveTo {
        /// Subpath start.
        p: Point2,
    },
    /// Straight line from the current point.
    LineTo {
        /// Line end.
        p: Point2,
    },
    /// Quadratic Bezier from the current point.
    QuadTo {
        /// Control point.
        c: Point2,
        /// Segment end.
        p: Point2,
    },
    /// Cubic Bezier from the current point.
    CubicTo {
        /// First control point.
        c1: Point2,
        /// Second control point.
        c2: Point2,
        /// Segment end.
        p: Point2,
    },
    /// Straight line back to the subpath start; ends the subpath.
    Close,
}

/// A drawable piece of a curve with its start point resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight segment.
    Line(Point2, Point2),
    /// Quadratic segment: start, control, end.
    Quad(Point2, Point2, Point2),
    /// Cubic segment: start, two controls, end.
    Cubic(Point2, Point2, Point2, Point2),
}

impl Segment {
    /// Start point.
    pub fn start(&self) -> Point2 {
        match self {
            Segment::Line(a, _) | Segment::Quad(a, _, _) | Segment::Cubic(a, _, _, _) => *a,
        }
    }

    /// End point.
    pub fn end(&self) -> Point2 {
        match self {
            Segment::Line(_, b) | Segment::Quad(_, _, b) | Segment::Cubic(_, _, _, b) => *b,
        }
    }

    /// Bounding box of the segment's control polygon.
    pub fn control_bounds(&self) -> Rect {
        let pts: Vec<Point2> = match *self {
            Segment::Line(a, b) => vec![a, b],
            Segment::Quad(a, c, b) => vec![a, c, b],
            Segment::Cubic(a, c1, c2, b) => vec![a, c1, c2, b],
        };
        // Non-empty by construction.
        Rect::from_points(&pts).unwrap_or(Rect::new(pts[0].x, pts[0].y, 0.0, 0.0))
    }
}

/// An ordered sequence of drawing commands.
///
/// The first command of a non-empty curve is always a `MoveTo`. A curve may
/// hold several subpaths; plane boundaries are sanitized into one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    commands: Vec<PathCommand>,
}

impl Curve {
    /// Empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight curve from `a` to `b`.
    pub fn line(a: Point2, b: Point2) -> Self {
        let mut c = Self::new();
        c.move_to(a);
        c.line_to(b);
        c
    }

    /// Open polyline through `points`.
    pub fn polyline(points: &[Point2]) -> Self {
        let mut c = Self::new();
        if let Some((first, rest)) = points.split_first() {
            c.move_to(*first);
            for p in rest {
                c.line_to(*p);
            }
        }
        c
    }

    /// The raw commands.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// True if the curve has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Start a new subpath.
    pub fn move_to(&mut self, p: Point2) {
        self.commands.push(PathCommand::MoveTo { p });
    }

    /// Drawing commands on an empty curve start it with a `MoveTo` at the
    /// command's end point.
    fn ensure_started(&mut self, p: Point2) -> bool {
        if self.commands.is_empty() {
            self.move_to(p);
            return false;
        }
        true
    }

    /// Straight line to `p`.
    pub fn line_to(&mut self, p: Point2) {
        if self.ensure_started(p) {
            self.commands.push(PathCommand::LineTo { p });
        }
    }

    /// Quadratic Bezier to `p` with control `c`.
    pub fn quad_to(&mut self, c: Point2, p: Point2) {
        if self.ensure_started(p) {
            self.commands.push(PathCommand::QuadTo { c, p });
        }
    }

    /// Cubic Bezier to `p` with controls `c1`, `c2`.
    pub fn cubic_to(&mut self, c1: Point2, c2: Point2, p: Point2) {
        if self.ensure_started(p) {
            self.commands.push(PathCommand::CubicTo { c1, c2, p });
        }
    }

    /// Close the current subpath. No-op on an empty or already closed curve.
    pub fn close(&mut self) {
        if matches!(self.commands.last(), None | Some(PathCommand::Close)) {
            return;
        }
        self.commands.push(PathCommand::Close);
    }

    /// Append all commands of `other`, keeping its `MoveTo`s.
    pub fn append(&mut self, other: &Curve) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// Push a raw command. A first command other than `MoveTo` is coerced
    /// into one.
    pub fn push(&mut self, command: PathCommand) {
        match command {
            PathCommand::MoveTo { p } => self.move_to(p),
            PathCommand::LineTo { p } => self.line_to(p),
            PathCommand::QuadTo { c, p } => self.quad_to(c, p),
            PathCommand::CubicTo { c1, c2, p } => self.cubic_to(c1, c2, p),
            PathCommand::Close => self.close(),
        }
    }

    /// First point (the initial `MoveTo`).
    pub fn first_point(&self) -> Option<Point2> {
        match self.commands.first()? {
            PathCommand::MoveTo { p } => Some(*p),
            _ => None,
        }
    }

    /// Current point after the last command.
    pub fn last_point(&self) -> Option<Point2> {
        let mut current = None;
        let mut subpath_start = None;
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { p } => {
                    current = Some(p);
                    subpath_start = Some(p);
                }
                PathCommand::LineTo { p }
                | PathCommand::QuadTo { p, .. }
                | PathCommand::CubicTo { p, .. } => current = Some(p),
                PathCommand::Close => current = subpath_start,
            }
        }
        current
    }

    /// Number of `MoveTo` commands.
    pub fn subpath_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo { .. }))
            .count()
    }

    /// Whether the curve ends with an explicit `Close`.
    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Resolve commands into segments. `Close` becomes a line back to the
    /// subpath start unless the current point is already there.
    pub fn segments(&self) -> Vec<Segment> {
        let tol = Tolerance::DEFAULT;
        let mut out = Vec::with_capacity(self.commands.len());
        let mut current = Point2::origin();
        let mut start = Point2::origin();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { p } => {
                    current = p;
                    start = p;
                }
                PathCommand::LineTo { p } => {
                    out.push(Segment::Line(current, p));
                    current = p;
                }
                PathCommand::QuadTo { c, p } => {
                    out.push(Segment::Quad(current, c, p));
                    current = p;
                }
                PathCommand::CubicTo { c1, c2, p } => {
                    out.push(Segment::Cubic(current, c1, c2, p));
                    current = p;
                }
                PathCommand::Close => {
                    if !tol.points_equal(&current, &start) {
                        out.push(Segment::Line(current, start));
                    }
                    current = start;
                }
            }
        }
        out
    }

    /// The same path traversed backwards, as a single open subpath.
    ///
    /// An explicit `Close` becomes a line segment and the result ends where
    /// the original started.
    pub fn reversed(&self) -> Curve {
        let segments = self.segments();
        let mut out = Curve::new();
        let Some(last) = segments.last() else {
            if let Some(p) = self.first_point() {
                out.move_to(p);
            }
            return out;
        };
        out.move_to(last.end());
        for seg in segments.iter().rev() {
            match *seg {
                Segment::Line(a, _) => out.line_to(a),
                Segment::Quad(a, c, _) => out.quad_to(c, a),
                Segment::Cubic(a, c1, c2, _) => out.cubic_to(c2, c1, a),
            }
        }
        out
    }

    /// Bounding box of all points, control points included.
    pub fn control_bounds(&self) -> Option<Rect> {
        let mut pts = Vec::with_capacity(self.commands.len() * 3);
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { p } | PathCommand::LineTo { p } => pts.push(p),
                PathCommand::QuadTo { c, p } => pts.extend([c, p]),
                PathCommand::CubicTo { c1, c2, p } => pts.extend([c1, c2, p]),
                PathCommand::Close => {}
            }
        }
        Rect::from_points(&pts)
    }

    /// Direction the curve leaves its first point, skipping coincident
    /// control points.
    pub fn start_tangent(&self) -> Option<Vec2> {
        let tol = Tolerance::DEFAULT;
        let first = self.segments().into_iter().next()?;
        let a = first.start();
        let candidates: Vec<Point2> = match first {
            Segment::Line(_, b) => vec![b],
            Segment::Quad(_, c, b) => vec![c, b],
            Segment::Cubic(_, c1, c2, b) => vec![c1, c2, b],
        };
        candidates
            .into_iter()
            .find(|p| !tol.points_equal(p, &a))
            .map(|p| p - a)
    }
}
