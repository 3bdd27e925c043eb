//! Path segments
//!
//! Every variant answers `length()` and `point(t)`; evaluation of curves is
//! delegated to `lyon::geom`.

use super::point::Point;
use lyon::geom::euclid::Angle;
use lyon::geom::{ArcFlags, CubicBezierSegment, QuadraticBezierSegment, SvgArc};
use serde::{Deserialize, Serialize};

/// Chord count used to measure arcs and quadratic curves.
const LENGTH_PIECES: usize = 64;

/// Flattening tolerance for cubic length estimates.
const CUBIC_LENGTH_TOLERANCE: f64 = 1e-4;

/// One segment of a path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Straight line
    Line {
        /// Start point
        start: Point,
        /// End point
        end: Point,
    },
    /// Cubic Bézier curve
    CubicBezier {
        /// Start point
        start: Point,
        /// First control point
        c1: Point,
        /// Second control point
        c2: Point,
        /// End point
        end: Point,
    },
    /// Quadratic Bézier curve
    QuadraticBezier {
        /// Start point
        start: Point,
        /// Control point
        c: Point,
        /// End point
        end: Point,
    },
    /// SVG elliptical arc in endpoint parameterization
    EllipticalArc {
        /// Start point
        start: Point,
        /// End point
        end: Point,
        /// Radii (rx, ry)
        radii: (f64, f64),
        /// X-axis rotation in radians
        rotation: f64,
        /// SVG large-arc flag
        large_arc: bool,
        /// SVG sweep flag
        sweep: bool,
    },
}

impl Segment {
    /// Straight line from `start` to `end`
    pub fn line(start: Point, end: Point) -> Self {
        Segment::Line { start, end }
    }

    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { start, .. }
            | Segment::CubicBezier { start, .. }
            | Segment::QuadraticBezier { start, .. }
            | Segment::EllipticalArc { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { end, .. }
            | Segment::CubicBezier { end, .. }
            | Segment::QuadraticBezier { end, .. }
            | Segment::EllipticalArc { end, .. } => end,
        }
    }

    /// Variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Line { .. } => "line",
            Segment::CubicBezier { .. } => "cubic",
            Segment::QuadraticBezier { .. } => "quadratic",
            Segment::EllipticalArc { .. } => "arc",
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Segment::Line { .. })
    }

    /// Point at parameter `t`, clamped to [0, 1]
    ///
    /// `point(0)` and `point(1)` return the stored endpoints exactly.
    pub fn point(&self, t: f64) -> Point {
        if t <= 0.0 {
            return self.start();
        }
        if t >= 1.0 {
            return self.end();
        }

        match *self {
            Segment::Line { start, end } => start.lerp(&end, t),
            Segment::CubicBezier { start, c1, c2, end } => CubicBezierSegment {
                from: start.into(),
                ctrl1: c1.into(),
                ctrl2: c2.into(),
                to: end.into(),
            }
            .sample(t)
            .into(),
            Segment::QuadraticBezier { start, c, end } => QuadraticBezierSegment {
                from: start.into(),
                ctrl: c.into(),
                to: end.into(),
            }
            .sample(t)
            .into(),
            Segment::EllipticalArc { start, end, .. } => {
                let arc = self.svg_arc();
                match arc {
                    Some(arc) if !arc.is_straight_line() => arc.to_arc().sample(t).into(),
                    _ => start.lerp(&end, t),
                }
            }
        }
    }

    /// Arc length
    pub fn length(&self) -> f64 {
        match *self {
            Segment::Line { start, end } => start.distance_to(&end),
            Segment::CubicBezier { start, c1, c2, end } => CubicBezierSegment {
                from: start.into(),
                ctrl1: c1.into(),
                ctrl2: c2.into(),
                to: end.into(),
            }
            .approximate_length(CUBIC_LENGTH_TOLERANCE),
            Segment::QuadraticBezier { .. } | Segment::EllipticalArc { .. } => {
                self.chord_length(LENGTH_PIECES)
            }
        }
    }

    /// Length of the polyline through `pieces + 1` evenly spaced parameters
    pub fn chord_length(&self, pieces: usize) -> f64 {
        let pieces = pieces.max(1);
        let mut total = 0.0;
        let mut prev = self.start();
        for i in 1..=pieces {
            let p = self.point(i as f64 / pieces as f64);
            total += prev.distance_to(&p);
            prev = p;
        }
        total
    }

    /// True if the segment has no extent (all defining points coincide)
    pub fn is_degenerate(&self) -> bool {
        let s = self.start();
        match *self {
            Segment::Line { end, .. } | Segment::EllipticalArc { end, .. } => s == end,
            Segment::CubicBezier { c1, c2, end, .. } => s == end && s == c1 && s == c2,
            Segment::QuadraticBezier { c, end, .. } => s == end && s == c,
        }
    }

    /// Swept angle and mean radius of an arc, `None` for other variants or
    /// arcs that collapse to a straight line
    pub fn arc_sweep(&self) -> Option<(f64, f64)> {
        let arc = self.svg_arc()?;
        if arc.is_straight_line() {
            return None;
        }
        let arc = arc.to_arc();
        let sweep = arc.sweep_angle.radians;
        let radius = (arc.radii.x.abs() + arc.radii.y.abs()) / 2.0;
        (sweep.is_finite() && radius.is_finite()).then_some((sweep, radius))
    }

    fn svg_arc(&self) -> Option<SvgArc<f64>> {
        match *self {
            Segment::EllipticalArc {
                start,
                end,
                radii,
                rotation,
                large_arc,
                sweep,
            } => Some(SvgArc {
                from: start.into(),
                to: end.into(),
                radii: lyon::geom::vector(radii.0, radii.1),
                x_rotation: Angle::radians(rotation),
                flags: ArcFlags { large_arc, sweep },
            }),
            _ => None,
        }
    }
}
