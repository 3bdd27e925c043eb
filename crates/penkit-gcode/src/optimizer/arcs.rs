//! Three-point arc fitting

use super::{effective_feeds, start_positions, OptimizationMetrics, Optimized, Optimizer};
use crate::command::{feeds_compatible, GcodeCommand};
use penkit_core::Point;

/// Default deviation bound in mm
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Twice the triangle area below which three points count as colinear
const MIN_DETERMINANT: f64 = 1e-6;

/// Arcs flatter than this are left as lines
const MAX_RADIUS: f64 = 10_000.0;

/// Replaces two consecutive linear moves with the arc through their points
///
/// The window is the start point and the two move targets. It is promoted
/// when the points are not colinear and each chord stays within `tolerance`
/// of the circle through all three. Only exact three-point windows are
/// considered; longer runs become a chain of arcs at best.
#[derive(Debug, Clone)]
pub struct ArcFit {
    enabled: bool,
    tolerance: f64,
}

impl ArcFit {
    /// Create the stage
    pub fn new(enabled: bool, tolerance: f64) -> Self {
        Self { enabled, tolerance }
    }
}

impl Default for ArcFit {
    fn default() -> Self {
        Self::new(true, DEFAULT_TOLERANCE)
    }
}

/// Circle through three points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    /// Center
    pub center: Point,
    /// Radius
    pub radius: f64,
    /// Direction of travel from `a` through `b` to `c`
    pub clockwise: bool,
}

/// Circle through `a`, `b` and `c`, `None` when they are (nearly) colinear
pub fn circumcircle(a: Point, b: Point, c: Point) -> Option<Circumcircle> {
    let (u, v) = (b - a, c - a);
    let det = 2.0 * u.cross(&v);
    if det.abs() <= MIN_DETERMINANT {
        return None;
    }
    let (uu, vv) = (u.dot(&u), v.dot(&v));
    let offset = Point::new((v.y * uu - u.y * vv) / det, (u.x * vv - v.x * uu) / det);
    let center = a + offset;
    center.is_finite().then(|| Circumcircle {
        center,
        radius: offset.norm(),
        clockwise: det < 0.0,
    })
}

impl ArcFit {
    fn fit(&self, a: Point, b: Point, c: Point) -> Option<Circumcircle> {
        let circle = circumcircle(a, b, c)?;
        if circle.radius > MAX_RADIUS {
            return None;
        }
        let on_circle = [a, b, c]
            .iter()
            .all(|p| (p.distance_to(&circle.center) - circle.radius).abs() <= self.tolerance);
        let within = |p: Point, q: Point| sagitta(circle.radius, p.distance_to(&q)) <= self.tolerance;
        (on_circle && within(a, b) && within(b, c)).then_some(circle)
    }
}

/// Height of the circular segment cut off by a chord
fn sagitta(radius: f64, chord: f64) -> f64 {
    let half = chord / 2.0;
    radius - (radius * radius - half * half).max(0.0).sqrt()
}

struct Entry {
    command: GcodeCommand,
    start: Point,
    feed: Option<f64>,
}

impl Optimizer for ArcFit {
    fn name(&self) -> &str {
        "arc_fit"
    }

    fn description(&self) -> &str {
        "Promotes pairs of linear moves on a common circle to G2/G3 arcs"
    }

    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let starts = start_positions(&commands);
        let feeds = effective_feeds(&commands);
        let mut out: Vec<Entry> = Vec::with_capacity(commands.len());
        let mut arcs = 0;

        for ((command, start), feed) in commands.into_iter().zip(starts).zip(feeds) {
            if let GcodeCommand::LinearMove { x, y, feed: own } = &command {
                let c = Point::new(*x, *y);
                if let Some(arc) = out.last().and_then(|prev| self.promote(prev, c, feed, *own)) {
                    out.pop();
                    out.push(arc);
                    arcs += 1;
                    continue;
                }
            }
            out.push(Entry {
                command,
                start,
                feed,
            });
        }

        Optimized {
            commands: out.into_iter().map(|e| e.command).collect(),
            metrics: OptimizationMetrics {
                arcs_created: arcs,
                segments_removed: arcs,
                ..Default::default()
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl ArcFit {
    fn promote(&self, prev: &Entry, c: Point, feed: Option<f64>, own: Option<f64>) -> Option<Entry> {
        let GcodeCommand::LinearMove {
            x,
            y,
            feed: prev_own,
        } = &prev.command
        else {
            return None;
        };
        if !feeds_compatible(prev.feed, feed) {
            return None;
        }

        let a = prev.start;
        let circle = self.fit(a, Point::new(*x, *y), c)?;
        Some(Entry {
            command: GcodeCommand::Arc {
                x: c.x,
                y: c.y,
                i: circle.center.x - a.x,
                j: circle.center.y - a.y,
                clockwise: circle.clockwise,
                feed: prev_own.or(own),
            },
            start: a,
            feed,
        })
    }
}
