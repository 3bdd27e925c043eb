//! Curvature-driven feed selection
//!
//! The feed for a drawing move slows down where the path turns sharply:
//!
//! ```text
//! kappa = turn_angle / pi
//! feed  = base_feed * max(min_feed_factor, 1 - curvature_factor * kappa)
//! ```
//!
//! The emitted value is the minimum of the feed at the move's end point and
//! at the next point, so the tool starts slowing one move ahead of a corner.

use penkit_core::Point;
use std::f64::consts::PI;

/// Feed selector for one program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSelector {
    /// Feed in mm/min on straight runs
    pub base_feed: f64,
    /// How strongly a turn slows the tool
    pub curvature_factor: f64,
    /// Lower bound as a fraction of the base feed
    pub min_feed_factor: f64,
    /// Tool-type multiplier applied last
    pub tool_multiplier: f64,
}

impl Default for FeedSelector {
    fn default() -> Self {
        Self {
            base_feed: 1500.0,
            curvature_factor: 0.35,
            min_feed_factor: 0.4,
            tool_multiplier: 1.0,
        }
    }
}

impl FeedSelector {
    /// Selector with default curvature constants
    pub fn new(base_feed: f64) -> Self {
        Self {
            base_feed,
            ..Self::default()
        }
    }

    /// Set the tool-type multiplier
    pub fn with_tool_multiplier(mut self, multiplier: f64) -> Self {
        self.tool_multiplier = multiplier;
        self
    }

    /// Set the curvature constants
    pub fn with_curvature(mut self, curvature_factor: f64, min_feed_factor: f64) -> Self {
        self.curvature_factor = curvature_factor;
        self.min_feed_factor = min_feed_factor;
        self
    }

    /// Feed at `p2` given its neighbours, before the tool multiplier
    pub fn feed_at(&self, p1: Point, p2: Point, p3: Point) -> f64 {
        let kappa = turn_angle(p1, p2, p3) / PI;
        let factor = (1.0 - self.curvature_factor * kappa).max(self.min_feed_factor);
        self.base_feed * factor
    }

    /// Feed for every move of a polyline
    ///
    /// Entry `k` is the feed of the move ending at `points[k + 1]`, rounded
    /// to whole mm/min as it is emitted.
    pub fn feeds_for(&self, points: &[Point]) -> Vec<f64> {
        if points.len() < 2 {
            return Vec::new();
        }

        // Raw feed at every vertex; the ends have no turn
        let mut vertex = vec![self.base_feed; points.len()];
        for k in 1..points.len() - 1 {
            vertex[k] = self.feed_at(points[k - 1], points[k], points[k + 1]);
        }

        (1..points.len())
            .map(|k| {
                let ahead = vertex.get(k + 1).copied().unwrap_or(vertex[k]);
                (vertex[k].min(ahead) * self.tool_multiplier).round()
            })
            .collect()
    }
}

/// Turn angle at `p2` in `[0, pi]`; zero when either leg has no length
pub fn turn_angle(p1: Point, p2: Point, p3: Point) -> f64 {
    let a = p2 - p1;
    let b = p3 - p2;
    let (na, nb) = (a.norm(), b.norm());
    if na < 1e-12 || nb < 1e-12 {
        return 0.0;
    }
    let cos = (a.dot(&b) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos().clamp(0.0, PI)
}
