//! Colinear point removal

use super::{effective_feeds, start_positions, OptimizationMetrics, Optimized, Optimizer};
use crate::command::{feeds_compatible, GcodeCommand};
use penkit_core::Point;

/// Default bound on `|(b - a) x (c - b)|`
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Drops the middle point of three consecutive linear moves on one line
///
/// Runs greedily left to right, so a straight run of any length collapses
/// to its two ends. The middle point is kept when the run turns back on
/// itself or the feed changes there.
#[derive(Debug, Clone)]
pub struct ColinearCollapse {
    enabled: bool,
    tolerance: f64,
}

impl ColinearCollapse {
    /// Create the stage
    pub fn new(enabled: bool, tolerance: f64) -> Self {
        Self { enabled, tolerance }
    }

    /// Cross-product bound
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for ColinearCollapse {
    fn default() -> Self {
        Self::new(true, DEFAULT_TOLERANCE)
    }
}

struct Entry {
    command: GcodeCommand,
    start: Point,
    feed: Option<f64>,
}

impl Optimizer for ColinearCollapse {
    fn name(&self) -> &str {
        "colinear_collapse"
    }

    fn description(&self) -> &str {
        "Removes interior points of straight drawing runs"
    }

    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let starts = start_positions(&commands);
        let feeds = effective_feeds(&commands);
        let mut out: Vec<Entry> = Vec::with_capacity(commands.len());
        let mut removed = 0;

        for ((command, start), feed) in commands.into_iter().zip(starts).zip(feeds) {
            if let GcodeCommand::LinearMove { x, y, feed: own } = &command {
                let c = Point::new(*x, *y);
                if let Some(merged) = out.last().and_then(|prev| self.merge(prev, c, feed, *own)) {
                    out.pop();
                    out.push(merged);
                    removed += 1;
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
                colinear_points_removed: removed,
                segments_removed: removed,
                ..Default::default()
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl ColinearCollapse {
    fn merge(&self, prev: &Entry, c: Point, feed: Option<f64>, own: Option<f64>) -> Option<Entry> {
        let GcodeCommand::LinearMove {
            x,
            y,
            feed: prev_own,
        } = &prev.command
        else {
            return None;
        };
        let a = prev.start;
        let b = Point::new(*x, *y);
        let (u, v) = (b - a, c - b);

        let straight = u.cross(&v).abs() <= self.tolerance && u.dot(&v) > 0.0;
        if !straight || !feeds_compatible(prev.feed, feed) {
            return None;
        }
        Some(Entry {
            command: GcodeCommand::linear(c, prev_own.or(own)),
            start: a,
            feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(points: &[(f64, f64)]) -> Vec<GcodeCommand> {
        let mut commands = vec![GcodeCommand::rapid(Point::new(points[0].0, points[0].1))];
        commands.extend(
            points[1..]
                .iter()
                .map(|&(x, y)| GcodeCommand::linear(Point::new(x, y), None)),
        );
        commands
    }

    #[test]
    fn test_straight_run_collapses_to_ends() {
        let out = ColinearCollapse::default()
            .process(draw(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (15.0, 0.0)]));
        assert_eq!(out.commands, draw(&[(0.0, 0.0), (15.0, 0.0)]));
        assert_eq!(out.metrics.colinear_points_removed, 2);
    }

    #[test]
    fn test_diagonal_run_collapses() {
        let out = ColinearCollapse::default().process(draw(&[(0.0, 0.0), (1.0, 1.0), (3.0, 3.0)]));
        assert_eq!(out.commands, draw(&[(0.0, 0.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_corner_kept() {
        let input = draw(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        let out = ColinearCollapse::default().process(input.clone());
        assert_eq!(out.commands, input);
    }

    #[test]
    fn test_backtrack_kept() {
        let input = draw(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.0)]);
        let out = ColinearCollapse::default().process(input.clone());
        assert_eq!(out.commands, input);
    }

    #[test]
    fn test_first_feed_carried_forward() {
        let out = ColinearCollapse::default().process(vec![
            GcodeCommand::rapid(Point::origin()),
            GcodeCommand::linear(Point::new(1.0, 0.0), Some(1500.0)),
            GcodeCommand::linear(Point::new(2.0, 0.0), None),
        ]);
        assert_eq!(
            out.commands[1],
            GcodeCommand::linear(Point::new(2.0, 0.0), Some(1500.0))
        );
    }

    #[test]
    fn test_interrupted_by_other_command() {
        let input = vec![
            GcodeCommand::rapid(Point::origin()),
            GcodeCommand::linear(Point::new(1.0, 0.0), None),
            GcodeCommand::Dwell { seconds: 0.1 },
            GcodeCommand::linear(Point::new(2.0, 0.0), None),
        ];
        let out = ColinearCollapse::default().process(input.clone());
        assert_eq!(out.commands, input);
    }
}
