//! Axis-parallel run consolidation

use super::{effective_feeds, start_positions, OptimizationMetrics, Optimized, Optimizer};
use crate::command::{feeds_compatible, GcodeCommand};
use penkit_core::Point;

/// Two coordinates closer than this lie on the same axis line (1 µm)
pub const AXIS_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    Horizontal { forward: bool },
    Vertical { forward: bool },
}

/// Merges runs of moves along one horizontal or vertical line
///
/// A run only merges while it keeps its direction, so a stroke that doubles
/// back on itself is left alone.
#[derive(Debug, Clone)]
pub struct LineConsolidator {
    enabled: bool,
}

impl LineConsolidator {
    /// Create the stage
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for LineConsolidator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Optimizer for LineConsolidator {
    fn name(&self) -> &str {
        "line_consolidator"
    }

    fn description(&self) -> &str {
        "Merges consecutive moves along the same horizontal or vertical line"
    }

    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let starts = start_positions(&commands);
        let feeds = effective_feeds(&commands);
        let mut out = Vec::with_capacity(commands.len());
        let mut removed = 0;

        let mut i = 0;
        while i < commands.len() {
            let Some(axis) = axis_of(&commands[i], starts[i]) else {
                out.push(commands[i].clone());
                i += 1;
                continue;
            };

            let origin = starts[i];
            let mut j = i + 1;
            while j < commands.len()
                && axis_of(&commands[j], starts[j]) == Some(axis)
                && on_line(axis, origin, starts[j])
                && feeds_compatible(feeds[i], feeds[j])
            {
                j += 1;
            }

            if j - i > 1 {
                let feed = commands[i..j].iter().find_map(GcodeCommand::feed);
                let end = commands[j - 1].end_point().unwrap_or(origin);
                out.push(GcodeCommand::linear(end, feed));
                removed += j - i - 1;
            } else {
                out.push(commands[i].clone());
            }
            i = j;
        }

        Optimized {
            commands: out,
            metrics: OptimizationMetrics {
                lines_optimized: removed,
                segments_removed: removed,
                ..Default::default()
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn axis_of(command: &GcodeCommand, start: Point) -> Option<Axis> {
    let GcodeCommand::LinearMove { x, y, .. } = command else {
        return None;
    };
    let (dx, dy) = (x - start.x, y - start.y);
    if dy.abs() <= AXIS_TOLERANCE && dx.abs() > AXIS_TOLERANCE {
        Some(Axis::Horizontal { forward: dx > 0.0 })
    } else if dx.abs() <= AXIS_TOLERANCE && dy.abs() > AXIS_TOLERANCE {
        Some(Axis::Vertical { forward: dy > 0.0 })
    } else {
        None
    }
}

fn on_line(axis: Axis, origin: Point, p: Point) -> bool {
    match axis {
        Axis::Horizontal { .. } => (p.y - origin.y).abs() <= AXIS_TOLERANCE,
        Axis::Vertical { .. } => (p.x - origin.x).abs() <= AXIS_TOLERANCE,
    }
}
