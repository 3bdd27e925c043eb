//! Stroke block reordering

use super::{start_positions, OptimizationMetrics, Optimized, Optimizer};
use crate::command::GcodeCommand;
use penkit_core::Point;
use std::ops::Range;

/// Reorders stroke blocks by nearest-neighbour travel
///
/// A block runs from a rapid move up to the next rapid move and contains at
/// least one drawing command; rapids without drawing in between join the
/// following block. Everything before the first block and after the last
/// one stays in place. The first block keeps its position and every next
/// block is the one whose drawing starts closest to where the previous one
/// ended.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    enabled: bool,
}

impl PathPlanner {
    /// Create the stage
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug, Clone)]
struct Block {
    range: Range<usize>,
    start: Point,
    end: Point,
}

fn blocks(commands: &[GcodeCommand]) -> Vec<Block> {
    let starts = start_positions(commands);
    let position_at = |index: usize| {
        starts
            .get(index)
            .copied()
            .or_else(|| {
                let last = commands.len().checked_sub(1)?;
                Some(commands[last].position_after(starts[last]))
            })
            .unwrap_or_else(Point::origin)
    };

    let rapids: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, GcodeCommand::RapidMove { .. }))
        .map(|(i, _)| i)
        .collect();

    let mut blocks = Vec::new();
    let mut pending: Option<usize> = None;
    for (k, &begin) in rapids.iter().enumerate() {
        let end = rapids.get(k + 1).copied().unwrap_or(commands.len());
        let first = pending.unwrap_or(begin);
        match commands[begin..end].iter().position(GcodeCommand::is_draw) {
            Some(offset) => {
                blocks.push(Block {
                    range: first..end,
                    start: starts[begin + offset],
                    end: position_at(end),
                });
                pending = None;
            }
            None => pending = Some(first),
        }
    }
    blocks
}

impl Optimizer for PathPlanner {
    fn name(&self) -> &str {
        "path_planner"
    }

    fn description(&self) -> &str {
        "Reorders stroke blocks to shorten travel between them"
    }

    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let blocks = blocks(&commands);
        if blocks.len() < 3 {
            return Optimized {
                commands,
                metrics: OptimizationMetrics::default(),
            };
        }

        let mut order = vec![0];
        let mut remaining: Vec<usize> = (1..blocks.len()).collect();
        while !remaining.is_empty() {
            let here = blocks[order[order.len() - 1]].end;
            let mut best = 0;
            for (k, &candidate) in remaining.iter().enumerate() {
                let d = here.distance_to(&blocks[candidate].start);
                if d < here.distance_to(&blocks[remaining[best]].start) {
                    best = k;
                }
            }
            order.push(remaining.remove(best));
        }

        let moved = order.iter().enumerate().filter(|&(k, &b)| k != b).count();
        if moved == 0 {
            return Optimized {
                commands,
                metrics: OptimizationMetrics::default(),
            };
        }

        let head = blocks[0].range.start;
        let tail = blocks[blocks.len() - 1].range.end;
        let mut out = Vec::with_capacity(commands.len());
        out.extend_from_slice(&commands[..head]);
        for &b in &order {
            out.extend_from_slice(&commands[blocks[b].range.clone()]);
        }
        out.extend_from_slice(&commands[tail..]);

        tracing::debug!("Reordered {} of {} stroke blocks", moved, blocks.len());
        Optimized {
            commands: out,
            metrics: OptimizationMetrics {
                paths_reordered: moved,
                ..Default::default()
            },
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderConfig, GcodeBuilder};

    fn program(strokes: &[[(f64, f64); 2]]) -> Vec<GcodeCommand> {
        let mut builder = GcodeBuilder::new(BuilderConfig::default());
        builder.preamble();
        for s in strokes {
            builder.stroke(&[Point::new(s[0].0, s[0].1), Point::new(s[1].0, s[1].1)]);
        }
        builder.finish()
    }

    fn rapid_targets(commands: &[GcodeCommand]) -> Vec<Point> {
        commands
            .iter()
            .filter_map(|c| match c {
                GcodeCommand::RapidMove { x, y } => Some(Point::new(*x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blocks_found() {
        let commands = program(&[[(0.0, 0.0), (10.0, 0.0)], [(50.0, 0.0), (60.0, 0.0)]]);
        let found = blocks(&commands);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].range.start, 2);
        assert_eq!(found[1].range.end, commands.len());
        assert_eq!(found[1].start, Point::new(50.0, 0.0));
        assert_eq!(found[1].end, Point::new(60.0, 0.0));
    }

    #[test]
    fn test_blocks_reordered_by_proximity() {
        let commands = program(&[
            [(0.0, 0.0), (10.0, 0.0)],
            [(50.0, 0.0), (60.0, 0.0)],
            [(20.0, 0.0), (30.0, 0.0)],
        ]);
        let out = PathPlanner::default().process(commands.clone());
        assert_eq!(out.commands.len(), commands.len());
        assert_eq!(out.metrics.paths_reordered, 2);
        assert_eq!(
            rapid_targets(&out.commands),
            vec![
                Point::new(0.0, 0.0),
                Point::new(20.0, 0.0),
                Point::new(50.0, 0.0)
            ]
        );
        assert_eq!(&out.commands[..2], &commands[..2]);
    }

    #[test]
    fn test_ordered_program_untouched() {
        let commands = program(&[
            [(0.0, 0.0), (10.0, 0.0)],
            [(20.0, 0.0), (30.0, 0.0)],
            [(50.0, 0.0), (60.0, 0.0)],
        ]);
        let out = PathPlanner::default().process(commands.clone());
        assert_eq!(out.commands, commands);
        assert!(out.metrics.is_empty());
    }
}
