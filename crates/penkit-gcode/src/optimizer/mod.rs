//! # Optimizer chain
//!
//! Optimizers rewrite a command list into an equivalent, usually shorter
//! one. Each stage reports what it did in an [`OptimizationMetrics`] bag and
//! the chain threads the output of one stage into the next.
//!
//! Standard order:
//!
//! 1. [`PathPlanner`]: reorder stroke blocks by proximity
//! 2. [`LineConsolidator`]: merge runs of axis-parallel moves
//! 3. [`ColinearCollapse`]: drop interior points of straight runs
//! 4. [`ArcFit`]: promote three-point runs to circular arcs
//! 5. [`OffsetShift`]: translate the whole program
//!
//! No optimizer ever returns more commands than it was given.

mod arcs;
mod colinear;
mod consolidate;
mod offset;
mod planner;

pub use arcs::ArcFit;
pub use colinear::{ColinearCollapse, DEFAULT_TOLERANCE as COLINEAR_TOLERANCE};
pub use consolidate::LineConsolidator;
pub use offset::OffsetShift;
pub use planner::PathPlanner;

use crate::command::GcodeCommand;
use penkit_core::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters accumulated through the chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationMetrics {
    /// Arcs that replaced line pairs
    pub arcs_created: usize,
    /// Commands removed by any stage
    pub segments_removed: usize,
    /// Axis-parallel moves merged away
    pub lines_optimized: usize,
    /// Stroke blocks that changed position
    pub paths_reordered: usize,
    /// Interior points of straight runs dropped
    pub colinear_points_removed: usize,
    /// Commands translated by the offset stage
    pub commands_shifted: usize,
}

impl OptimizationMetrics {
    /// Add another bag into this one
    pub fn merge(&mut self, other: &OptimizationMetrics) {
        self.arcs_created += other.arcs_created;
        self.segments_removed += other.segments_removed;
        self.lines_optimized += other.lines_optimized;
        self.paths_reordered += other.paths_reordered;
        self.colinear_points_removed += other.colinear_points_removed;
        self.commands_shifted += other.commands_shifted;
    }

    /// True when no stage changed anything
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for OptimizationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} removed, {} arcs, {} lines merged, {} colinear, {} reordered, {} shifted",
            self.segments_removed,
            self.arcs_created,
            self.lines_optimized,
            self.colinear_points_removed,
            self.paths_reordered,
            self.commands_shifted
        )
    }
}

/// Result of running one optimizer
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    /// Rewritten commands
    pub commands: Vec<GcodeCommand>,
    /// What changed
    pub metrics: OptimizationMetrics,
}

/// A command-list rewriting stage
pub trait Optimizer: Send + Sync {
    /// Short identifier
    fn name(&self) -> &str;

    /// What the stage does
    fn description(&self) -> &str;

    /// Rewrite `commands`; the result is never longer than the input
    fn process(&self, commands: Vec<GcodeCommand>) -> Optimized;

    /// Disabled stages are skipped by the chain
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Settings for [`OptimizerChain::standard`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainConfig {
    /// Reorder stroke blocks
    pub plan_paths: bool,
    /// Run line consolidation and colinear collapse
    pub remove_redundancies: bool,
    /// Cross-product bound for colinear collapse
    pub colinear_tolerance: f64,
    /// Run arc fitting
    pub use_arcs: bool,
    /// Sagitta bound for arc fitting, in mm
    pub arc_tolerance: f64,
    /// Translation applied last
    pub offset: (f64, f64),
    /// Treat the offset as a relative scale instead
    pub relative_offset: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            plan_paths: false,
            remove_redundancies: true,
            colinear_tolerance: colinear::DEFAULT_TOLERANCE,
            use_arcs: true,
            arc_tolerance: arcs::DEFAULT_TOLERANCE,
            offset: (0.0, 0.0),
            relative_offset: false,
        }
    }
}

/// Ordered list of optimizers
#[derive(Default)]
pub struct OptimizerChain {
    optimizers: Vec<Box<dyn Optimizer>>,
}

impl OptimizerChain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard five stages, enabled per `config`
    pub fn standard(config: &ChainConfig) -> Self {
        let mut chain = Self::new();
        chain
            .register(Box::new(PathPlanner::new(config.plan_paths)))
            .register(Box::new(LineConsolidator::new(config.remove_redundancies)))
            .register(Box::new(ColinearCollapse::new(
                config.remove_redundancies,
                config.colinear_tolerance,
            )))
            .register(Box::new(ArcFit::new(config.use_arcs, config.arc_tolerance)))
            .register(Box::new(OffsetShift::new(
                config.offset.0,
                config.offset.1,
                config.relative_offset,
            )));
        chain
    }

    /// Append a stage
    pub fn register(&mut self, optimizer: Box<dyn Optimizer>) -> &mut Self {
        self.optimizers.push(optimizer);
        self
    }

    /// Number of registered stages
    pub fn len(&self) -> usize {
        self.optimizers.len()
    }

    /// True when no stage is registered
    pub fn is_empty(&self) -> bool {
        self.optimizers.is_empty()
    }

    /// `(name, description, enabled)` of every stage
    pub fn list(&self) -> Vec<(&str, &str, bool)> {
        self.optimizers
            .iter()
            .map(|o| (o.name(), o.description(), o.is_enabled()))
            .collect()
    }

    /// Run every enabled stage in order
    pub fn run(&self, commands: Vec<GcodeCommand>) -> Optimized {
        let mut metrics = OptimizationMetrics::default();
        let mut commands = commands;
        for optimizer in self.optimizers.iter().filter(|o| o.is_enabled()) {
            let before = commands.len();
            let out = optimizer.process(commands);
            tracing::debug!(
                "Optimizer '{}': {} -> {} commands",
                optimizer.name(),
                before,
                out.commands.len()
            );
            metrics.merge(&out.metrics);
            commands = out.commands;
        }
        Optimized { commands, metrics }
    }
}

impl fmt::Debug for OptimizerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerChain")
            .field(
                "optimizers",
                &self.optimizers.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Feed in effect for each drawing command, `None` for everything else
pub(crate) fn effective_feeds(commands: &[GcodeCommand]) -> Vec<Option<f64>> {
    let mut modal = None;
    commands
        .iter()
        .map(|command| {
            if !command.is_draw() {
                return None;
            }
            modal = command.feed().or(modal);
            modal
        })
        .collect()
}

/// Position before each command, starting from the origin
pub(crate) fn start_positions(commands: &[GcodeCommand]) -> Vec<Point> {
    let mut position = Point::origin();
    commands
        .iter()
        .map(|command| {
            let start = position;
            position = command.position_after(position);
            start
        })
        .collect()
}
