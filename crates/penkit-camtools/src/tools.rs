//! Post-processing of existing G-code programs
//!
//! Both operations validate the input first and refuse to touch a program
//! with a line outside the accepted grammar.

use crate::output::{InputSource, OutputTarget};
use penkit_core::{AppEvent, ErrorEvent, EventBus, GcodeEvent, Result};
use penkit_gcode::{BorderExcision, GcodeValidator, RescaleOutcome, Rescaler, TravelReducer, TravelStats};
use penkit_settings::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of the optimize operation
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOutcome {
    /// Rewritten program
    pub lines: Vec<String>,
    /// Travel reduction counters
    pub stats: TravelStats,
    /// Lines dropped with the reference frame
    pub frame_lines_removed: usize,
}

/// Rescale and optimize operations on G-code files
pub struct GcodeFileTools {
    config: Config,
    validator: GcodeValidator,
    events: Option<Arc<EventBus>>,
}

impl GcodeFileTools {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            validator: GcodeValidator::new()?,
            events: None,
        })
    }

    /// Publish rescale and optimize events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    fn publish(&self, event: AppEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.publish(AppEvent::Error(ErrorEvent {
                message: e.to_string(),
                exit_code: e.exit_code(),
            }));
        }
        result
    }

    /// Scale a program into `target` (the configured write area when
    /// `None`) and check it against the plotter envelope
    pub fn rescale_lines<S: AsRef<str>>(
        &self,
        lines: &[S],
        target: Option<[f64; 2]>,
    ) -> Result<RescaleOutcome> {
        self.validator.validate(lines)?;
        let [tw, th] = target.unwrap_or(self.config.target_write_area_mm);
        let [pw, ph] = self.config.plotter_max_area_mm;
        Rescaler::new((tw, th), (pw, ph))?.rescale(lines)
    }

    /// Remove the reference frame when configured, then turn tool-up
    /// linear moves into rapids
    pub fn optimize_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<OptimizeOutcome> {
        self.validator.validate(lines)?;
        let config = &self.config;

        let (framed, frame_lines_removed) = if config.remove_border_rectangle {
            BorderExcision::new(&config.cmd_up, &config.cmd_down).excise(lines)
        } else {
            (lines.iter().map(|l| l.as_ref().to_string()).collect(), 0)
        };

        let (lines, stats) = TravelReducer::new(&config.cmd_up, &config.cmd_down).reduce(&framed);
        tracing::info!(
            "Rewrote {} of {} linear moves ({:.1}%)",
            stats.rewritten,
            stats.linear_moves,
            stats.rate() * 100.0
        );
        Ok(OptimizeOutcome {
            lines,
            stats,
            frame_lines_removed,
        })
    }

    /// Rescale the program read from `input` and write it to `output`
    pub fn rescale(
        &self,
        input: &InputSource,
        output: &OutputTarget,
        target: Option<[f64; 2]>,
    ) -> Result<(RescaleOutcome, Option<PathBuf>)> {
        let result = read_lines(input).and_then(|lines| {
            let outcome = self.rescale_lines(&lines, target)?;
            let written = output.write(&outcome.lines, &format!("{}_rescaled", input.stem()))?;
            Ok((outcome, written))
        });

        if let Ok((outcome, written)) = &result {
            self.publish(AppEvent::Gcode(GcodeEvent::Rescaled {
                output: written.clone().unwrap_or_else(|| PathBuf::from("-")),
                factor: outcome.factor,
            }));
        }
        self.report(result)
    }

    /// Optimize the program read from `input` and write it to `output`
    pub fn optimize(
        &self,
        input: &InputSource,
        output: &OutputTarget,
    ) -> Result<(OptimizeOutcome, Option<PathBuf>)> {
        let result = read_lines(input).and_then(|lines| {
            let outcome = self.optimize_lines(&lines)?;
            let written = output.write(&outcome.lines, &format!("{}_optimized", input.stem()))?;
            Ok((outcome, written))
        });

        if let Ok((outcome, written)) = &result {
            self.publish(AppEvent::Gcode(GcodeEvent::Optimized {
                output: written.clone().unwrap_or_else(|| PathBuf::from("-")),
                rewritten: outcome.stats.rewritten,
            }));
        }
        self.report(result)
    }
}

fn read_lines(input: &InputSource) -> Result<Vec<String>> {
    Ok(input.read_to_string()?.lines().map(str::to_string).collect())
}
