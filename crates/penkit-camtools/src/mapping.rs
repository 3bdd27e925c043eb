//! Settings to stage parameters
//!
//! The stages know nothing about [`Config`]; these functions are the only
//! place where configuration fields meet stage options.

use penkit_designer::{Placement, PrimitiveDetector, SamplingParams};
use penkit_gcode::{BuilderConfig, ChainConfig, FeedSelector, COLINEAR_TOLERANCE};
use penkit_settings::Config;

/// Placement on the plotter bed
pub fn placement(config: &Config) -> Placement {
    Placement {
        plotter_area: config.plotter_max_area_mm,
        target_area: config.target_write_area_mm,
        mirror_vertical: config.mirror_vertical,
        rotate_90_clockwise: config.rotate_90_clockwise,
        fit_to_target: config.fit_to_target_area,
        center_in_area: config.center_in_area,
        offset: config.offset_mm,
    }
}

/// Sampling parameters in document units
///
/// Spacings are configured in millimeters; `mm_per_unit` is the expected
/// size of one document unit on paper.
pub fn sampling_params(config: &Config, mm_per_unit: f64) -> SamplingParams {
    let unit = if mm_per_unit.is_finite() && mm_per_unit > 0.0 {
        mm_per_unit
    } else {
        1.0
    };
    SamplingParams {
        max_segment_length: config.step_mm / unit,
        min_segment_length: config.sampling.min_segment_length / unit,
        curvature_factor: config.sampling.curvature_factor,
    }
}

/// Primitive detector, `None` when detection is off
pub fn detector(config: &Config) -> Option<PrimitiveDetector> {
    config
        .sampling
        .detect_primitives
        .then(PrimitiveDetector::default)
}

/// Program builder options
pub fn builder_config(config: &Config) -> BuilderConfig {
    let feed = FeedSelector::new(config.feed)
        .with_tool_multiplier(config.tool_type.feed_multiplier())
        .with_curvature(
            config.feed_curvature.curvature_factor,
            config.feed_curvature.min_feed_factor,
        );
    BuilderConfig {
        cmd_down: config.cmd_down.clone(),
        cmd_up: config.cmd_up.clone(),
        dwell_seconds: config.dwell_seconds(),
        feed,
        relative_moves: config.compression.enabled && config.compression.use_relative_moves,
        double_pass: config.pen_double_pass,
        return_home: config.return_home,
    }
}

/// Optimizer chain options
///
/// With compression disabled only the pen offset stage runs.
pub fn chain_config(config: &Config) -> ChainConfig {
    let compression = &config.compression;
    ChainConfig {
        plan_paths: false,
        remove_redundancies: compression.enabled && compression.remove_redundancies,
        colinear_tolerance: COLINEAR_TOLERANCE,
        use_arcs: compression.enabled && compression.use_arcs,
        arc_tolerance: compression.geometric_tolerance,
        offset: (config.pen_offset_mm[0], config.pen_offset_mm[1]),
        relative_offset: false,
    }
}
