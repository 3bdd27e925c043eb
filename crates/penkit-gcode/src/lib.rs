//! # penkit G-code
//!
//! Everything between sampled polylines and G-code text: the typed command
//! model, the program builder with curvature-aware feeds, the optimizer
//! chain, the line validator and parser, and the text-level passes that
//! rework existing programs (rescale, travel reduction, frame removal).

pub mod builder;
pub mod command;
pub mod feed;
pub mod optimizer;
pub mod parser;
pub mod postprocess;
pub mod validator;

pub use builder::{BuilderConfig, GcodeBuilder, ProgramHeader, POSITION_TOLERANCE};
pub use command::{format_coord, round_coord, to_lines, GcodeCommand, COORD_DECIMALS};
pub use feed::{turn_angle, FeedSelector};
pub use optimizer::{
    ArcFit, ChainConfig, ColinearCollapse, LineConsolidator, OffsetShift, OptimizationMetrics,
    Optimized, Optimizer, OptimizerChain, PathPlanner, COLINEAR_TOLERANCE,
};
pub use parser::{parse_line, parse_program, Opcode, ParseError, ParsedLine, Word};
pub use postprocess::{
    program_bounds, BorderExcision, RescaleOutcome, Rescaler, TravelReducer, TravelStats,
};
pub use validator::GcodeValidator;
