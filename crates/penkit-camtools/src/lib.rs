//! # penkit CAM tools
//!
//! End-to-end operations built on the designer and G-code crates.
//!
//! ## Operations
//!
//! - **Conversion**: an SVG document to a validated plotter program
//!   ([`SvgPlotter`])
//! - **Rescale**: fit an existing program into a target area
//!   ([`GcodeFileTools::rescale`])
//! - **Optimize**: drop the reference frame and turn tool-up linear moves
//!   into rapids ([`GcodeFileTools::optimize`])
//!
//! ## Supporting Infrastructure
//!
//! - **Output**: stdin/stdout endpoints, atomic writes and unique naming
//!   ([`output`])
//! - **Mapping**: configuration to stage options ([`mapping`])

pub mod mapping;
pub mod output;
pub mod plotter;
pub mod tools;

pub use output::{unique_path, write_atomic, InputSource, OutputTarget, MAX_NAME_ATTEMPTS};
pub use plotter::{Conversion, ConversionReport, SvgPlotter};
pub use tools::{GcodeFileTools, OptimizeOutcome};
