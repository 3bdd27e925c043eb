//! Error handling for penkit
//!
//! Three error kinds cover every stage of a conversion:
//! - Validation errors (bad input, bad configuration, bad G-code)
//! - Processing errors (numerical trouble inside a stage, always recoverable)
//! - Output errors (writing the result)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Input validation error
///
/// Fails the conversion with a message naming the offending entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Input file could not be read
    #[error("Cannot read input '{path}': {reason}")]
    UnreadableInput {
        /// Path of the input.
        path: String,
        /// The underlying reason.
        reason: String,
    },

    /// Input is not something the converter understands
    #[error("Unsupported input '{path}': {reason}")]
    UnsupportedInput {
        /// Path of the input.
        path: String,
        /// Why the input is unsupported.
        reason: String,
    },

    /// SVG path data could not be parsed
    #[error("Malformed path data in '{source_name}': {reason}")]
    MalformedPathData {
        /// Name of the document holding the path.
        source_name: String,
        /// What went wrong.
        reason: String,
    },

    /// A G-code line does not match the accepted grammar
    #[error("Invalid G-code at line {line_number}: '{line}'")]
    InvalidGcodeLine {
        /// 1-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// A work area has a non-positive dimension
    #[error("Invalid {name} area {width}x{height} mm: dimensions must be > 0")]
    InvalidArea {
        /// Which area is invalid.
        name: String,
        /// Width in millimeters.
        width: f64,
        /// Height in millimeters.
        height: f64,
    },

    /// Target write area larger than the plotter envelope
    #[error(
        "Target area {target_width}x{target_height} mm exceeds plotter area {max_width}x{max_height} mm"
    )]
    TargetExceedsPlotter {
        /// Target width.
        target_width: f64,
        /// Target height.
        target_height: f64,
        /// Plotter width.
        max_width: f64,
        /// Plotter height.
        max_height: f64,
    },

    /// A program would not fit inside the given bounds
    #[error("Program extent {width:.3}x{height:.3} mm exceeds {limit} area {limit_width}x{limit_height} mm")]
    OutOfBounds {
        /// Program width.
        width: f64,
        /// Program height.
        height: f64,
        /// Name of the violated limit (target or plotter).
        limit: String,
        /// Limit width.
        limit_width: f64,
        /// Limit height.
        limit_height: f64,
    },

    /// A program has no motion to measure
    #[error("Program has no drawable extent")]
    EmptyProgram,

    /// A value supplied on the command line or in settings is invalid
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue {
        /// Name of the value.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Processing error
///
/// Raised inside a stage when a computation cannot complete. Callers degrade
/// instead of aborting: detectors report "not a primitive", sampling falls
/// back to uniform sampling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    /// Segment variant the sampler cannot handle adaptively
    #[error("Unsupported segment: {0}")]
    UnsupportedSegment(String),

    /// The ellipse fit failed numerically
    #[error("Ellipse fit failed: {0}")]
    EllipseFit(String),

    /// The document viewBox has no area
    #[error("Degenerate viewBox {width}x{height}")]
    DegenerateViewBox {
        /// viewBox width.
        width: f64,
        /// viewBox height.
        height: f64,
    },

    /// A computation produced a non-finite value
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

/// Output error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    /// The output could not be written
    #[error("Failed to write '{path}': {reason}")]
    WriteFailed {
        /// Target path.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },

    /// The output directory could not be created
    #[error("Cannot create output directory '{path}': {reason}")]
    DirectoryUncreatable {
        /// Directory path.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },

    /// No free output file name was found
    #[error("No free output name for '{path}' after {attempts} attempts")]
    NameCollision {
        /// Requested path.
        path: PathBuf,
        /// Number of names tried.
        attempts: usize,
    },
}

/// Main error type for penkit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Processing error
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Output error
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Process exit code for this error.
    ///
    /// 1 for validation, processing and output failures, 3 for unsupported
    /// input, 99 for anything unexpected.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(ValidationError::UnsupportedInput { .. }) => 3,
            Error::Validation(_) | Error::Processing(_) | Error::Output(_) | Error::Io(_) => 1,
            Error::Other(_) => 99,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is an output error
    pub fn is_output_error(&self) -> bool {
        matches!(self, Error::Output(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
