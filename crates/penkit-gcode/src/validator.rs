//! Static G-code validation
//!
//! Accepts exactly the lines [`parse_line`](crate::parser::parse_line)
//! accepts, with a single anchored pattern so that whole programs can be
//! checked without building parse trees.

use penkit_core::{Error, Result, ValidationError};
use regex::Regex;

const LINE_PATTERN: &str = r"(?s)^\s*(?:|;.*|\(.*\)|(?i:G0?[0-4]|G2[018]|G9[0-2]|M[0-9]+)(?:\s.*)?)\s*$";

/// Line validator
#[derive(Debug, Clone)]
pub struct GcodeValidator {
    pattern: Regex,
}

impl GcodeValidator {
    /// Create a validator
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(LINE_PATTERN)
            .map_err(|e| Error::other(format!("invalid line pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Whether a single line is valid
    pub fn is_valid_line(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Validate a program, naming the first offending line
    pub fn validate<S: AsRef<str>>(&self, lines: &[S]) -> std::result::Result<(), ValidationError> {
        match lines
            .iter()
            .position(|line| !self.is_valid_line(line.as_ref()))
        {
            Some(index) => {
                let line = lines[index].as_ref().to_string();
                tracing::warn!("Invalid G-code at line {}: '{}'", index + 1, line);
                Err(ValidationError::InvalidGcodeLine {
                    line_number: index + 1,
                    line,
                })
            }
            None => Ok(()),
        }
    }
}
