//! Command-line surface

use clap::Parser;
use penkit_settings::{Language, ToolType};
use std::path::PathBuf;
use thiserror::Error;

/// Convert SVG drawings into pen-plotter G-code and post-process existing
/// programs
#[derive(Debug, Clone, Parser)]
#[command(name = "penkit", version, about)]
pub struct Cli {
    /// Batch mode: never prompt; requires --input and --output
    #[arg(long, requires_all = ["input", "output"])]
    pub no_interactive: bool,

    /// SVG drawing or G-code program to read, `-` for stdin
    #[arg(short, long, value_name = "PATH|-")]
    pub input: Option<String>,

    /// File or directory to write, `-` for stdout
    #[arg(short, long, value_name = "PATH|-")]
    pub output: Option<String>,

    /// Post-process an existing G-code file: drop the reference frame and
    /// turn tool-up moves into rapids
    #[arg(long, conflicts_with = "rescale")]
    pub optimize: bool,

    /// Rescale an existing G-code file into W or WxH millimeters
    #[arg(long, value_name = "TARGET_MM", value_parser = parse_area)]
    pub rescale: Option<[f64; 2]>,

    /// Mounted tool
    #[arg(long, value_parser = parse_tool)]
    pub tool: Option<ToolType>,

    /// Retrace every stroke in reverse before lifting
    #[arg(long, overrides_with = "no_double_pass")]
    pub double_pass: bool,

    /// Draw every stroke once
    #[arg(long, overrides_with = "double_pass")]
    pub no_double_pass: bool,

    /// Message language
    #[arg(long, value_name = "es|en", value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Write the effective settings back to the configuration file
    #[arg(long)]
    pub save_config: bool,

    /// Configuration file (JSON or TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use a named surface preset as the target write area
    #[arg(long, value_name = "NAME")]
    pub surface_preset: Option<String>,

    /// Verbose diagnostics
    #[arg(long)]
    pub dev: bool,
}

impl Cli {
    /// Double-pass override, `None` when neither flag was given
    pub fn double_pass(&self) -> Option<bool> {
        match (self.double_pass, self.no_double_pass) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Whether missing paths may be asked for on stdin
    pub fn interactive(&self) -> bool {
        !self.no_interactive
    }
}

/// Problems with the invocation itself
#[derive(Debug, Error)]
pub enum UsageError {
    /// A required value was neither given nor entered
    #[error("missing {0}")]
    Missing(&'static str),
}

/// `W` for a square area or `WxH`
pub fn parse_area(s: &str) -> Result<[f64; 2], String> {
    let parse = |v: &str| -> Result<f64, String> {
        let value: f64 = v
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", v.trim()))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(format!("{} must be greater than 0", value))
        }
    };

    match s.to_lowercase().split_once('x') {
        Some((w, h)) => Ok([parse(w)?, parse(h)?]),
        None => {
            let side = parse(s)?;
            Ok([side, side])
        }
    }
}

fn parse_tool(s: &str) -> Result<ToolType, String> {
    s.parse()
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}
