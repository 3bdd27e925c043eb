//! # penkit
//!
//! Converts SVG drawings into G-code for pen plotters and post-processes
//! existing programs.
//!
//! ## Architecture
//!
//! penkit is organized as a workspace with multiple crates:
//!
//! 1. **penkit-core** - Geometry, errors, events
//! 2. **penkit-settings** - Configuration and persistence
//! 3. **penkit-designer** - SVG import, sampling, primitives, placement, ordering
//! 4. **penkit-gcode** - Builder, optimizer chain, validator, post-processing
//! 5. **penkit-camtools** - Conversion and file operations
//! 6. **penkit** - This binary: flags, logging, messages, exit codes

pub mod app;
pub mod cli;
pub mod i18n;

pub use app::{run, summary, Outcome};
pub use cli::Cli;

pub use penkit_camtools::{ConversionReport, GcodeFileTools, SvgPlotter};
pub use penkit_core::{Error, Result};
pub use penkit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so G-code can stream on stdout
/// - RUST_LOG environment variable support
/// - `info` by default, `debug` with `dev`
pub fn init_logging(dev: bool, no_color: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if dev {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(dev)
        .with_line_number(dev)
        .with_thread_names(dev);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
