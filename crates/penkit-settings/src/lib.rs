//! penkit settings
//!
//! Plotter configuration, validation with fallback to defaults, and
//! persistence as JSON or TOML.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    CompressionSettings, Config, FeedCurvatureSettings, Language, OrderingStrategy,
    SamplingSettings, ToolType,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use persistence::{ConfigSource, SettingsPersistence};
