//! Settings Persistence
//!
//! Resolves where the configuration lives and loads it with a fallback
//! chain: primary document, then its sibling `config.default.json`, then the
//! built-in defaults.

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config dir.
pub const APP_DIR_NAME: &str = "penkit";
/// Primary configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Defaults document expected next to the primary file.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.default.json";

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The primary document
    Primary(PathBuf),
    /// The sibling defaults document
    SiblingDefault(PathBuf),
    /// Nothing on disk; compiled-in defaults
    BuiltIn,
}

impl ConfigSource {
    /// Path of the document that was read, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Primary(p) | ConfigSource::SiblingDefault(p) => Some(p),
            ConfigSource::BuiltIn => None,
        }
    }
}

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
}

impl SettingsPersistence {
    /// Persistence bound to an explicit primary document
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence bound to `<config dir>/penkit/config.json`
    pub fn at_default_location() -> SettingsResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        Ok(Self::new(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    /// Primary document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling defaults document path
    pub fn default_document_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(DEFAULT_CONFIG_FILE_NAME),
            None => PathBuf::from(DEFAULT_CONFIG_FILE_NAME),
        }
    }

    /// Load the configuration following the fallback chain
    ///
    /// A document that exists but cannot be parsed is an error; only missing
    /// documents fall through.
    pub fn load(&self) -> SettingsResult<(Config, ConfigSource)> {
        if self.path.is_file() {
            tracing::debug!("Loading settings from {}", self.path.display());
            let config = Config::load_from_file(&self.path)?;
            return Ok((config, ConfigSource::Primary(self.path.clone())));
        }

        let fallback = self.default_document_path();
        if fallback.is_file() {
            tracing::info!(
                "{} not found, using defaults from {}",
                self.path.display(),
                fallback.display()
            );
            let config = Config::load_from_file(&fallback)?;
            return Ok((config, ConfigSource::SiblingDefault(fallback)));
        }

        tracing::debug!("No settings document found, using built-in defaults");
        Ok((Config::default(), ConfigSource::BuiltIn))
    }

    /// Save the configuration to the primary document
    pub fn save(&self, config: &Config) -> SettingsResult<()> {
        config.save_to_file(&self.path)?;
        tracing::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_path() {
        let persistence = SettingsPersistence::new("/etc/penkit/config.json");
        assert_eq!(
            persistence.default_document_path(),
            PathBuf::from("/etc/penkit/config.default.json")
        );
    }

    #[test]
    fn test_source_path() {
        assert_eq!(ConfigSource::BuiltIn.path(), None);
        let source = ConfigSource::Primary(PathBuf::from("a.json"));
        assert_eq!(source.path(), Some(Path::new("a.json")));
    }
}
