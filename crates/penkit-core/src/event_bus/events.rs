//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so sinks can log or persist them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Conversion progress
    Conversion(ConversionEvent),
    /// Program generation and post-processing
    Gcode(GcodeEvent),
    /// Settings and configuration
    Settings(SettingsEvent),
    /// Error and diagnostic events
    Error(ErrorEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Conversion(_) => EventCategory::Conversion,
            AppEvent::Gcode(_) => EventCategory::Gcode,
            AppEvent::Settings(_) => EventCategory::Settings,
            AppEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Conversion(e) => e.description(),
            AppEvent::Gcode(e) => e.description(),
            AppEvent::Settings(e) => e.description(),
            AppEvent::Error(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Conversion progress events.
    Conversion,
    /// G-code generation events.
    Gcode,
    /// Settings events.
    Settings,
    /// Error events.
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Conversion => write!(f, "Conversion"),
            EventCategory::Gcode => write!(f, "Gcode"),
            EventCategory::Settings => write!(f, "Settings"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// Conversion progress events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionEvent {
    /// A conversion started.
    Started {
        /// Name of the source document.
        source: String,
    },
    /// A stage reported progress.
    Progress {
        /// Work done so far.
        current: usize,
        /// Total work.
        total: usize,
    },
}

impl ConversionEvent {
    fn description(&self) -> String {
        match self {
            ConversionEvent::Started { source } => format!("Converting {}", source),
            ConversionEvent::Progress { current, total } => {
                format!("Progress: {}/{}", current, total)
            }
        }
    }
}

/// G-code program events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GcodeEvent {
    /// A program was generated from a drawing.
    Generated {
        /// Name of the source document.
        source: String,
        /// Where the program was written.
        output: PathBuf,
        /// Number of lines written.
        lines: usize,
        /// Number of strokes drawn.
        strokes: usize,
    },
    /// An existing program was rescaled.
    Rescaled {
        /// Where the program was written.
        output: PathBuf,
        /// Applied scale factor.
        factor: f64,
    },
    /// Travel moves of an existing program were reduced.
    Optimized {
        /// Where the program was written.
        output: PathBuf,
        /// Number of rewritten moves.
        rewritten: usize,
    },
}

impl GcodeEvent {
    fn description(&self) -> String {
        match self {
            GcodeEvent::Generated {
                source,
                output,
                lines,
                strokes,
            } => format!(
                "Generated {} from {} ({} lines, {} strokes)",
                output.display(),
                source,
                lines,
                strokes
            ),
            GcodeEvent::Rescaled { output, factor } => {
                format!("Rescaled {} by {:.4}", output.display(), factor)
            }
            GcodeEvent::Optimized { output, rewritten } => {
                format!("Optimized {} ({} travel moves)", output.display(), rewritten)
            }
        }
    }
}

/// Settings events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingsEvent {
    /// Settings loaded.
    Loaded {
        /// Source document, `None` for built-in defaults.
        path: Option<PathBuf>,
    },
    /// Settings saved.
    Saved {
        /// Where the settings were written.
        path: PathBuf,
    },
}

impl SettingsEvent {
    fn description(&self) -> String {
        match self {
            SettingsEvent::Loaded { path: Some(path) } => {
                format!("Settings loaded from {}", path.display())
            }
            SettingsEvent::Loaded { path: None } => "Default settings loaded".to_string(),
            SettingsEvent::Saved { path } => format!("Settings saved to {}", path.display()),
        }
    }
}

/// Error event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// User-facing message
    pub message: String,
    /// Exit code the failure maps to
    pub exit_code: i32,
}

impl ErrorEvent {
    fn description(&self) -> String {
        format!("Error ({}): {}", self.exit_code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let event = AppEvent::Gcode(GcodeEvent::Rescaled {
            output: PathBuf::from("a.gcode"),
            factor: 0.5,
        });
        assert_eq!(event.category(), EventCategory::Gcode);
        assert_eq!(event.description(), "Rescaled a.gcode by 0.5000");
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Settings(SettingsEvent::Loaded { path: None });
        let json = serde_json::to_string(&event).unwrap();
        let back: AppEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
