//! Plotter configuration
//!
//! A single document describes the machine (plotter envelope, tool
//! opcodes, feed), the drawing placement (target write area, mirroring,
//! rotation, offsets) and the compression options of the emitted program.
//!
//! Every field has a serde default, so partial documents load. Invalid
//! values never fail a load: [`Config::sanitize`] replaces them with the
//! documented defaults and reports what it changed.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default plotter envelope (mm).
pub const DEFAULT_PLOTTER_AREA_MM: [f64; 2] = [300.0, 420.0];
/// Default target write area (mm), A4 portrait.
pub const DEFAULT_TARGET_AREA_MM: [f64; 2] = [210.0, 297.0];
/// Default drawing feed (mm/min).
pub const DEFAULT_FEED: f64 = 1500.0;
/// Default maximum spacing between sampled points (mm).
pub const DEFAULT_STEP_MM: f64 = 0.5;
/// Default dwell around tool changes (ms).
pub const DEFAULT_DWELL_MS: u64 = 150;
/// Default relative tolerance of the border detectors.
pub const DEFAULT_BORDER_TOLERANCE: f64 = 0.05;

/// Drawing tool mounted on the plotter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    /// Fine pen
    #[default]
    Pen,
    /// Marker; drawn slower to let the ink flow
    Marker,
}

impl ToolType {
    /// Multiplier applied to every drawing feed
    pub fn feed_multiplier(self) -> f64 {
        match self {
            Self::Pen => 1.0,
            Self::Marker => 0.8,
        }
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pen => write!(f, "pen"),
            Self::Marker => write!(f, "marker"),
        }
    }
}

impl std::str::FromStr for ToolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pen" => Ok(Self::Pen),
            "marker" => Ok(Self::Marker),
            other => Err(format!("Unknown tool type: {}", other)),
        }
    }
}

/// Stroke ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Keep document order
    None,
    /// Nearest next start point
    #[default]
    Greedy,
    /// Long strokes first, proximity later
    LengthWeighted,
}

/// User interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Spanish
    Es,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

/// Post-emission compression of the command stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    /// Run the optimizer chain
    pub enabled: bool,
    /// Geometric tolerance for colinear and arc fitting (mm)
    pub geometric_tolerance: f64,
    /// Allow promotion of draw runs to G2/G3 arcs
    pub use_arcs: bool,
    /// Emit draws as G91 relative moves
    pub use_relative_moves: bool,
    /// Allow removal of redundant draws
    pub remove_redundancies: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            geometric_tolerance: 0.1,
            use_arcs: true,
            use_relative_moves: false,
            remove_redundancies: true,
        }
    }
}

/// Adaptive sampling of curved segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Minimum spacing of arc samples and optimized primitive points (mm)
    pub min_segment_length: f64,
    /// Extra Bézier samples per unit of curvature times distance
    pub curvature_factor: f64,
    /// Replace recognized circles, ellipses and rectangles by clean point sets
    pub detect_primitives: bool,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            min_segment_length: 0.2,
            curvature_factor: 1.0,
            detect_primitives: true,
        }
    }
}

/// Feed reduction on sharp turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedCurvatureSettings {
    /// Fraction of the feed removed on a full reversal
    pub curvature_factor: f64,
    /// Lower bound of the feed as a fraction of the base feed
    pub min_feed_factor: f64,
}

impl Default for FeedCurvatureSettings {
    fn default() -> Self {
        Self {
            curvature_factor: 0.35,
            min_feed_factor: 0.4,
        }
    }
}

fn default_surface_presets() -> BTreeMap<String, [f64; 2]> {
    BTreeMap::from([
        ("A3".to_string(), [297.0, 420.0]),
        ("A4".to_string(), [210.0, 297.0]),
        ("A5".to_string(), [148.0, 210.0]),
        ("Letter".to_string(), [215.9, 279.4]),
    ])
}

/// Complete plotter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Named surfaces (name → [width, height] in mm)
    pub surface_presets: BTreeMap<String, [f64; 2]>,
    /// Physical envelope of the plotter (mm)
    pub plotter_max_area_mm: [f64; 2],
    /// Area the drawing should fit into (mm)
    pub target_write_area_mm: [f64; 2],
    /// Default directory for SVG input
    pub svg_input_dir: PathBuf,
    /// Default directory for generated programs
    pub gcode_output_dir: PathBuf,
    /// Base drawing feed (mm/min)
    pub feed: f64,
    /// Opcode that lowers the tool
    pub cmd_down: String,
    /// Opcode that lifts the tool
    pub cmd_up: String,
    /// Maximum spacing between sampled points (mm)
    pub step_mm: f64,
    /// Dwell around tool changes (ms)
    pub dwell_ms: u64,
    /// Mounted tool
    pub tool_type: ToolType,
    /// Retrace every stroke backwards before lifting
    pub pen_double_pass: bool,
    /// Remove the reference frame block when post-processing
    pub remove_border_rectangle: bool,
    /// Relative tolerance of border detection
    pub border_detection_tolerance: f64,
    /// Flip Y (SVG y grows down, plotter y grows up)
    pub mirror_vertical: bool,
    /// Rotate the drawing 90° clockwise
    pub rotate_90_clockwise: bool,
    /// Optimizer chain options
    pub compression: CompressionSettings,

    /// Drop a path matching the document viewBox
    pub remove_svg_border: bool,
    /// Draw a frame around the target area before the drawing
    pub draw_reference_frame: bool,
    /// Scale the drawing to fill the target area
    pub fit_to_target_area: bool,
    /// Center the drawing inside the target area
    pub center_in_area: bool,
    /// Translation applied after fitting (mm)
    pub offset_mm: [f64; 2],
    /// Pen holder offset applied to the emitted program (mm)
    pub pen_offset_mm: [f64; 2],
    /// Rapid back to the origin at the end of the program
    pub return_home: bool,
    /// Stroke ordering strategy
    pub ordering: OrderingStrategy,
    /// Curve sampling options
    pub sampling: SamplingSettings,
    /// Curvature-driven feed options
    pub feed_curvature: FeedCurvatureSettings,
    /// Message language
    pub language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            surface_presets: default_surface_presets(),
            plotter_max_area_mm: DEFAULT_PLOTTER_AREA_MM,
            target_write_area_mm: DEFAULT_TARGET_AREA_MM,
            svg_input_dir: PathBuf::from("svg"),
            gcode_output_dir: PathBuf::from("gcode"),
            feed: DEFAULT_FEED,
            cmd_down: "M3 S255".to_string(),
            cmd_up: "M5".to_string(),
            step_mm: DEFAULT_STEP_MM,
            dwell_ms: DEFAULT_DWELL_MS,
            tool_type: ToolType::default(),
            pen_double_pass: false,
            remove_border_rectangle: true,
            border_detection_tolerance: DEFAULT_BORDER_TOLERANCE,
            mirror_vertical: true,
            rotate_90_clockwise: false,
            compression: CompressionSettings::default(),
            remove_svg_border: true,
            draw_reference_frame: false,
            fit_to_target_area: false,
            center_in_area: false,
            offset_mm: [0.0, 0.0],
            pen_offset_mm: [0.0, 0.0],
            return_home: false,
            ordering: OrderingStrategy::default(),
            sampling: SamplingSettings::default(),
            feed_curvature: FeedCurvatureSettings::default(),
            language: Language::default(),
        }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn positive_area(area: [f64; 2]) -> bool {
    positive(area[0]) && positive(area[1])
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML), sanitizing invalid values
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let mut config: Self = match Self::format_of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        for warning in config.sanitize() {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        Ok(config)
    }

    /// Save config to file (JSON or TOML) through a temp file and rename
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.persist(path)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e.error)))?;
        Ok(())
    }

    fn format_of(path: &Path) -> SettingsResult<Format> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
        }
    }

    /// Strict validation, used before persisting
    pub fn validate(&self) -> SettingsResult<()> {
        let invalid = |key: &str, reason: &str| SettingsError::InvalidSetting {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if !positive_area(self.plotter_max_area_mm) {
            return Err(invalid("plotter_max_area_mm", "dimensions must be > 0"));
        }
        if !positive_area(self.target_write_area_mm) {
            return Err(invalid("target_write_area_mm", "dimensions must be > 0"));
        }
        if !self.target_fits_plotter() {
            return Err(invalid(
                "target_write_area_mm",
                "must fit inside plotter_max_area_mm",
            ));
        }
        if !positive(self.feed) {
            return Err(invalid("feed", "must be > 0"));
        }
        if !positive(self.step_mm) {
            return Err(invalid("step_mm", "must be > 0"));
        }
        if self.cmd_down.trim().is_empty() || self.cmd_up.trim().is_empty() {
            return Err(invalid("cmd_down/cmd_up", "must not be empty"));
        }
        if !(positive(self.border_detection_tolerance) && self.border_detection_tolerance < 1.0) {
            return Err(invalid("border_detection_tolerance", "must be in (0, 1)"));
        }
        if !positive(self.compression.geometric_tolerance) {
            return Err(invalid("compression.geometric_tolerance", "must be > 0"));
        }
        if !positive(self.sampling.min_segment_length) {
            return Err(invalid("sampling.min_segment_length", "must be > 0"));
        }
        if !(self.sampling.curvature_factor.is_finite() && self.sampling.curvature_factor >= 0.0) {
            return Err(invalid("sampling.curvature_factor", "must be >= 0"));
        }
        let fc = &self.feed_curvature;
        if !(fc.curvature_factor.is_finite() && (0.0..=1.0).contains(&fc.curvature_factor)) {
            return Err(invalid("feed_curvature.curvature_factor", "must be in [0, 1]"));
        }
        if !(positive(fc.min_feed_factor) && fc.min_feed_factor <= 1.0) {
            return Err(invalid("feed_curvature.min_feed_factor", "must be in (0, 1]"));
        }
        for (name, area) in &self.surface_presets {
            if !positive_area(*area) {
                return Err(invalid(
                    &format!("surface_presets.{}", name),
                    "dimensions must be > 0",
                ));
            }
        }
        Ok(())
    }

    fn target_fits_plotter(&self) -> bool {
        self.target_write_area_mm[0] <= self.plotter_max_area_mm[0]
            && self.target_write_area_mm[1] <= self.plotter_max_area_mm[1]
    }

    /// Replace invalid values by their defaults
    ///
    /// Returns one message per replaced value.
    pub fn sanitize(&mut self) -> Vec<String> {
        let defaults = Config::default();
        let mut warnings = Vec::new();

        if !positive_area(self.plotter_max_area_mm) {
            warnings.push(format!(
                "plotter_max_area_mm {:?} is invalid, using {:?}",
                self.plotter_max_area_mm, defaults.plotter_max_area_mm
            ));
            self.plotter_max_area_mm = defaults.plotter_max_area_mm;
        }

        if !positive_area(self.target_write_area_mm) || !self.target_fits_plotter() {
            let fallback = if defaults.target_write_area_mm[0] <= self.plotter_max_area_mm[0]
                && defaults.target_write_area_mm[1] <= self.plotter_max_area_mm[1]
            {
                defaults.target_write_area_mm
            } else {
                self.plotter_max_area_mm
            };
            warnings.push(format!(
                "target_write_area_mm {:?} does not fit plotter area {:?}, using {:?}",
                self.target_write_area_mm, self.plotter_max_area_mm, fallback
            ));
            self.target_write_area_mm = fallback;
        }

        if !positive(self.feed) {
            warnings.push(format!("feed {} is invalid, using {}", self.feed, defaults.feed));
            self.feed = defaults.feed;
        }
        if !positive(self.step_mm) {
            warnings.push(format!(
                "step_mm {} is invalid, using {}",
                self.step_mm, defaults.step_mm
            ));
            self.step_mm = defaults.step_mm;
        }
        if self.cmd_down.trim().is_empty() {
            warnings.push(format!("cmd_down is empty, using '{}'", defaults.cmd_down));
            self.cmd_down = defaults.cmd_down.clone();
        }
        if self.cmd_up.trim().is_empty() {
            warnings.push(format!("cmd_up is empty, using '{}'", defaults.cmd_up));
            self.cmd_up = defaults.cmd_up.clone();
        }
        if !(positive(self.border_detection_tolerance) && self.border_detection_tolerance < 1.0) {
            warnings.push(format!(
                "border_detection_tolerance {} is invalid, using {}",
                self.border_detection_tolerance, defaults.border_detection_tolerance
            ));
            self.border_detection_tolerance = defaults.border_detection_tolerance;
        }
        if !positive(self.compression.geometric_tolerance) {
            warnings.push(format!(
                "compression.geometric_tolerance {} is invalid, using {}",
                self.compression.geometric_tolerance, defaults.compression.geometric_tolerance
            ));
            self.compression.geometric_tolerance = defaults.compression.geometric_tolerance;
        }
        if !positive(self.sampling.min_segment_length) {
            warnings.push(format!(
                "sampling.min_segment_length {} is invalid, using {}",
                self.sampling.min_segment_length, defaults.sampling.min_segment_length
            ));
            self.sampling.min_segment_length = defaults.sampling.min_segment_length;
        }
        if !(self.sampling.curvature_factor.is_finite() && self.sampling.curvature_factor >= 0.0) {
            warnings.push(format!(
                "sampling.curvature_factor {} is invalid, using {}",
                self.sampling.curvature_factor, defaults.sampling.curvature_factor
            ));
            self.sampling.curvature_factor = defaults.sampling.curvature_factor;
        }
        let fc = &mut self.feed_curvature;
        if !(fc.curvature_factor.is_finite() && (0.0..=1.0).contains(&fc.curvature_factor)) {
            warnings.push(format!(
                "feed_curvature.curvature_factor {} is invalid, using {}",
                fc.curvature_factor, defaults.feed_curvature.curvature_factor
            ));
            fc.curvature_factor = defaults.feed_curvature.curvature_factor;
        }
        if !(positive(fc.min_feed_factor) && fc.min_feed_factor <= 1.0) {
            warnings.push(format!(
                "feed_curvature.min_feed_factor {} is invalid, using {}",
                fc.min_feed_factor, defaults.feed_curvature.min_feed_factor
            ));
            fc.min_feed_factor = defaults.feed_curvature.min_feed_factor;
        }

        let before = self.surface_presets.len();
        self.surface_presets.retain(|_, area| positive_area(*area));
        if self.surface_presets.len() != before {
            warnings.push(format!(
                "dropped {} surface preset(s) with invalid dimensions",
                before - self.surface_presets.len()
            ));
        }

        warnings
    }

    /// Use a named surface preset as the target write area
    pub fn apply_surface_preset(&mut self, name: &str) -> SettingsResult<()> {
        let area = self
            .surface_presets
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;

        if area[0] > self.plotter_max_area_mm[0] || area[1] > self.plotter_max_area_mm[1] {
            return Err(ConfigError::ValueOutOfRange {
                key: format!("surface_presets.{}", name),
                value: format!("{}x{} mm exceeds plotter area", area[0], area[1]),
            }
            .into());
        }
        self.target_write_area_mm = area;
        Ok(())
    }

    /// Dwell around tool changes in seconds
    pub fn dwell_seconds(&self) -> f64 {
        self.dwell_ms as f64 / 1000.0
    }
}

enum Format {
    Json,
    Toml,
}
