//! SVG length units
//!
//! Document `width`/`height` attributes carry a unit suffix. Physical units
//! convert to millimeters directly; `px` and unitless values use the CSS
//! reference of 96 pixels per inch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// CSS reference resolution.
pub const CSS_DPI: f64 = 96.0;

/// Millimeters per CSS pixel.
pub const MM_PER_PX: f64 = MM_PER_INCH / CSS_DPI;

/// Unit of an SVG length attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimeters
    Mm,
    /// Centimeters
    Cm,
    /// Inches
    In,
    /// CSS pixels
    Px,
    /// No suffix; treated as pixels
    Unitless,
}

impl LengthUnit {
    /// Millimeters represented by one unit.
    pub fn mm_per_unit(self) -> f64 {
        match self {
            Self::Mm => 1.0,
            Self::Cm => 10.0,
            Self::In => MM_PER_INCH,
            Self::Px | Self::Unitless => MM_PER_PX,
        }
    }

    /// True for mm, cm and in.
    pub fn is_physical(self) -> bool {
        matches!(self, Self::Mm | Self::Cm | Self::In)
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mm => write!(f, "mm"),
            Self::Cm => write!(f, "cm"),
            Self::In => write!(f, "in"),
            Self::Px => write!(f, "px"),
            Self::Unitless => Ok(()),
        }
    }
}

/// A length with its unit, as written in a document attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    /// Numeric value
    pub value: f64,
    /// Unit suffix
    pub unit: LengthUnit,
}

impl Length {
    /// Create a new length
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    /// Value converted to millimeters.
    pub fn to_mm(&self) -> f64 {
        self.value * self.unit.mm_per_unit()
    }

    /// Value converted to CSS pixels.
    pub fn to_px(&self) -> f64 {
        self.to_mm() / MM_PER_PX
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| format!("Invalid length: {}", s))?;
        if !value.is_finite() {
            return Err(format!("Invalid length: {}", s));
        }

        let unit = match suffix.trim().to_lowercase().as_str() {
            "" => LengthUnit::Unitless,
            "mm" => LengthUnit::Mm,
            "cm" => LengthUnit::Cm,
            "in" => LengthUnit::In,
            "px" => LengthUnit::Px,
            other => return Err(format!("Unsupported length unit '{}' in {}", other, s)),
        };

        Ok(Self { value, unit })
    }
}
