//! Unit conversion utilities
//!
//! The engine works in millimetres. Adapters that receive geometry in other
//! document units convert at the boundary with [`LengthUnit`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;
const PIXELS_PER_INCH: f64 = 96.0;

/// Document length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimetres
    #[serde(alias = "mm")]
    Millimeter,
    /// Inches
    #[serde(alias = "in")]
    Inch,
    /// Typographic points (1/72 inch)
    #[serde(alias = "pt")]
    Point,
    /// CSS pixels (1/96 inch)
    #[serde(alias = "px")]
    Pixel,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Millimeter
    }
}

impl LengthUnit {
    /// Millimetres in one unit.
    pub fn mm_per_unit(&self) -> f64 {
        match self {
            Self::Millimeter => 1.0,
            Self::Inch => MM_PER_INCH,
            Self::Point => MM_PER_INCH / POINTS_PER_INCH,
            Self::Pixel => MM_PER_INCH / PIXELS_PER_INCH,
        }
    }

    /// Convert a length in this unit to millimetres.
    pub fn to_mm(&self, value: f64) -> f64 {
        value * self.mm_per_unit()
    }

    /// Convert a length in millimetres to this unit.
    pub fn from_mm(&self, value_mm: f64) -> f64 {
        value_mm / self.mm_per_unit()
    }

    /// Short label ("mm", "in", "pt", "px")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "in",
            Self::Point => "pt",
            Self::Pixel => "px",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimetre" => Ok(Self::Millimeter),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            "pt" | "point" | "points" => Ok(Self::Point),
            "px" | "pixel" | "pixels" => Ok(Self::Pixel),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}
