//! Error handling for CurveFill
//!
//! Provides error types for all layers of the engine:
//! - Configuration errors (malformed ranges, non-finite numbers, empty stamp lists)
//! - Geometry errors (degenerate paths, discontinuities, arc-length domain violations)
//! - Session errors (state machine misuse)
//!
//! All error types use `thiserror` for ergonomic error handling. A cancelled
//! operation is not an error; see [`crate::control::Outcome`].

use thiserror::Error;

/// Configuration error type
///
/// Raised while validating a fill configuration or its stamp list, before any
/// planning work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric parameter is NaN or infinite
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFinite {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A min/max pair is inverted
    #[error("Range '{name}' is inverted: min {min} > max {max}")]
    InvertedRange {
        /// The range name.
        name: String,
        /// The lower bound supplied.
        min: f64,
        /// The upper bound supplied.
        max: f64,
    },

    /// A parameter that must not be negative was negative
    #[error("Parameter '{name}' must not be negative, got {value}")]
    Negative {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A parameter that must be strictly positive was zero or negative
    #[error("Parameter '{name}' must be positive, got {value}")]
    NotPositive {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A parameter fell outside its allowed interval
    #[error("Parameter '{name}' must be within [{min}, {max}], got {value}")]
    OutOfBounds {
        /// The parameter name.
        name: String,
        /// The offending value.
        value: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },

    /// Spacing resolves to a non-positive distance
    #[error("Invalid spacing: {reason}")]
    InvalidSpacing {
        /// Why the spacing is unusable.
        reason: String,
    },

    /// No stamps were supplied
    #[error("At least one stamp is required")]
    EmptyStamps,

    /// A pattern sequence entry references a stamp that does not exist
    #[error("Pattern sequence entry {index} is out of range for {stamp_count} stamps")]
    PatternIndex {
        /// The referenced stamp index.
        index: usize,
        /// Number of stamps available.
        stamp_count: usize,
    },

    /// A stamp bounding proxy is unusable
    #[error("Stamp {stamp} has an invalid bounding proxy: {reason}")]
    InvalidStamp {
        /// Index of the stamp in the supplied list.
        stamp: usize,
        /// Why the proxy was rejected.
        reason: String,
    },
}

/// Geometry error type
///
/// Represents problems with the supplied path or with arc-length queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Path is empty, has zero length, or fewer than two distinct points
    #[error("Degenerate geometry: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },

    /// Consecutive segments do not share an endpoint
    #[error("Segment {segment} does not start where the previous segment ends (gap {gap})")]
    Discontinuous {
        /// Index of the segment whose start point is off.
        segment: usize,
        /// Distance between the previous end and this start.
        gap: f64,
    },

    /// Arc-length query outside the domain of an open path
    #[error("Arc length {s} is outside [0, {total}]")]
    OutOfRange {
        /// The requested arc length.
        s: f64,
        /// Total length of the path.
        total: f64,
    },
}

impl GeometryError {
    /// Create a degenerate-geometry error from a message
    pub fn degenerate(reason: impl Into<String>) -> Self {
        GeometryError::Degenerate {
            reason: reason.into(),
        }
    }
}

/// Main error type for CurveFill
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration rejected before planning
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// Path or query geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Session method called from a state that does not allow it
    #[error("Invalid state transition from {current} on {action}")]
    InvalidTransition {
        /// The current state name.
        current: String,
        /// The requested action.
        action: String,
    },
}

impl Error {
    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::InvalidConfiguration(_))
    }

    /// Check if this is an invalid spacing error
    pub fn is_invalid_spacing(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration(ConfigError::InvalidSpacing { .. })
        )
    }

    /// Check if this is a degenerate geometry error
    pub fn is_degenerate_geometry(&self) -> bool {
        matches!(
            self,
            Error::Geometry(GeometryError::Degenerate { .. })
                | Error::Geometry(GeometryError::Discontinuous { .. })
        )
    }

    /// Check if this is an arc-length domain violation
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::Geometry(GeometryError::OutOfRange { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
