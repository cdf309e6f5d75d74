//! # CurveFill Core
//!
//! Core types, errors, and utilities shared by the CurveFill crates.
//! Provides the geometry primitives, length units, the layered error
//! hierarchy, and the cooperative cancellation/progress control used by
//! long-running fill operations.

pub mod control;
pub mod error;
pub mod geometry;
pub mod units;

pub use control::{FillControl, Outcome};
pub use error::{ConfigError, Error, GeometryError, Result};
pub use geometry::{Bounds, Point};
pub use units::LengthUnit;
