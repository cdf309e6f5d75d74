//! # CurveFill
//!
//! Distributes copies of stamp shapes along open or closed 2D paths.
//!
//! ## Architecture
//!
//! CurveFill is organized as a workspace with multiple crates:
//!
//! 1. **curvefill-core** - Geometry primitives, errors, units, cancellation control
//! 2. **curvefill-engine** - Curve sampling, planning, resolution, collision filtering, sessions
//! 3. **curvefill** - JSON adapter and command-line binary
//!
//! ## Features
//!
//! - **Arc-length sampling**: Lines and cubic Béziers with adaptive subdivision
//! - **Spacing**: Fixed, percentage, auto-fit and random
//! - **Orientation**: Follow curve, fixed, random, incremental, perpendicular
//! - **Patterns**: Single, sequence, alternating and random stamp selection
//! - **Collision filtering**: Grid index plus separating-axis overlap tests
//! - **Editing**: Count adjustment and redistribution after a fill

pub mod request;

pub use curvefill_core::{
    Bounds, ConfigError, Error, FillControl, GeometryError, LengthUnit, Outcome, Point, Result,
};
pub use curvefill_engine::{
    AngleMode, CountPolicy, FillConfig, FillResult, FillSession, FillStatistics, Path,
    PatternMode, PlacementTransform, ScaleMode, Segment, SessionState, SpacingMode, StampVariant,
};
pub use request::{FillRequest, FillResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so stdout stays machine-readable
/// - RUST_LOG environment variable support (defaults to `warn`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
