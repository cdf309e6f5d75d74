//! # CurveFill Engine
//!
//! Places copies of small stamp shapes along a 2D curve. Given a path, a
//! list of stamp variants and a [`FillConfig`], the engine computes one
//! [`PlacementTransform`] per element. It never touches the stamp geometry
//! itself; callers map each transform back onto their own shapes.
//!
//! ## Pipeline
//!
//! ```text
//! Path ──> CurveSampler (arc-length table, corners)
//!            └── Planner (station arc lengths)
//!                  └── Resolver (position, rotation, scale, stamp choice)
//!                        └── CollisionFilter (spatial index + SAT)
//!                              └── FillResult
//!
//! FillSession drives the pipeline and keeps state for edits.
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use curvefill_engine::{FillConfig, FillSession, Path, StampVariant};
//! use curvefill_core::{FillControl, Point};
//!
//! let path = Path::circle(Point::ZERO, 50.0)?;
//! let stamps = vec![StampVariant::centered(1, 4.0, 4.0)];
//!
//! let mut session = FillSession::new();
//! let control = FillControl::new();
//! session.plan(path, stamps, FillConfig::default(), &control)?;
//! let result = session.execute(&control)?.into_inner();
//! ```

pub mod collision;
pub mod config;
pub mod path;
pub mod planner;
pub mod random;
pub mod resolver;
pub mod sampler;
pub mod session;
pub mod spatial_index;
pub mod stamp;

pub use collision::{CollisionFilter, FilterReport, Footprint};
pub use config::{
    Alignment, AngleMode, CountPolicy, FillConfig, PatternMode, ScaleMode, SpacingMode,
};
pub use path::{Path, Segment};
pub use planner::{plan, stations_at, Planner, Station};
pub use random::FillRng;
pub use resolver::{Neighbours, PlacementTransform, Resolver, Scale};
pub use sampler::{ArcLengthTable, Corner, CornerSet, CurveSampler, SamplerOptions, TableEntry};
pub use session::{FillResult, FillSession, FillStatistics, SessionState};
pub use spatial_index::{SpatialIndex, SpatialIndexStats};
pub use stamp::{BoundingProxy, StampHandle, StampVariant};
