//! JSON request/response adapter around [`FillSession`].
//!
//! Requests carry geometry in a document unit. Everything is converted to
//! millimetres before planning and back to the request unit on output.

use anyhow::{Context, Result};
use curvefill_core::{Bounds, FillControl, LengthUnit, Point};
use curvefill_engine::{
    BoundingProxy, FillConfig, FillResult, FillSession, FillStatistics, Path, SpacingMode,
    StampVariant,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A fill job as read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRequest {
    #[serde(default)]
    pub unit: LengthUnit,
    pub path: Path,
    pub stamps: Vec<StampVariant>,
    #[serde(default)]
    pub config: FillConfig,
}

/// The outcome of a [`FillRequest`], in the request's unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillResponse {
    pub version: String,
    pub session_id: String,
    pub unit: LengthUnit,
    pub result: FillResult,
    pub statistics: FillStatistics,
}

impl FillRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse fill request")
    }

    /// Plans and executes the fill.
    pub fn run(self) -> Result<FillResponse> {
        let unit = self.unit;
        let k = unit.mm_per_unit();
        let path = self
            .path
            .scaled(k)
            .context("Failed to convert path to millimetres")?;
        let stamps = self.stamps.iter().map(|s| scale_stamp(s, k)).collect();
        let config = scale_config(self.config, k);

        let control = FillControl::new();
        let mut session = FillSession::new();
        session
            .plan(path, stamps, config, &control)
            .context("Failed to plan fill")?;
        let mut result = session
            .execute(&control)
            .context("Failed to execute fill")?
            .into_inner();

        for t in &mut result.transforms {
            t.position = t.position * (1.0 / k);
            t.s = unit.from_mm(t.s);
        }
        let mut statistics = session.statistics();
        statistics.curve_length = unit.from_mm(statistics.curve_length);

        info!(
            session = %session.id(),
            elements = result.count,
            unit = %unit,
            "Fill request completed"
        );
        Ok(FillResponse {
            version: crate::VERSION.to_string(),
            session_id: session.id().to_string(),
            unit,
            result,
            statistics,
        })
    }
}

fn scale_stamp(stamp: &StampVariant, k: f64) -> StampVariant {
    let proxy = match &stamp.proxy {
        BoundingProxy::Rect { bounds } => BoundingProxy::Rect {
            bounds: Bounds::new(
                bounds.min_x * k,
                bounds.min_y * k,
                bounds.max_x * k,
                bounds.max_y * k,
            ),
        },
        BoundingProxy::Hull { points } => BoundingProxy::Hull {
            points: points.iter().map(|p| *p * k).collect::<Vec<Point>>(),
        },
    };
    StampVariant::new(stamp.handle, proxy)
}

/// Converts the length-valued settings. Percentages, angles and scale
/// factors are unitless.
fn scale_config(mut config: FillConfig, k: f64) -> FillConfig {
    config.spacing = match config.spacing {
        SpacingMode::Fixed { distance } => SpacingMode::Fixed {
            distance: distance * k,
        },
        SpacingMode::AutoFit { target } => SpacingMode::AutoFit {
            target: target.map(|t| t * k),
        },
        SpacingMode::Random { min, max } => SpacingMode::Random {
            min: min * k,
            max: max * k,
        },
        percentage @ SpacingMode::Percentage { .. } => percentage,
    };
    config.start_padding *= k;
    config.end_padding *= k;
    config.offset *= k;
    config
}
