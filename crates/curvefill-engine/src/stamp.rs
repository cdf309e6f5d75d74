//! Stamp variants and their local-space bounding proxies.
//!
//! A stamp's local frame has +x along the travel direction of the curve and
//! +y along the left normal. The local origin is the baseline anchor.

use curvefill_core::{Bounds, ConfigError, Point};
use serde::{Deserialize, Serialize};

/// Opaque host reference carried through to the output unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampHandle(pub u64);

/// Collision and alignment geometry of a stamp in its local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundingProxy {
    /// Axis-aligned rectangle
    Rect { bounds: Bounds },
    /// Convex hull of the supplied points
    Hull { points: Vec<Point> },
}

impl BoundingProxy {
    /// Counter-clockwise convex polygon of the proxy.
    pub fn polygon(&self) -> Vec<Point> {
        match self {
            BoundingProxy::Rect { bounds } => bounds.corners().to_vec(),
            BoundingProxy::Hull { points } => convex_hull(points),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            BoundingProxy::Rect { bounds } => *bounds,
            BoundingProxy::Hull { points } => {
                Bounds::from_points(points).unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
            }
        }
    }
}

/// One fill element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampVariant {
    pub handle: StampHandle,
    pub proxy: BoundingProxy,
}

impl StampVariant {
    pub fn new(handle: StampHandle, proxy: BoundingProxy) -> Self {
        Self { handle, proxy }
    }

    /// Rectangle proxy from local bounds.
    pub fn rect(handle: u64, bounds: Bounds) -> Self {
        Self::new(StampHandle(handle), BoundingProxy::Rect { bounds })
    }

    /// `width` x `height` rectangle centred on the local origin.
    pub fn centered(handle: u64, width: f64, height: f64) -> Self {
        debug_assert!(width.is_finite(), "width must be finite, got {width}");
        debug_assert!(height.is_finite(), "height must be finite, got {height}");
        Self::rect(
            handle,
            Bounds::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0),
        )
    }

    /// Convex hull proxy of arbitrary outline points.
    pub fn hull(handle: u64, points: Vec<Point>) -> Self {
        Self::new(StampHandle(handle), BoundingProxy::Hull { points })
    }

    pub fn bounds(&self) -> Bounds {
        self.proxy.bounds()
    }

    /// Size along the direction of travel.
    pub fn travel_extent(&self) -> f64 {
        self.bounds().width()
    }

    /// Size across the curve.
    pub fn normal_extent(&self) -> f64 {
        self.bounds().height()
    }

    /// Rejects non-finite or empty proxies.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidStamp {
            stamp: index,
            reason: reason.to_string(),
        };
        match &self.proxy {
            BoundingProxy::Rect { bounds } => {
                let corners = bounds.corners();
                if !corners.iter().all(Point::is_finite) {
                    return Err(invalid("rectangle has non-finite coordinates"));
                }
            }
            BoundingProxy::Hull { points } => {
                if points.is_empty() {
                    return Err(invalid("hull has no points"));
                }
                if !points.iter().all(Point::is_finite) {
                    return Err(invalid("hull has non-finite coordinates"));
                }
            }
        }
        Ok(())
    }
}

/// Mean travel extent over all stamps, zero for an empty list.
pub fn average_travel_extent(stamps: &[StampVariant]) -> f64 {
    if stamps.is_empty() {
        return 0.0;
    }
    stamps.iter().map(StampVariant::travel_extent).sum::<f64>() / stamps.len() as f64
}

/// Andrew's monotone chain. Returns the hull counter-clockwise without
/// repeating the first point; collinear points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: Point, a: Point, b: Point| (a - o).cross(b - o);
    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
