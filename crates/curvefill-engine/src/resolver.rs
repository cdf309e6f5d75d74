//! # Transform Resolver
//!
//! Derives a placement transform for every station: stamp variant, scale,
//! corner nudge, position, rotation and mirroring, in that order.
//!
//! Random draws happen in a fixed order per station (pattern, then scale,
//! then angle) so seeded fills are reproducible.

use crate::config::{Alignment, AngleMode, FillConfig, PatternMode, ScaleMode};
use crate::planner::Station;
use crate::random::FillRng;
use crate::sampler::CurveSampler;
use crate::stamp::StampVariant;
use curvefill_core::geometry::wrap_angle;
use curvefill_core::{ConfigError, FillControl, Outcome, Point, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Per-axis scale factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub fn uniform(factor: f64) -> Self {
        Self {
            x: factor,
            y: factor,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// An accepted placement of one stamp.
///
/// Maps a stamp-local point `p` to the world by mirroring x (when
/// `mirrored`), scaling, rotating by `rotation` and translating to
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementTransform {
    /// World position of the stamp's local origin
    pub position: Point,
    /// Radians, counter-clockwise
    pub rotation: f64,
    pub scale: Scale,
    pub stamp_index: usize,
    pub station_index: usize,
    /// Arc length the element is attached to, after any corner nudge
    pub s: f64,
    pub mirrored: bool,
    pub corner_adjusted: bool,
}

impl PlacementTransform {
    /// Mirror, scale and rotate without translating.
    pub fn apply_linear(&self, local: Point) -> Point {
        let x = if self.mirrored { -local.x } else { local.x };
        Point::new(x * self.scale.x, local.y * self.scale.y).rotated(self.rotation)
    }

    /// Stamp-local point to world coordinates.
    pub fn apply(&self, local: Point) -> Point {
        self.apply_linear(local) + self.position
    }
}

/// Arc lengths of the stations on either side of the one being resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighbours {
    pub prev: Option<f64>,
    pub next: Option<f64>,
}

/// Linear ramp from `start` at index 0 to exactly `end` at the last index.
fn gradient(start: f64, end: f64, index: usize, total_stations: usize) -> f64 {
    if total_stations <= 1 || index == 0 {
        start
    } else if index + 1 >= total_stations {
        end
    } else {
        let t = index as f64 / (total_stations - 1) as f64;
        start + (end - start) * t
    }
}

/// `base + index * increment` wrapped into `[0, 360)`.
fn incremental_degrees(base: f64, increment: f64, index: usize) -> f64 {
    let wrapped = (base + index as f64 * increment).rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Resolves stations against one sampler, configuration and stamp list.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    sampler: &'a CurveSampler,
    config: &'a FillConfig,
    stamps: &'a [StampVariant],
}

impl<'a> Resolver<'a> {
    pub fn new(
        sampler: &'a CurveSampler,
        config: &'a FillConfig,
        stamps: &'a [StampVariant],
    ) -> Result<Self> {
        if stamps.is_empty() {
            return Err(ConfigError::EmptyStamps.into());
        }
        Ok(Self {
            sampler,
            config,
            stamps,
        })
    }

    fn stamp_index(&self, index: usize, rng: &mut FillRng) -> usize {
        let n = self.stamps.len();
        match self.config.pattern {
            PatternMode::Single => 0,
            PatternMode::Sequence if !self.config.pattern_sequence.is_empty() => {
                let seq = &self.config.pattern_sequence;
                seq[index % seq.len()] % n
            }
            PatternMode::Sequence | PatternMode::Alternating => index % n,
            PatternMode::Random => rng.index(n),
        }
    }

    fn scale(&self, index: usize, total_stations: usize, rng: &mut FillRng) -> f64 {
        match self.config.scale {
            ScaleMode::Uniform { factor } => factor,
            ScaleMode::Gradient { start, end } => gradient(start, end, index, total_stations),
            ScaleMode::Random { min, max } => rng.uniform(min, max),
        }
    }

    fn anchor(&self, stamp: &StampVariant) -> Point {
        let bounds = stamp.bounds();
        let (cx, cy) = bounds.center();
        match self.config.alignment {
            Alignment::Center => Point::new(cx, cy),
            Alignment::Top => Point::new(cx, bounds.max_y),
            Alignment::Bottom => Point::new(cx, bounds.min_y),
            Alignment::Baseline => Point::ZERO,
        }
    }

    /// Re-evaluates a gradient scale for a fill that now has
    /// `total_stations` stations.
    ///
    /// The anchor stays on the same curve point; stamp choice, rotation,
    /// mirroring and arc length are kept. Other scale modes are returned
    /// unchanged.
    pub fn regrade(&self, transform: &PlacementTransform, total_stations: usize) -> PlacementTransform {
        let ScaleMode::Gradient { start, end } = self.config.scale else {
            return *transform;
        };
        let Some(stamp) = self.stamps.get(transform.stamp_index) else {
            return *transform;
        };
        let anchor = self.anchor(stamp);
        let on_curve = transform.apply(anchor);
        let mut out = *transform;
        out.scale = Scale::uniform(gradient(start, end, transform.station_index, total_stations));
        out.position = on_curve - out.apply_linear(anchor);
        out
    }

    fn rotation(&self, index: usize, tangent: f64, rng: &mut FillRng) -> f64 {
        match self.config.angle {
            AngleMode::FollowCurve => tangent,
            AngleMode::Fixed { degrees } => degrees.to_radians(),
            AngleMode::Random { min, max } => rng.uniform(min, max).to_radians(),
            AngleMode::Incremental { base, increment } => {
                incremental_degrees(base, increment, index).to_radians()
            }
            AngleMode::Perpendicular => wrap_angle(tangent + FRAC_PI_2),
        }
    }

    /// Moves `s` away from a nearby corner so the element clears it.
    ///
    /// The move is limited to the midpoint toward the neighbouring station
    /// and to the path domain. Returns the new arc length and whether it moved.
    fn nudge_from_corner(&self, s: f64, half_extent: f64, neighbours: Neighbours) -> (f64, bool) {
        let Some((_, offset)) = self.sampler.nearest_corner(s) else {
            return (s, false);
        };
        let distance = offset.abs();
        if distance >= half_extent {
            return (s, false);
        }

        let total = self.sampler.total_length();
        let closed = self.sampler.is_closed();
        let mut forward = offset >= 0.0;
        if !closed && forward && s >= total {
            forward = false;
        }
        let deficit = half_extent - distance;
        let mut target = if forward { s + deficit } else { s - deficit };

        if forward {
            if let Some(next) = neighbours.next {
                target = target.min(0.5 * (s + next));
            }
        } else if let Some(prev) = neighbours.prev {
            target = target.max(0.5 * (s + prev));
        }
        if closed {
            target = target.rem_euclid(total);
        } else {
            target = target.clamp(0.0, total);
        }

        if (target - s).abs() <= f64::EPSILON * total.max(1.0) {
            (s, false)
        } else {
            (target, true)
        }
    }

    /// Builds the transform for `station`.
    ///
    /// `total_stations` drives gradient scaling; `neighbours` bounds the
    /// corner nudge.
    pub fn resolve(
        &self,
        station: &Station,
        neighbours: Neighbours,
        total_stations: usize,
        rng: &mut FillRng,
    ) -> Result<PlacementTransform> {
        let index = station.index;
        let stamp_index = self.stamp_index(index, rng);
        let stamp = &self.stamps[stamp_index];
        let factor = self.scale(index, total_stations, rng);
        let scale = Scale::uniform(factor);

        let (s, corner_adjusted) = if self.config.corner_handling {
            let half = 0.5 * stamp.travel_extent() * scale.x.abs();
            self.nudge_from_corner(station.s, half, neighbours)
        } else {
            (station.s, false)
        };

        let (point, tangent) = if corner_adjusted {
            self.sampler.position_at(s)?
        } else {
            (station.point, station.tangent_angle)
        };
        let normal = Point::from_angle(tangent).perp();
        let rotation = self.rotation(index, tangent, rng);
        let mirrored = self.config.mirror_elements ^ (self.config.flip_alternate && index % 2 == 1);

        let mut transform = PlacementTransform {
            position: Point::ZERO,
            rotation,
            scale,
            stamp_index,
            station_index: index,
            s,
            mirrored,
            corner_adjusted,
        };

        let anchor = self.anchor(stamp);
        let on_curve = point + normal * self.config.offset;
        transform.position = on_curve - transform.apply_linear(anchor);
        Ok(transform)
    }

    /// Resolves every station in order.
    pub fn resolve_all(
        &self,
        stations: &[Station],
        total_stations: usize,
        rng: &mut FillRng,
        control: &FillControl,
    ) -> Result<Outcome<Vec<PlacementTransform>>> {
        self.resolve_from(stations, 0, total_stations, rng, control)
    }

    /// Resolves `stations[from..]`, using the earlier stations as neighbours.
    ///
    /// This is how an appended tail is resolved without touching the
    /// transforms already produced for the head.
    pub fn resolve_from(
        &self,
        stations: &[Station],
        from: usize,
        total_stations: usize,
        rng: &mut FillRng,
        control: &FillControl,
    ) -> Result<Outcome<Vec<PlacementTransform>>> {
        let total = self.sampler.total_length();
        let wraps = self.sampler.is_closed() && stations.len() > 1;
        let pending = stations.len().saturating_sub(from);
        let mut out = Vec::with_capacity(pending);

        for i in from..stations.len() {
            if control.is_cancelled() {
                return Ok(Outcome::Cancelled(out));
            }
            let prev = match i {
                0 if wraps => stations.last().map(|l| l.s - total),
                0 => None,
                _ => Some(stations[i - 1].s),
            };
            let next = if i + 1 < stations.len() {
                Some(stations[i + 1].s)
            } else if wraps {
                Some(stations[0].s + total)
            } else {
                None
            };
            out.push(self.resolve(&stations[i], Neighbours { prev, next }, total_stations, rng)?);
            control.report(i + 1 - from, pending);
        }
        Ok(Outcome::Complete(out))
    }
}
