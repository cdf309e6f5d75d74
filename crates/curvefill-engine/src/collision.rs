//! # Collision Filter
//!
//! Rejects placements whose oriented footprint overlaps an accepted one.
//!
//! Candidates are processed strictly in station order, so an earlier station
//! always wins. Accepted footprints are kept in a [`SpatialIndex`] across
//! calls, which lets a session append candidates later and test them only
//! against what was already accepted.

use crate::resolver::PlacementTransform;
use crate::spatial_index::SpatialIndex;
use crate::stamp::StampVariant;
use curvefill_core::{Bounds, FillControl, Outcome, Point};
use std::collections::HashMap;
use tracing::{debug, info};

/// Relative slack below which projections are considered touching.
const TOUCH_EPSILON: f64 = 1e-9;

/// World-space convex outline of a placed stamp
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    polygon: Vec<Point>,
    bounds: Bounds,
}

impl Footprint {
    /// Transforms the stamp proxy by `transform`.
    pub fn new(stamp: &StampVariant, transform: &PlacementTransform) -> Self {
        let mut polygon: Vec<Point> = stamp
            .proxy
            .polygon()
            .into_iter()
            .map(|p| transform.apply(p))
            .collect();
        // Mirroring reverses the winding; SAT only needs the edge set.
        if transform.mirrored {
            polygon.reverse();
        }
        let bounds = Bounds::from_points(&polygon).unwrap_or_else(|| {
            Bounds::new(
                transform.position.x,
                transform.position.y,
                transform.position.x,
                transform.position.y,
            )
        });
        Self { polygon, bounds }
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Interior overlap test. Shared edges or corners do not count.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        let scale = self
            .bounds
            .width()
            .max(self.bounds.height())
            .max(other.bounds.width())
            .max(other.bounds.height())
            .max(1.0);
        let eps = TOUCH_EPSILON * scale;

        let (a, b) = (&self.bounds, &other.bounds);
        if a.max_x <= b.min_x + eps
            || b.max_x <= a.min_x + eps
            || a.max_y <= b.min_y + eps
            || b.max_y <= a.min_y + eps
        {
            return false;
        }

        for axis in self.axes().chain(other.axes()) {
            let (min_a, max_a) = project(&self.polygon, axis);
            let (min_b, max_b) = project(&other.polygon, axis);
            if max_a <= min_b + eps || max_b <= min_a + eps {
                return false;
            }
        }
        true
    }

    /// Unit edge normals.
    fn axes(&self) -> impl Iterator<Item = Point> + '_ {
        let n = self.polygon.len();
        let edges = if n > 2 { n } else { n.saturating_sub(1) };
        (0..edges).filter_map(move |i| {
            let edge = self.polygon[(i + 1) % n] - self.polygon[i];
            edge.perp().normalized()
        })
    }
}

fn project(polygon: &[Point], axis: Point) -> (f64, f64) {
    polygon
        .iter()
        .map(|p| p.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Result of one filter pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    /// Accepted transforms, in input order
    pub accepted: Vec<PlacementTransform>,
    /// Station indices of rejected transforms
    pub discarded: Vec<usize>,
}

/// Incremental overlap filter keyed by station index
#[derive(Debug, Clone, Default)]
pub struct CollisionFilter {
    index: SpatialIndex,
    footprints: HashMap<usize, Footprint>,
}

impl CollisionFilter {
    pub fn new(cell_size: f64) -> Self {
        Self {
            index: SpatialIndex::new(cell_size),
            footprints: HashMap::new(),
        }
    }

    /// Grid sized so a footprint at `max_scale` covers only a few cells.
    pub fn for_stamps(stamps: &[StampVariant], max_scale: f64) -> Self {
        let largest = stamps
            .iter()
            .map(|s| {
                let b = s.bounds();
                b.width().hypot(b.height())
            })
            .fold(0.0, f64::max);
        Self::new(largest * max_scale.abs())
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn cell_size(&self) -> f64 {
        self.index.cell_size()
    }

    /// Whether `footprint` overlaps any accepted footprint.
    pub fn collides(&self, footprint: &Footprint) -> bool {
        self.index
            .query(footprint.bounds())
            .into_iter()
            .filter_map(|id| self.footprints.get(&id))
            .any(|other| other.overlaps(footprint))
    }

    /// Records `transform` as accepted without testing it.
    pub fn insert(&mut self, stamp: &StampVariant, transform: &PlacementTransform) {
        let footprint = Footprint::new(stamp, transform);
        self.index.insert(transform.station_index, footprint.bounds());
        self.footprints.insert(transform.station_index, footprint);
    }

    /// Forgets the footprint accepted for `station_index`.
    pub fn remove(&mut self, station_index: usize) -> bool {
        self.index.remove(station_index);
        self.footprints.remove(&station_index).is_some()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.footprints.clear();
    }

    /// Tests each transform in order against everything accepted so far.
    ///
    /// Accepted transforms join the filter state. On cancellation the report
    /// covers the transforms processed before the flag was seen.
    pub fn filter(
        &mut self,
        transforms: &[PlacementTransform],
        stamps: &[StampVariant],
        control: &FillControl,
    ) -> Outcome<FilterReport> {
        let mut report = FilterReport::default();
        for (i, transform) in transforms.iter().enumerate() {
            if control.is_cancelled() {
                debug!(
                    processed = i,
                    accepted = report.accepted.len(),
                    "Collision filter cancelled"
                );
                return Outcome::Cancelled(report);
            }
            let Some(stamp) = stamps.get(transform.stamp_index) else {
                report.discarded.push(transform.station_index);
                continue;
            };
            let footprint = Footprint::new(stamp, transform);
            if self.collides(&footprint) {
                debug!(
                    station = transform.station_index,
                    s = transform.s,
                    "Discarded overlapping placement"
                );
                report.discarded.push(transform.station_index);
            } else {
                self.index.insert(transform.station_index, footprint.bounds());
                self.footprints.insert(transform.station_index, footprint);
                report.accepted.push(*transform);
            }
            control.report(i + 1, transforms.len());
        }

        if !report.discarded.is_empty() {
            info!(
                accepted = report.accepted.len(),
                discarded = report.discarded.len(),
                "Collision filter removed overlapping placements"
            );
        }
        Outcome::Complete(report)
    }
}
