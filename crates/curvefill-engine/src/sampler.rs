//! # Curve Sampler
//!
//! Converts a [`Path`] into an arc-length parameterization.
//!
//! Supports:
//! - Exact lengths for line segments
//! - Adaptive subdivision of cubic Béziers with a flatness tolerance
//! - Arc length to `(segment, t)` lookup and its inverse
//! - Position, tangent angle and left normal at any arc length
//! - Corner detection at vertices whose turn angle exceeds a threshold
//!
//! Closed paths wrap, so `s = total_length` addresses the same point as
//! `s = 0`. Open paths reject queries outside `[0, total_length]`.

use crate::path::{Path, Segment};
use curvefill_core::geometry::wrap_angle;
use curvefill_core::{GeometryError, Point, Result};
use std::ops::Range;
use tracing::debug;

/// Subdivision always splits at least this many times.
const MIN_DEPTH: u32 = 3;

/// Queries this far outside an open path's domain are clamped, not rejected.
const DOMAIN_EPSILON: f64 = 1e-9;

/// Build options for [`CurveSampler`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerOptions {
    /// Maximum chord-to-arc deviation, relative to the segment chord
    pub flatness_tolerance: f64,
    /// Turn angle above which a vertex counts as a corner (radians)
    pub corner_threshold: f64,
    /// Recursion limit for Bézier subdivision
    pub max_depth: u32,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            flatness_tolerance: 0.001,
            corner_threshold: 45f64.to_radians(),
            max_depth: 16,
        }
    }
}

impl SamplerOptions {
    pub fn new(flatness_tolerance: f64, corner_threshold_degrees: f64) -> Self {
        debug_assert!(
            flatness_tolerance.is_finite(),
            "flatness_tolerance must be finite, got {flatness_tolerance}"
        );
        Self {
            flatness_tolerance,
            corner_threshold: corner_threshold_degrees.to_radians(),
            ..Self::default()
        }
    }
}

/// One sample of the arc-length table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableEntry {
    /// Arc length from the path start
    pub s: f64,
    /// Segment index
    pub segment: usize,
    /// Local parameter within the segment
    pub t: f64,
}

/// Monotone table of `(s, segment, t)` samples covering `[0, total_length]`.
#[derive(Debug, Clone)]
pub struct ArcLengthTable {
    entries: Vec<TableEntry>,
    ranges: Vec<Range<usize>>,
    offsets: Vec<f64>,
    lengths: Vec<f64>,
    total: f64,
}

impl ArcLengthTable {
    fn build(path: &Path, options: &SamplerOptions) -> Self {
        let segments = path.segments();
        let mut entries = Vec::new();
        let mut ranges = Vec::with_capacity(segments.len());
        let mut offsets = Vec::with_capacity(segments.len());
        let mut lengths = Vec::with_capacity(segments.len());
        let mut s = 0.0;

        for (index, segment) in segments.iter().enumerate() {
            offsets.push(s);
            let first = entries.len();
            if segment.is_zero_length() {
                ranges.push(first..first);
                lengths.push(0.0);
                continue;
            }

            entries.push(TableEntry {
                s,
                segment: index,
                t: 0.0,
            });
            let start = s;
            match segment {
                Segment::Line { .. } => {
                    s += segment.chord_length();
                    entries.push(TableEntry {
                        s,
                        segment: index,
                        t: 1.0,
                    });
                }
                Segment::Cubic { .. } => {
                    let reference = if segment.chord_length() > f64::EPSILON {
                        segment.chord_length()
                    } else {
                        segment.control_length()
                    };
                    let mut ctx = Subdivision {
                        segment,
                        index,
                        tolerance: options.flatness_tolerance * reference,
                        max_depth: options.max_depth.max(MIN_DEPTH),
                        s,
                        entries: &mut entries,
                    };
                    ctx.split(0.0, segment.start(), 1.0, segment.end(), 0);
                    s = ctx.s;
                }
            }
            lengths.push(s - start);
            ranges.push(first..entries.len());
        }

        Self {
            entries,
            ranges,
            offsets,
            lengths,
            total: s,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.total
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn segment_count(&self) -> usize {
        self.lengths.len()
    }

    /// Length of segment `index`, zero for degenerate or unknown segments.
    pub fn segment_length(&self, index: usize) -> f64 {
        self.lengths.get(index).copied().unwrap_or(0.0)
    }

    /// Arc length at which segment `index` starts.
    pub fn segment_start(&self, index: usize) -> f64 {
        self.offsets.get(index).copied().unwrap_or(self.total)
    }

    /// Maps an arc length in `[0, total]` to `(segment, t)`.
    ///
    /// Values outside the range are clamped.
    pub fn locate(&self, s: f64) -> (usize, f64) {
        let Some(last) = self.entries.last() else {
            return (0, 0.0);
        };
        let s = s.clamp(0.0, self.total);
        let idx = self.entries.partition_point(|e| e.s <= s);
        if idx == 0 {
            let e = self.entries[0];
            return (e.segment, e.t);
        }
        if idx >= self.entries.len() {
            return (last.segment, last.t);
        }
        let a = self.entries[idx - 1];
        let b = self.entries[idx];
        if a.segment != b.segment || b.s <= a.s {
            return (a.segment, a.t);
        }
        let f = (s - a.s) / (b.s - a.s);
        (a.segment, a.t + (b.t - a.t) * f)
    }

    /// Inverse of [`locate`](Self::locate): arc length at `(segment, t)`.
    pub fn arc_length_at(&self, segment: usize, t: f64) -> f64 {
        let Some(range) = self.ranges.get(segment) else {
            return self.total;
        };
        let slice = &self.entries[range.clone()];
        if slice.is_empty() {
            return self.segment_start(segment);
        }
        let t = t.clamp(0.0, 1.0);
        let idx = slice.partition_point(|e| e.t <= t);
        if idx == 0 {
            return slice[0].s;
        }
        if idx >= slice.len() {
            return slice[slice.len() - 1].s;
        }
        let a = slice[idx - 1];
        let b = slice[idx];
        if b.t <= a.t {
            return a.s;
        }
        a.s + (b.s - a.s) * (t - a.t) / (b.t - a.t)
    }
}

struct Subdivision<'a> {
    segment: &'a Segment,
    index: usize,
    tolerance: f64,
    max_depth: u32,
    s: f64,
    entries: &'a mut Vec<TableEntry>,
}

impl Subdivision<'_> {
    fn split(&mut self, t0: f64, p0: Point, t1: f64, p1: Point, depth: u32) {
        let tm = 0.5 * (t0 + t1);
        let pm = self.segment.sample(tm);
        let chord = p0.distance_to(&p1);
        let first = p0.distance_to(&pm);
        let half_sum = first + pm.distance_to(&p1);

        if depth < self.max_depth && (depth < MIN_DEPTH || half_sum - chord > self.tolerance) {
            self.split(t0, p0, tm, pm, depth + 1);
            self.split(tm, pm, t1, p1, depth + 1);
            return;
        }

        // Richardson step on the two chord estimates.
        let length = half_sum + (half_sum - chord) / 3.0;
        let mid = if half_sum > 0.0 {
            length * first / half_sum
        } else {
            0.0
        };
        self.entries.push(TableEntry {
            s: self.s + mid,
            segment: self.index,
            t: tm,
        });
        self.s += length;
        self.entries.push(TableEntry {
            s: self.s,
            segment: self.index,
            t: t1,
        });
    }
}

/// A path vertex where the direction changes sharply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Index of the segment that starts at this vertex
    pub vertex: usize,
    /// Arc length of the vertex
    pub s: f64,
    pub point: Point,
    /// Absolute change of direction in radians, in [0, PI]
    pub turn_angle: f64,
}

/// Corners of a path, ordered by arc length.
#[derive(Debug, Clone, Default)]
pub struct CornerSet {
    corners: Vec<Corner>,
}

impl CornerSet {
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Corner> {
        self.corners.iter()
    }

    pub fn as_slice(&self) -> &[Corner] {
        &self.corners
    }
}

/// Arc-length parameterization of a path.
#[derive(Debug, Clone)]
pub struct CurveSampler {
    path: Path,
    table: ArcLengthTable,
    corners: CornerSet,
}

impl CurveSampler {
    /// Measure `path` and detect its corners.
    pub fn build(path: Path, options: &SamplerOptions) -> Result<Self> {
        if path.segment_count() == 0 {
            return Err(GeometryError::degenerate("path has no segments").into());
        }
        if !options.flatness_tolerance.is_finite() || options.flatness_tolerance <= 0.0 {
            return Err(GeometryError::degenerate(format!(
                "flatness tolerance must be positive, got {}",
                options.flatness_tolerance
            ))
            .into());
        }

        let table = ArcLengthTable::build(&path, options);
        if table.total_length() <= crate::path::ZERO_LENGTH || !table.total_length().is_finite() {
            return Err(GeometryError::degenerate(
                "path has zero length or fewer than two distinct points",
            )
            .into());
        }

        let corners = detect_corners(&path, &table, options.corner_threshold);
        debug!(
            segments = path.segment_count(),
            samples = table.entries().len(),
            length = table.total_length(),
            corners = corners.len(),
            closed = path.is_closed(),
            "Built curve sampler"
        );

        Ok(Self {
            path,
            table,
            corners,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &ArcLengthTable {
        &self.table
    }

    pub fn corners(&self) -> &CornerSet {
        &self.corners
    }

    pub fn total_length(&self) -> f64 {
        self.table.total_length()
    }

    pub fn is_closed(&self) -> bool {
        self.path.is_closed()
    }

    pub fn segment_length(&self, index: usize) -> f64 {
        self.table.segment_length(index)
    }

    /// Brings `s` into `[0, total]`: wrapped on closed paths, checked on open ones.
    pub fn normalize(&self, s: f64) -> Result<f64> {
        let total = self.total_length();
        if !s.is_finite() {
            return Err(GeometryError::OutOfRange { s, total }.into());
        }
        if self.is_closed() {
            let wrapped = s.rem_euclid(total);
            return Ok(if wrapped >= total { 0.0 } else { wrapped });
        }
        if s < -DOMAIN_EPSILON || s > total + DOMAIN_EPSILON {
            return Err(GeometryError::OutOfRange { s, total }.into());
        }
        Ok(s.clamp(0.0, total))
    }

    pub fn locate(&self, s: f64) -> Result<(usize, f64)> {
        let s = self.normalize(s)?;
        Ok(self.table.locate(s))
    }

    pub fn arc_length_at(&self, segment: usize, t: f64) -> f64 {
        self.table.arc_length_at(segment, t)
    }

    /// Point and tangent angle (radians) at arc length `s`.
    pub fn position_at(&self, s: f64) -> Result<(Point, f64)> {
        let (segment, t) = self.locate(s)?;
        let seg = &self.path.segments()[segment];
        let angle = seg.tangent_at(t).map(|d| d.angle()).unwrap_or(0.0);
        Ok((seg.sample(t), angle))
    }

    /// Unit tangent at `s`.
    pub fn tangent_at(&self, s: f64) -> Result<Point> {
        let (segment, t) = self.locate(s)?;
        Ok(self.path.segments()[segment]
            .tangent_at(t)
            .unwrap_or(Point::new(1.0, 0.0)))
    }

    /// Left-hand unit normal at `s`.
    pub fn normal_at(&self, s: f64) -> Result<Point> {
        Ok(self.tangent_at(s)?.perp())
    }

    /// Corner closest to `s` and the signed arc distance `s - corner.s`.
    ///
    /// On closed paths the distance is measured the short way around.
    pub fn nearest_corner(&self, s: f64) -> Option<(&Corner, f64)> {
        let total = self.total_length();
        let closed = self.is_closed();
        self.corners
            .iter()
            .map(|c| {
                let mut d = s - c.s;
                if closed {
                    d = d.rem_euclid(total);
                    if d > total / 2.0 {
                        d -= total;
                    }
                }
                (c, d)
            })
            .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

fn detect_corners(path: &Path, table: &ArcLengthTable, threshold: f64) -> CornerSet {
    // Only segments with length carry a direction.
    let live: Vec<usize> = (0..path.segment_count())
        .filter(|&i| table.segment_length(i) > 0.0)
        .collect();
    let segments = path.segments();
    let mut corners = Vec::new();

    let mut check = |incoming: usize, outgoing: usize, s: f64| {
        let (Some(a), Some(b)) = (
            segments[incoming].tangent_at(1.0),
            segments[outgoing].tangent_at(0.0),
        ) else {
            return;
        };
        let turn = wrap_angle(b.angle() - a.angle()).abs();
        if turn > threshold {
            corners.push(Corner {
                vertex: outgoing,
                s,
                point: segments[outgoing].start(),
                turn_angle: turn,
            });
        }
    };

    if path.is_closed() && live.len() > 1 {
        check(live[live.len() - 1], live[0], 0.0);
    }
    for pair in live.windows(2) {
        check(pair[0], pair[1], table.segment_start(pair[1]));
    }

    corners.sort_by(|a, b| a.s.total_cmp(&b.s));
    CornerSet { corners }
}
