//! # Placement Planner
//!
//! Turns a curve length plus spacing and count policies into an ordered list
//! of arc-length stations.
//!
//! Supports:
//! - Fixed, percentage, auto-fit and random spacing
//! - Cell-centred (`Manual`) and end-to-end (`ManualEven`) explicit counts
//! - Start/end padding
//! - Seam handling on closed paths
//! - Extending an existing station list for post-fill edits
//!
//! Stations are computed as `start + i * d` rather than by accumulation so
//! long fills do not drift.

use crate::config::{CountPolicy, FillConfig, SpacingMode};
use crate::random::FillRng;
use crate::sampler::CurveSampler;
use crate::stamp::{average_travel_extent, StampVariant};
use curvefill_core::{ConfigError, FillControl, GeometryError, Outcome, Point, Result};
use tracing::debug;

/// Upper bound on stations from a single plan.
pub const MAX_STATIONS: usize = 1_000_000;

/// A trailing station this close to the seam of a closed loop, as a fraction
/// of the spacing, duplicates the first station.
const SEAM_FRACTION: f64 = 0.01;

/// Relative tolerance for including a station that lands on the span end.
const END_TOLERANCE: f64 = 1e-9;

/// A candidate placement on the curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    /// Position in the station list
    pub index: usize,
    /// Arc length
    pub s: f64,
    pub segment: usize,
    pub t: f64,
    pub point: Point,
    /// Tangent direction in radians
    pub tangent_angle: f64,
    /// Left unit normal
    pub normal: Point,
}

impl Station {
    /// Samples the curve at `s`.
    pub fn at(sampler: &CurveSampler, index: usize, s: f64) -> Result<Self> {
        let (segment, t) = sampler.locate(s)?;
        let (point, tangent_angle) = sampler.position_at(s)?;
        Ok(Self {
            index,
            s,
            segment,
            t,
            point,
            tangent_angle,
            normal: Point::from_angle(tangent_angle).perp(),
        })
    }
}

/// Samples each arc length, numbering stations from `first_index`.
pub fn stations_at(
    sampler: &CurveSampler,
    arc_lengths: &[f64],
    first_index: usize,
) -> Result<Vec<Station>> {
    arc_lengths
        .iter()
        .enumerate()
        .map(|(i, &s)| Station::at(sampler, first_index + i, s))
        .collect()
}

/// Plans stations for a curve of `total_length`.
pub fn plan(
    total_length: f64,
    closed: bool,
    config: &FillConfig,
    stamps: &[StampVariant],
    rng: &mut FillRng,
    control: &FillControl,
) -> Result<Outcome<Vec<f64>>> {
    Planner::new(total_length, closed, config, stamps).plan(rng, control)
}

/// Station arithmetic for one curve, configuration and stamp list
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    total_length: f64,
    closed: bool,
    config: &'a FillConfig,
    stamps: &'a [StampVariant],
}

impl<'a> Planner<'a> {
    pub fn new(
        total_length: f64,
        closed: bool,
        config: &'a FillConfig,
        stamps: &'a [StampVariant],
    ) -> Self {
        Self {
            total_length,
            closed,
            config,
            stamps,
        }
    }

    fn span(&self) -> (f64, f64) {
        (
            self.config.start_padding,
            self.total_length - self.config.end_padding,
        )
    }

    fn tolerance(&self) -> f64 {
        END_TOLERANCE * self.total_length.max(1.0)
    }

    /// A closed path with no padding wraps its stations all the way around.
    fn is_full_loop(&self) -> bool {
        self.closed && self.config.start_padding == 0.0 && self.config.end_padding == 0.0
    }

    fn primary_extent(&self) -> Result<f64> {
        self.stamps
            .first()
            .map(StampVariant::travel_extent)
            .ok_or_else(|| ConfigError::EmptyStamps.into())
    }

    /// Arc distance between consecutive stations for fixed, percentage and
    /// random spacing; the minimum gap for random spacing.
    pub fn spacing_distance(&self) -> Result<f64> {
        let distance = match self.config.spacing {
            SpacingMode::Fixed { distance } => {
                if self.config.use_element_size {
                    if self.stamps.is_empty() {
                        return Err(ConfigError::EmptyStamps.into());
                    }
                    average_travel_extent(self.stamps) + distance
                } else {
                    distance
                }
            }
            SpacingMode::Percentage { percent } => self.primary_extent()? * percent / 100.0,
            SpacingMode::Random { min, .. } => min,
            SpacingMode::AutoFit { target } => match target {
                Some(target) => target,
                None => self.primary_extent()?,
            },
        };
        if !distance.is_finite() || distance <= 0.0 {
            return Err(ConfigError::InvalidSpacing {
                reason: format!(
                    "{} spacing resolves to {distance}, which is not a positive distance",
                    self.config.spacing.name()
                ),
            }
            .into());
        }
        Ok(distance)
    }

    fn check_station_budget(&self, span: f64, d: f64) -> Result<()> {
        let estimate = span / d;
        if estimate > MAX_STATIONS as f64 {
            return Err(ConfigError::InvalidSpacing {
                reason: format!(
                    "spacing {d} over {span} would produce more than {MAX_STATIONS} stations"
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Produces the full station list.
    ///
    /// Checks the cancellation flag between stations and returns the
    /// stations generated so far when it is set.
    pub fn plan(&self, rng: &mut FillRng, control: &FillControl) -> Result<Outcome<Vec<f64>>> {
        if !self.total_length.is_finite() || self.total_length <= 0.0 {
            return Err(GeometryError::degenerate(format!(
                "cannot plan on a curve of length {}",
                self.total_length
            ))
            .into());
        }
        self.config.validate()?;

        let (start, end) = self.span();
        if end < start - self.tolerance() {
            debug!(start, end, "Padding leaves no usable span");
            return Ok(Outcome::Complete(Vec::new()));
        }
        let span = (end - start).max(0.0);
        let count = self.config.count.count();

        let outcome = match (self.config.spacing, self.config.count) {
            (SpacingMode::Random { max, .. }, _) => {
                let min = self.spacing_distance()?;
                if count == Some(0) {
                    return Ok(Outcome::Complete(Vec::new()));
                }
                self.check_station_budget(span, min)?;
                match self.random_walk(start, end, min, max, MAX_STATIONS, rng, control) {
                    Outcome::Complete(mut out) => {
                        self.drop_seam_duplicate(&mut out, min);
                        Outcome::Complete(out)
                    }
                    cancelled => cancelled,
                }
            }
            (SpacingMode::AutoFit { .. }, policy) => {
                let n = match policy.count() {
                    Some(n) => n,
                    None => {
                        let target = self.spacing_distance()?;
                        self.check_station_budget(span, target)?;
                        let fits = (span / target + END_TOLERANCE).floor() as usize;
                        if self.is_full_loop() {
                            fits.max(1)
                        } else {
                            fits + 1
                        }
                    }
                };
                self.even(start, end, n, true, control)
            }
            (_, CountPolicy::Auto) => {
                let d = self.spacing_distance()?;
                self.check_station_budget(span, d)?;
                self.arithmetic(start, end, d, control)
            }
            (_, CountPolicy::Manual(n)) => {
                self.spacing_distance()?;
                self.centered(start, span, n, control)
            }
            (_, CountPolicy::ManualEven(n)) => {
                self.spacing_distance()?;
                self.even(start, end, n, false, control)
            }
        };

        debug!(
            stations = outcome.value().len(),
            spacing = self.config.spacing.name(),
            count = self.config.count.name(),
            length = self.total_length,
            cancelled = outcome.is_cancelled(),
            "Planned stations"
        );
        Ok(outcome)
    }

    /// Continues `previous` by up to `additional` stations.
    ///
    /// Only fixed, percentage and random spacing can be continued. New
    /// stations stay inside the path domain and, on closed paths, stop short
    /// of wrapping onto the first station. Returns only the new stations.
    pub fn extend(
        &self,
        previous: &[f64],
        additional: usize,
        rng: &mut FillRng,
        control: &FillControl,
    ) -> Result<Outcome<Vec<f64>>> {
        if !self.config.spacing.is_extendable() {
            return Err(ConfigError::InvalidSpacing {
                reason: format!(
                    "{} spacing cannot be extended; re-plan with a new count instead",
                    self.config.spacing.name()
                ),
            }
            .into());
        }
        let d = self.spacing_distance()?;
        let bound = if self.closed {
            self.total_length - SEAM_FRACTION * d
        } else {
            self.total_length
        };
        let tol = self.tolerance();
        let additional = additional.min(MAX_STATIONS.saturating_sub(previous.len()));

        let outcome = match previous.last() {
            None => {
                let start = self.config.start_padding;
                match self.config.spacing {
                    SpacingMode::Random { max, .. } => {
                        self.random_walk(start, bound, d, max, additional, rng, control)
                    }
                    _ => self.continue_arithmetic(start, 0, d, bound, tol, additional, control),
                }
            }
            Some(&last) => match self.config.spacing {
                SpacingMode::Random { min, max } => {
                    let first = last + rng.uniform(min, max);
                    self.random_walk(first, bound, min, max, additional, rng, control)
                }
                _ => self.continue_arithmetic(last, 1, d, bound, tol, additional, control),
            },
        };

        debug!(
            added = outcome.value().len(),
            requested = additional,
            "Extended stations"
        );
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    fn continue_arithmetic(
        &self,
        origin: f64,
        first_step: usize,
        d: f64,
        bound: f64,
        tol: f64,
        limit: usize,
        control: &FillControl,
    ) -> Outcome<Vec<f64>> {
        let mut out = Vec::new();
        for k in 0..limit {
            if control.is_cancelled() {
                return Outcome::Cancelled(out);
            }
            let s = origin + (first_step + k) as f64 * d;
            if s > bound + tol {
                break;
            }
            out.push(s.min(self.total_length));
            control.report(k + 1, limit);
        }
        control.report(limit, limit);
        Outcome::Complete(out)
    }

    fn arithmetic(&self, start: f64, end: f64, d: f64, control: &FillControl) -> Outcome<Vec<f64>> {
        let tol = self.tolerance();
        let expected = ((end - start) / d).floor() as usize + 1;
        let mut out = Vec::with_capacity(expected);
        let mut i = 0usize;
        loop {
            if control.is_cancelled() {
                return Outcome::Cancelled(out);
            }
            let s = start + i as f64 * d;
            if s > end + tol {
                break;
            }
            out.push(s.min(end));
            i += 1;
            control.report(i, expected);
        }
        self.drop_seam_duplicate(&mut out, d);
        control.report(expected, expected);
        Outcome::Complete(out)
    }

    /// Random gaps from `first` until past `end` or `limit` stations.
    #[allow(clippy::too_many_arguments)]
    fn random_walk(
        &self,
        first: f64,
        end: f64,
        min: f64,
        max: f64,
        limit: usize,
        rng: &mut FillRng,
        control: &FillControl,
    ) -> Outcome<Vec<f64>> {
        let tol = self.tolerance();
        let span = (end - first).max(0.0);
        let mut out = Vec::new();
        let mut s = first;
        while s <= end + tol && out.len() < limit {
            if control.is_cancelled() {
                return Outcome::Cancelled(out);
            }
            out.push(s.min(end));
            s += rng.uniform(min, max);
            if span > 0.0 {
                control.report((((s - first) / span).min(1.0) * 100.0) as usize, 100);
            }
        }
        control.report(100, 100);
        Outcome::Complete(out)
    }

    /// `n` stations centred in equal cells of the span.
    fn centered(&self, start: f64, span: f64, n: usize, control: &FillControl) -> Outcome<Vec<f64>> {
        let cell = if n > 0 { span / n as f64 } else { 0.0 };
        self.generate(n, control, |i| start + (i as f64 + 0.5) * cell)
    }

    /// `n` stations from `start` to `end` inclusive.
    ///
    /// A full loop spreads them evenly around the whole path instead, so the
    /// last station does not coincide with the first.
    fn even(
        &self,
        start: f64,
        end: f64,
        n: usize,
        single_at_midpoint: bool,
        control: &FillControl,
    ) -> Outcome<Vec<f64>> {
        let span = (end - start).max(0.0);
        if self.is_full_loop() {
            let d = if n > 0 { span / n as f64 } else { 0.0 };
            return self.generate(n, control, |i| start + i as f64 * d);
        }
        match n {
            0 => Outcome::Complete(Vec::new()),
            1 if single_at_midpoint => Outcome::Complete(vec![start + span / 2.0]),
            1 => Outcome::Complete(vec![start]),
            _ => {
                let d = span / (n - 1) as f64;
                self.generate(n, control, |i| {
                    if i == n - 1 {
                        end.max(start)
                    } else {
                        start + i as f64 * d
                    }
                })
            }
        }
    }

    fn generate(
        &self,
        n: usize,
        control: &FillControl,
        station: impl Fn(usize) -> f64,
    ) -> Outcome<Vec<f64>> {
        let mut out = Vec::with_capacity(n.min(MAX_STATIONS));
        for i in 0..n.min(MAX_STATIONS) {
            if control.is_cancelled() {
                return Outcome::Cancelled(out);
            }
            out.push(station(i));
            control.report(i + 1, n);
        }
        Outcome::Complete(out)
    }

    fn drop_seam_duplicate(&self, out: &mut Vec<f64>, d: f64) {
        if !self.is_full_loop() || out.len() < 2 {
            return;
        }
        if let Some(&last) = out.last() {
            if self.total_length - last < SEAM_FRACTION * d {
                out.pop();
            }
        }
    }
}
