//! # Fill Session
//!
//! Orchestrates sampler, planner, resolver and collision filter for one fill
//! and keeps enough state for non-destructive edits afterwards.
//!
//! ```text
//! Empty --plan--> Planned --execute--> Filled --adjust_count/redistribute--> Edited
//!   ^                                                                          |
//!   +----------------------------------- clear --------------------------------+
//! ```
//!
//! Every transition works on a copy of the session data and commits it only
//! on success, so a failed or cancelled call leaves the session as it was.

use crate::collision::CollisionFilter;
use crate::config::{CountPolicy, FillConfig, ScaleMode, SpacingMode};
use crate::path::Path;
use crate::planner::{stations_at, Planner, Station};
use crate::random::FillRng;
use crate::resolver::{PlacementTransform, Resolver};
use crate::sampler::{CurveSampler, SamplerOptions};
use crate::stamp::StampVariant;
use curvefill_core::{Error, FillControl, Outcome, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle state of a [`FillSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    Planned,
    Filled,
    Edited,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Empty => "Empty",
            SessionState::Planned => "Planned",
            SessionState::Filled => "Filled",
            SessionState::Edited => "Edited",
        };
        write!(f, "{}", name)
    }
}

/// Output of a fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillResult {
    pub transforms: Vec<PlacementTransform>,
    pub count: usize,
    /// Whether the collision filter rejected any candidate
    pub collisions_discarded: bool,
}

/// Summary of the current fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillStatistics {
    pub element_count: usize,
    pub curve_length: f64,
    pub stamp_count: usize,
    pub station_count: usize,
    pub discarded_count: usize,
    pub spacing_mode: String,
    pub angle_mode: String,
    pub scale_mode: String,
    pub pattern_mode: String,
    pub count_policy: String,
}

#[derive(Debug, Clone)]
struct FillData {
    sampler: CurveSampler,
    stamps: Vec<StampVariant>,
    config: FillConfig,
    rng: FillRng,
    stations: Vec<Station>,
    candidates: Vec<PlacementTransform>,
    accepted: Vec<PlacementTransform>,
    discarded: Vec<usize>,
    filter: Option<CollisionFilter>,
}

impl FillData {
    fn result(&self) -> FillResult {
        FillResult {
            transforms: self.accepted.clone(),
            count: self.accepted.len(),
            collisions_discarded: !self.discarded.is_empty(),
        }
    }

    fn new_filter(&self) -> Option<CollisionFilter> {
        self.config
            .collision_detection
            .then(|| CollisionFilter::for_stamps(&self.stamps, self.config.scale.max_factor()))
    }

    /// Plans and resolves from scratch, dropping any accepted transforms.
    fn replan(&mut self, control: &FillControl) -> Result<Outcome<()>> {
        let planner = Planner::new(
            self.sampler.total_length(),
            self.sampler.is_closed(),
            &self.config,
            &self.stamps,
        );
        let arc_lengths = match planner.plan(&mut self.rng, control)? {
            Outcome::Complete(v) => v,
            Outcome::Cancelled(_) => return Ok(Outcome::Cancelled(())),
        };
        self.stations = stations_at(&self.sampler, &arc_lengths, 0)?;

        let resolver = Resolver::new(&self.sampler, &self.config, &self.stamps)?;
        self.candidates = match resolver.resolve_all(
            &self.stations,
            self.stations.len(),
            &mut self.rng,
            control,
        )? {
            Outcome::Complete(v) => v,
            Outcome::Cancelled(_) => return Ok(Outcome::Cancelled(())),
        };
        self.accepted.clear();
        self.discarded.clear();
        self.filter = None;
        Ok(Outcome::Complete(()))
    }

    /// Runs the collision filter (if enabled) over all candidates.
    fn accept_all(&mut self, control: &FillControl) -> Outcome<()> {
        match self.new_filter() {
            Some(mut filter) => {
                let outcome = filter.filter(&self.candidates, &self.stamps, control);
                let cancelled = outcome.is_cancelled();
                let report = outcome.into_inner();
                self.accepted = report.accepted;
                self.discarded = report.discarded;
                self.filter = Some(filter);
                if cancelled {
                    return Outcome::Cancelled(());
                }
            }
            None => {
                self.accepted = self.candidates.clone();
                self.discarded.clear();
            }
        }
        Outcome::Complete(())
    }

    /// Spreads a gradient scale over the current station list again and
    /// re-filters, since the footprints change size.
    fn regrade(&mut self, control: &FillControl) -> Result<Outcome<()>> {
        if !matches!(self.config.scale, ScaleMode::Gradient { .. }) {
            return Ok(Outcome::Complete(()));
        }
        let total = self.stations.len();
        let resolver = Resolver::new(&self.sampler, &self.config, &self.stamps)?;
        self.candidates = self
            .candidates
            .iter()
            .map(|t| resolver.regrade(t, total))
            .collect();
        Ok(self.accept_all(control))
    }

    /// Removes up to `n` accepted transforms from the tail.
    fn trim(&mut self, n: usize) {
        let keep = self.accepted.len().saturating_sub(n);
        for removed in self.accepted.drain(keep..) {
            if let Some(filter) = self.filter.as_mut() {
                filter.remove(removed.station_index);
            }
        }
        let station_count = self
            .accepted
            .last()
            .map(|t| t.station_index + 1)
            .unwrap_or(0);
        self.stations.truncate(station_count);
        self.candidates.truncate(station_count);
        self.discarded.retain(|&i| i < station_count);
    }

    /// Appends stations past the current tail until `n` more are accepted or
    /// the path runs out.
    fn extend(&mut self, n: usize, control: &FillControl) -> Result<Outcome<()>> {
        let mut remaining = n;
        while remaining > 0 {
            let previous: Vec<f64> = self.stations.iter().map(|st| st.s).collect();
            let planner = Planner::new(
                self.sampler.total_length(),
                self.sampler.is_closed(),
                &self.config,
                &self.stamps,
            );
            let arc_lengths = match planner.extend(&previous, remaining, &mut self.rng, control)? {
                Outcome::Complete(v) => v,
                Outcome::Cancelled(_) => return Ok(Outcome::Cancelled(())),
            };
            if arc_lengths.is_empty() {
                warn!(
                    requested = n,
                    added = n - remaining,
                    "No room left on the path for more elements"
                );
                break;
            }

            let first = self.stations.len();
            let new_stations = stations_at(&self.sampler, &arc_lengths, first)?;
            self.stations.extend(new_stations);

            let resolver = Resolver::new(&self.sampler, &self.config, &self.stamps)?;
            let fresh = match resolver.resolve_from(
                &self.stations,
                first,
                self.stations.len(),
                &mut self.rng,
                control,
            )? {
                Outcome::Complete(v) => v,
                Outcome::Cancelled(_) => return Ok(Outcome::Cancelled(())),
            };
            self.candidates.extend_from_slice(&fresh);

            let (accepted, discarded) = match self.filter.as_mut() {
                Some(filter) => {
                    let outcome = filter.filter(&fresh, &self.stamps, control);
                    let cancelled = outcome.is_cancelled();
                    let report = outcome.into_inner();
                    if cancelled {
                        return Ok(Outcome::Cancelled(()));
                    }
                    (report.accepted, report.discarded)
                }
                None => (fresh, Vec::new()),
            };
            remaining = remaining.saturating_sub(accepted.len());
            self.accepted.extend(accepted);
            self.discarded.extend(discarded);
        }
        Ok(Outcome::Complete(()))
    }
}

/// A fill and its post-fill editing state
#[derive(Debug, Clone)]
pub struct FillSession {
    id: Uuid,
    state: SessionState,
    data: Option<FillData>,
}

impl Default for FillSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FillSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Empty,
            data: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> Option<&FillConfig> {
        self.data.as_ref().map(|d| &d.config)
    }

    pub fn sampler(&self) -> Option<&CurveSampler> {
        self.data.as_ref().map(|d| &d.sampler)
    }

    /// Every planned station, accepted or not.
    pub fn stations(&self) -> &[Station] {
        self.data.as_ref().map(|d| d.stations.as_slice()).unwrap_or(&[])
    }

    /// Resolved transforms before collision filtering.
    pub fn candidates(&self) -> &[PlacementTransform] {
        self.data
            .as_ref()
            .map(|d| d.candidates.as_slice())
            .unwrap_or(&[])
    }

    fn invalid(&self, action: &str) -> Error {
        Error::InvalidTransition {
            current: self.state.to_string(),
            action: action.to_string(),
        }
    }

    fn editable_data(&self, action: &str) -> Result<FillData> {
        match (self.state, &self.data) {
            (SessionState::Filled | SessionState::Edited, Some(data)) => Ok(data.clone()),
            _ => Err(self.invalid(action)),
        }
    }

    fn commit(&mut self, data: FillData, state: SessionState) {
        debug!(session = %self.id, from = %self.state, to = %state, "Session transition");
        self.data = Some(data);
        self.state = state;
    }

    /// Validates the inputs, measures the path and plans candidate transforms.
    ///
    /// On cancellation the session stays `Empty`.
    pub fn plan(
        &mut self,
        path: Path,
        stamps: Vec<StampVariant>,
        config: FillConfig,
        control: &FillControl,
    ) -> Result<Outcome<()>> {
        if self.state != SessionState::Empty {
            return Err(self.invalid("plan"));
        }
        config.validate_with_stamps(&stamps)?;

        let options = SamplerOptions::new(config.flatness_tolerance, config.corner_threshold_degrees);
        let sampler = CurveSampler::build(path, &options)?;
        let mut data = FillData {
            sampler,
            stamps,
            rng: FillRng::from_seed(config.random_seed),
            config,
            stations: Vec::new(),
            candidates: Vec::new(),
            accepted: Vec::new(),
            discarded: Vec::new(),
            filter: None,
        };
        if data.replan(control)?.is_cancelled() {
            info!(session = %self.id, "Planning cancelled");
            return Ok(Outcome::Cancelled(()));
        }

        info!(
            session = %self.id,
            stations = data.stations.len(),
            length = data.sampler.total_length(),
            "Fill planned"
        );
        self.commit(data, SessionState::Planned);
        Ok(Outcome::Complete(()))
    }

    /// Filters the planned candidates and freezes the accepted list.
    ///
    /// On cancellation the session stays `Planned` and the partial result is
    /// returned.
    pub fn execute(&mut self, control: &FillControl) -> Result<Outcome<FillResult>> {
        let mut data = match (self.state, &self.data) {
            (SessionState::Planned, Some(data)) => data.clone(),
            _ => return Err(self.invalid("execute")),
        };
        if data.accept_all(control).is_cancelled() {
            info!(session = %self.id, "Fill cancelled");
            return Ok(Outcome::Cancelled(data.result()));
        }

        let result = data.result();
        info!(
            session = %self.id,
            elements = result.count,
            discarded = data.discarded.len(),
            "Fill executed"
        );
        self.commit(data, SessionState::Filled);
        Ok(Outcome::Complete(result))
    }

    /// Adds or removes `delta` elements.
    ///
    /// Removals trim the tail. Additions continue fixed, percentage and random
    /// spacing past the last station, testing only the new candidates for
    /// collisions; count-driven fills are re-planned with the new count.
    /// A gradient scale is re-spread over the edited station list.
    pub fn adjust_count(&mut self, delta: isize, control: &FillControl) -> Result<Outcome<FillResult>> {
        let mut data = self.editable_data("adjust_count")?;
        let before = data.accepted.len();

        if delta < 0 {
            data.trim(delta.unsigned_abs());
            if data.regrade(control)?.is_cancelled() {
                return Ok(Outcome::Cancelled(data.result()));
            }
        } else if delta > 0 {
            let n = delta.unsigned_abs();
            let continues = matches!(data.config.spacing, SpacingMode::Random { .. })
                || (data.config.spacing.is_extendable() && data.config.count == CountPolicy::Auto);
            let outcome = if continues {
                if data.filter.is_none() {
                    data.filter = data.new_filter();
                    if let Some(filter) = data.filter.as_mut() {
                        for t in &data.accepted {
                            filter.insert(&data.stamps[t.stamp_index], t);
                        }
                    }
                }
                match data.extend(n, control)? {
                    Outcome::Complete(()) => data.regrade(control)?,
                    cancelled => cancelled,
                }
            } else {
                data.config.count = data.config.count.with_count(before + n);
                match data.replan(control)? {
                    Outcome::Complete(()) => data.accept_all(control),
                    cancelled => cancelled,
                }
            };
            if outcome.is_cancelled() {
                return Ok(Outcome::Cancelled(data.result()));
            }
        }

        info!(
            session = %self.id,
            from = before,
            to = data.accepted.len(),
            "Element count adjusted"
        );
        let result = data.result();
        self.commit(data, SessionState::Edited);
        Ok(Outcome::Complete(result))
    }

    /// Re-plans with `count` stations spread evenly from end to end.
    ///
    /// Random spacing ignores counts, so it is replaced by fixed spacing at
    /// its minimum gap first.
    pub fn redistribute(&mut self, count: usize, control: &FillControl) -> Result<Outcome<FillResult>> {
        let mut data = self.editable_data("redistribute")?;
        if let SpacingMode::Random { min, .. } = data.config.spacing {
            data.config.spacing = SpacingMode::Fixed { distance: min };
        }
        data.config.count = CountPolicy::ManualEven(count);

        let outcome = match data.replan(control)? {
            Outcome::Complete(()) => data.accept_all(control),
            cancelled => cancelled,
        };
        if outcome.is_cancelled() {
            return Ok(Outcome::Cancelled(data.result()));
        }

        info!(session = %self.id, count, elements = data.accepted.len(), "Fill redistributed");
        let result = data.result();
        self.commit(data, SessionState::Edited);
        Ok(Outcome::Complete(result))
    }

    /// Drops all fill data. Allowed from any state.
    pub fn clear(&mut self) {
        debug!(session = %self.id, from = %self.state, "Session cleared");
        self.data = None;
        self.state = SessionState::Empty;
    }

    /// Accepted transforms once the fill has executed.
    pub fn result(&self) -> Option<FillResult> {
        match self.state {
            SessionState::Filled | SessionState::Edited => self.data.as_ref().map(FillData::result),
            SessionState::Empty | SessionState::Planned => None,
        }
    }

    pub fn statistics(&self) -> FillStatistics {
        let config = self.data.as_ref().map(|d| d.config.clone()).unwrap_or_default();
        let (element_count, curve_length, stamp_count, station_count, discarded_count) =
            match &self.data {
                Some(d) => (
                    match self.state {
                        SessionState::Filled | SessionState::Edited => d.accepted.len(),
                        _ => 0,
                    },
                    d.sampler.total_length(),
                    d.stamps.len(),
                    d.stations.len(),
                    d.discarded.len(),
                ),
                None => (0, 0.0, 0, 0, 0),
            };
        FillStatistics {
            element_count,
            curve_length,
            stamp_count,
            station_count,
            discarded_count,
            spacing_mode: config.spacing.name().to_string(),
            angle_mode: config.angle.name().to_string(),
            scale_mode: config.scale.name().to_string(),
            pattern_mode: config.pattern.name().to_string(),
            count_policy: config.count.name().to_string(),
        }
    }
}
