//! # Fill Configuration
//!
//! Immutable settings snapshot for one fill operation. All lengths are in
//! millimetres and all angles in degrees; the resolver converts angles to
//! radians on output.
//!
//! Every field has a default, so partial JSON documents deserialize into a
//! usable configuration.

use crate::stamp::StampVariant;
use curvefill_core::ConfigError;
use serde::{Deserialize, Serialize};

/// How stations are spaced along the curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpacingMode {
    /// Constant arc distance between stations
    Fixed { distance: f64 },
    /// Distance as a percentage of the primary stamp's travel extent
    Percentage { percent: f64 },
    /// Stretch an integral number of stations over the span
    AutoFit {
        /// Target spacing; defaults to the primary stamp's travel extent
        #[serde(default)]
        target: Option<f64>,
    },
    /// Uniformly random gaps in `[min, max]`
    Random { min: f64, max: f64 },
}

impl Default for SpacingMode {
    fn default() -> Self {
        SpacingMode::Fixed { distance: 10.0 }
    }
}

impl SpacingMode {
    pub fn name(&self) -> &'static str {
        match self {
            SpacingMode::Fixed { .. } => "fixed",
            SpacingMode::Percentage { .. } => "percentage",
            SpacingMode::AutoFit { .. } => "auto_fit",
            SpacingMode::Random { .. } => "random",
        }
    }

    /// Whether a positive count adjustment can continue the existing stations.
    pub fn is_extendable(&self) -> bool {
        matches!(
            self,
            SpacingMode::Fixed { .. } | SpacingMode::Percentage { .. } | SpacingMode::Random { .. }
        )
    }
}

/// How each element is rotated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AngleMode {
    /// Align local +x with the curve tangent
    #[default]
    FollowCurve,
    /// Constant rotation
    Fixed { degrees: f64 },
    /// Uniformly random rotation in `[min, max]`
    Random { min: f64, max: f64 },
    /// `base + i * increment`, wrapped to [0, 360)
    Incremental { base: f64, increment: f64 },
    /// Tangent plus a quarter turn
    Perpendicular,
}

impl AngleMode {
    pub fn name(&self) -> &'static str {
        match self {
            AngleMode::FollowCurve => "follow_curve",
            AngleMode::Fixed { .. } => "fixed",
            AngleMode::Random { .. } => "random",
            AngleMode::Incremental { .. } => "incremental",
            AngleMode::Perpendicular => "perpendicular",
        }
    }
}

/// How each element is scaled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScaleMode {
    Uniform { factor: f64 },
    /// Linear ramp from `start` at the first station to `end` at the last
    Gradient { start: f64, end: f64 },
    Random { min: f64, max: f64 },
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Uniform { factor: 1.0 }
    }
}

impl ScaleMode {
    pub fn name(&self) -> &'static str {
        match self {
            ScaleMode::Uniform { .. } => "uniform",
            ScaleMode::Gradient { .. } => "gradient",
            ScaleMode::Random { .. } => "random",
        }
    }

    /// Largest factor this mode can produce.
    pub fn max_factor(&self) -> f64 {
        match *self {
            ScaleMode::Uniform { factor } => factor,
            ScaleMode::Gradient { start, end } => start.max(end),
            ScaleMode::Random { max, .. } => max,
        }
    }
}

/// Which stamp variant each station uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Always the first stamp
    #[default]
    Single,
    /// Cycle through the stamps, or through `pattern_sequence` when set
    Sequence,
    Random,
    Alternating,
}

impl PatternMode {
    pub fn name(&self) -> &'static str {
        match self {
            PatternMode::Single => "single",
            PatternMode::Sequence => "sequence",
            PatternMode::Random => "random",
            PatternMode::Alternating => "alternating",
        }
    }
}

/// How many stations to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Derived from the spacing mode
    #[default]
    Auto,
    /// `n` stations centred in equal cells of the span
    Manual(usize),
    /// `n` stations with the first and last on the span ends
    ManualEven(usize),
}

impl CountPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            CountPolicy::Auto => "auto",
            CountPolicy::Manual(_) => "manual",
            CountPolicy::ManualEven(_) => "manual_even",
        }
    }

    /// Explicit count, if any.
    pub fn count(&self) -> Option<usize> {
        match self {
            CountPolicy::Auto => None,
            CountPolicy::Manual(n) | CountPolicy::ManualEven(n) => Some(*n),
        }
    }

    /// Same policy with a different count; `Auto` becomes `Manual`.
    pub fn with_count(&self, n: usize) -> Self {
        match self {
            CountPolicy::ManualEven(_) => CountPolicy::ManualEven(n),
            CountPolicy::Auto | CountPolicy::Manual(_) => CountPolicy::Manual(n),
        }
    }
}

/// Which part of the stamp sits on the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Bounding-box centre on the curve
    #[default]
    Center,
    /// Top edge (local max y) on the curve
    Top,
    /// Bottom edge (local min y) on the curve
    Bottom,
    /// Local origin on the curve
    Baseline,
}

/// Complete configuration for one fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub spacing: SpacingMode,
    pub angle: AngleMode,
    pub scale: ScaleMode,
    pub pattern: PatternMode,
    pub count: CountPolicy,
    /// Arc length left empty at the start of the path (mm)
    pub start_padding: f64,
    /// Arc length left empty at the end of the path (mm)
    pub end_padding: f64,
    /// Distance along the left normal (mm)
    pub offset: f64,
    pub collision_detection: bool,
    pub corner_handling: bool,
    /// Seed for all random modes; entropy when absent
    pub random_seed: Option<u64>,
    /// Custom stamp order for `PatternMode::Sequence`
    pub pattern_sequence: Vec<usize>,
    pub alignment: Alignment,
    /// Treat fixed distance as the gap between elements instead of between origins
    pub use_element_size: bool,
    pub mirror_elements: bool,
    /// Toggle mirroring on every other element
    pub flip_alternate: bool,
    pub corner_threshold_degrees: f64,
    pub flatness_tolerance: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            spacing: SpacingMode::default(),
            angle: AngleMode::default(),
            scale: ScaleMode::default(),
            pattern: PatternMode::default(),
            count: CountPolicy::default(),
            start_padding: 0.0,
            end_padding: 0.0,
            offset: 0.0,
            collision_detection: false,
            corner_handling: true,
            random_seed: None,
            pattern_sequence: Vec::new(),
            alignment: Alignment::default(),
            use_element_size: false,
            mirror_elements: false,
            flip_alternate: false,
            corner_threshold_degrees: 45.0,
            flatness_tolerance: 0.001,
        }
    }
}

fn finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            name: name.to_string(),
            value,
        })
    }
}

fn range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(&format!("{name}.min"), min)?;
    finite(&format!("{name}.max"), max)?;
    if min > max {
        return Err(ConfigError::InvertedRange {
            name: name.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

impl FillConfig {
    pub fn with_spacing(mut self, spacing: SpacingMode) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_angle(mut self, angle: AngleMode) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_scale(mut self, scale: ScaleMode) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_pattern(mut self, pattern: PatternMode) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_count(mut self, count: CountPolicy) -> Self {
        self.count = count;
        self
    }

    pub fn with_padding(mut self, start: f64, end: f64) -> Self {
        self.start_padding = start;
        self.end_padding = end;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_collision_detection(mut self, enabled: bool) -> Self {
        self.collision_detection = enabled;
        self
    }

    pub fn with_corner_handling(mut self, enabled: bool) -> Self {
        self.corner_handling = enabled;
        self
    }

    /// Checks every numeric field and range, independent of the stamps.
    ///
    /// Spacing distances that depend on stamp sizes are checked by the
    /// planner, since they are only known once the stamps are.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("start_padding", self.start_padding)?;
        non_negative("end_padding", self.end_padding)?;
        finite("offset", self.offset)?;
        positive("flatness_tolerance", self.flatness_tolerance)?;
        finite("corner_threshold_degrees", self.corner_threshold_degrees)?;
        if !(0.0..=180.0).contains(&self.corner_threshold_degrees) {
            return Err(ConfigError::OutOfBounds {
                name: "corner_threshold_degrees".to_string(),
                value: self.corner_threshold_degrees,
                min: 0.0,
                max: 180.0,
            });
        }

        match self.spacing {
            SpacingMode::Fixed { distance } => finite("spacing.distance", distance)?,
            SpacingMode::Percentage { percent } => finite("spacing.percent", percent)?,
            SpacingMode::AutoFit { target } => {
                if let Some(target) = target {
                    finite("spacing.target", target)?;
                }
            }
            SpacingMode::Random { min, max } => {
                range("spacing", min, max)?;
                if min <= 0.0 {
                    return Err(ConfigError::InvalidSpacing {
                        reason: format!("random spacing minimum must be positive, got {min}"),
                    });
                }
            }
        }

        match self.angle {
            AngleMode::FollowCurve | AngleMode::Perpendicular => {}
            AngleMode::Fixed { degrees } => finite("angle.degrees", degrees)?,
            AngleMode::Random { min, max } => range("angle", min, max)?,
            AngleMode::Incremental { base, increment } => {
                finite("angle.base", base)?;
                finite("angle.increment", increment)?;
            }
        }

        match self.scale {
            ScaleMode::Uniform { factor } => positive("scale.factor", factor)?,
            ScaleMode::Gradient { start, end } => {
                positive("scale.start", start)?;
                positive("scale.end", end)?;
            }
            ScaleMode::Random { min, max } => {
                range("scale", min, max)?;
                positive("scale.min", min)?;
            }
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus the checks that need the stamp list.
    pub fn validate_with_stamps(&self, stamps: &[StampVariant]) -> Result<(), ConfigError> {
        self.validate()?;
        if stamps.is_empty() {
            return Err(ConfigError::EmptyStamps);
        }
        for (index, stamp) in stamps.iter().enumerate() {
            stamp.validate(index)?;
        }
        if let Some(&index) = self.pattern_sequence.iter().find(|&&i| i >= stamps.len()) {
            return Err(ConfigError::PatternIndex {
                index,
                stamp_count: stamps.len(),
            });
        }
        Ok(())
    }
}
