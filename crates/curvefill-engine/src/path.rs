//! Path model: an ordered list of line and cubic Bézier segments.
//!
//! Paths are flattened, index-based snapshots of host geometry. They are
//! validated once on construction and never mutated afterwards.

use curvefill_core::{Bounds, GeometryError, Point, Result};
use lyon::geom::{point, CubicBezierSegment, LineSegment};
use serde::{Deserialize, Serialize};

/// Relative tolerance used when checking that segments join up.
const CONTINUITY_TOLERANCE: f64 = 1e-6;

/// Segments whose control polygon is shorter than this contribute no length.
pub(crate) const ZERO_LENGTH: f64 = 1e-9;

/// Circle approximation constant for a quarter arc: 4/3 * (sqrt(2) - 1).
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// One piece of a path, parameterized locally over `t` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

fn lyon_point(p: Point) -> lyon::geom::Point<f64> {
    point(p.x, p.y)
}

impl Segment {
    pub fn line(from: Point, to: Point) -> Self {
        Segment::Line { from, to }
    }

    pub fn cubic(from: Point, ctrl1: Point, ctrl2: Point, to: Point) -> Self {
        Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        }
    }

    pub fn start(&self) -> Point {
        match self {
            Segment::Line { from, .. } | Segment::Cubic { from, .. } => *from,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Line { to, .. } | Segment::Cubic { to, .. } => *to,
        }
    }

    fn control_points(&self) -> Vec<Point> {
        match *self {
            Segment::Line { from, to } => vec![from, to],
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => vec![from, ctrl1, ctrl2, to],
        }
    }

    fn as_cubic(&self) -> Option<CubicBezierSegment<f64>> {
        match *self {
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => Some(CubicBezierSegment {
                from: lyon_point(from),
                ctrl1: lyon_point(ctrl1),
                ctrl2: lyon_point(ctrl2),
                to: lyon_point(to),
            }),
            Segment::Line { .. } => None,
        }
    }

    /// Point at local parameter `t`.
    pub fn sample(&self, t: f64) -> Point {
        match *self {
            Segment::Line { from, to } => {
                let p = LineSegment {
                    from: lyon_point(from),
                    to: lyon_point(to),
                }
                .sample(t);
                Point::new(p.x, p.y)
            }
            Segment::Cubic { .. } => {
                let p = self.as_cubic().map(|c| c.sample(t)).unwrap_or_default();
                Point::new(p.x, p.y)
            }
        }
    }

    /// First derivative with respect to `t`.
    pub fn derivative(&self, t: f64) -> Point {
        match *self {
            Segment::Line { from, to } => to - from,
            Segment::Cubic { .. } => {
                let v = self
                    .as_cubic()
                    .map(|c| c.derivative(t))
                    .unwrap_or_default();
                Point::new(v.x, v.y)
            }
        }
    }

    /// Straight-line distance between the end points.
    pub fn chord_length(&self) -> f64 {
        self.start().distance_to(&self.end())
    }

    /// Length of the control polygon, an upper bound on the arc length.
    pub fn control_length(&self) -> f64 {
        self.control_points()
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    pub fn is_zero_length(&self) -> bool {
        self.control_length() < ZERO_LENGTH
    }

    /// Unit tangent at `t`.
    ///
    /// Where the derivative vanishes (duplicated control points) the direction
    /// is taken from a nearby sample, then from the chord. Returns `None` only
    /// for zero-length segments.
    pub fn tangent_at(&self, t: f64) -> Option<Point> {
        if let Some(dir) = self.derivative(t).normalized() {
            return Some(dir);
        }
        const STEP: f64 = 1e-4;
        let (a, b) = if t + STEP <= 1.0 {
            (t, t + STEP)
        } else {
            (t - STEP, t)
        };
        (self.sample(b) - self.sample(a))
            .normalized()
            .or_else(|| (self.end() - self.start()).normalized())
    }

    /// Bounding box of the control points, which contains the curve.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.control_points())
            .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
    }

    fn is_finite(&self) -> bool {
        self.control_points().iter().all(Point::is_finite)
    }
}

/// An open or closed sequence of endpoint-continuous segments.
///
/// Deserialization goes through [`Path::new`], so a decoded path is checked
/// the same way as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    segments: Vec<Segment>,
    closed: bool,
}

/// Unchecked wire form of a [`Path`]
#[derive(Deserialize)]
struct RawPath {
    segments: Vec<Segment>,
    #[serde(default)]
    closed: bool,
}

impl TryFrom<RawPath> for Path {
    type Error = curvefill_core::Error;

    fn try_from(raw: RawPath) -> Result<Self> {
        Path::new(raw.segments, raw.closed)
    }
}

impl Path {
    /// Builds a path, checking that consecutive segments join up.
    ///
    /// A closed path whose last segment does not return to the first start
    /// point gets an implicit closing line.
    pub fn new(mut segments: Vec<Segment>, closed: bool) -> Result<Self> {
        if segments.is_empty() {
            return Err(GeometryError::degenerate("path has no segments").into());
        }
        if let Some(index) = segments.iter().position(|s| !s.is_finite()) {
            return Err(GeometryError::degenerate(format!(
                "segment {} has non-finite coordinates",
                index
            ))
            .into());
        }

        let extent = segments
            .iter()
            .map(Segment::bounds)
            .reduce(|a, b| a.union(&b))
            .map(|b| b.width().hypot(b.height()))
            .unwrap_or(0.0);
        let tolerance = (extent * CONTINUITY_TOLERANCE).max(ZERO_LENGTH);

        for (index, pair) in segments.windows(2).enumerate() {
            let gap = pair[0].end().distance_to(&pair[1].start());
            if gap > tolerance {
                return Err(GeometryError::Discontinuous {
                    segment: index + 1,
                    gap,
                }
                .into());
            }
        }

        if closed {
            let first = segments[0].start();
            let last = segments[segments.len() - 1].end();
            if first.distance_to(&last) > tolerance {
                segments.push(Segment::line(last, first));
            }
        }

        Ok(Self { segments, closed })
    }

    /// Straight segments through `points`.
    pub fn polyline(points: &[Point], closed: bool) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::degenerate("polyline needs at least two points").into());
        }
        let segments = points
            .windows(2)
            .map(|w| Segment::line(w[0], w[1]))
            .collect();
        Self::new(segments, closed)
    }

    /// Counter-clockwise circle starting at angle zero, as four cubic arcs.
    pub fn circle(center: Point, radius: f64) -> Result<Self> {
        let k = KAPPA * radius;
        let p = |x: f64, y: f64| Point::new(center.x + x, center.y + y);
        let segments = vec![
            Segment::cubic(p(radius, 0.0), p(radius, k), p(k, radius), p(0.0, radius)),
            Segment::cubic(p(0.0, radius), p(-k, radius), p(-radius, k), p(-radius, 0.0)),
            Segment::cubic(p(-radius, 0.0), p(-radius, -k), p(-k, -radius), p(0.0, -radius)),
            Segment::cubic(p(0.0, -radius), p(k, -radius), p(radius, -k), p(radius, 0.0)),
        ];
        Self::new(segments, true)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn start(&self) -> Point {
        self.segments[0].start()
    }

    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].end()
    }

    pub fn bounds(&self) -> Bounds {
        self.segments
            .iter()
            .map(Segment::bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Same path with every coordinate multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        let scale = |p: Point| p * factor;
        let segments = self
            .segments
            .iter()
            .map(|s| match *s {
                Segment::Line { from, to } => Segment::line(scale(from), scale(to)),
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => Segment::cubic(scale(from), scale(ctrl1), scale(ctrl2), scale(to)),
            })
            .collect();
        Self::new(segments, self.closed)
    }
}
