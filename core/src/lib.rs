#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dot stimulus workspace.
//!
//! This crate defines the data that flows between the waypoint generator, the
//! playback timeline and the adapters. A [`GeneratorConfig`] describes the
//! random walk, a [`RandomSource`] supplies its entropy, and the generator
//! answers with an ordered list of [`Segment`] values that a stimulus player
//! interpolates against its own clock.

use std::{collections::VecDeque, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound (exclusive) of the range a coordinate is re-seeded into when
/// the drawn step cannot be taken in either direction.
pub const RECOVERY_RANGE: i64 = 10;

/// Continuous location of the dot within the square coordinate domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Linearly interpolates towards `other`; `fraction` of zero yields `self`.
    #[must_use]
    pub fn lerp(self, other: Position, fraction: f64) -> Position {
        Position::new(
            self.x + (other.x - self.x) * fraction,
            self.y + (other.y - self.y) * fraction,
        )
    }

    /// Reports whether both coordinates lie within `[0, limit]`.
    #[must_use]
    pub fn within(&self, limit: f64) -> bool {
        (0.0..=limit).contains(&self.x) && (0.0..=limit).contains(&self.y)
    }
}

/// Per-axis maximum step magnitude of a movement segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisBound {
    x: f64,
    y: f64,
}

impl AxisBound {
    /// Creates a bound from its horizontal and vertical magnitudes.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest horizontal step.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Largest vertical step.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    fn is_valid(&self) -> bool {
        let valid = |value: f64| value.is_finite() && value >= 0.0;
        valid(self.x) && valid(self.y)
    }
}

/// Anchor point on the trajectory timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    time: f64,
    position: Position,
}

impl Waypoint {
    /// Creates a waypoint at `time` seconds.
    #[must_use]
    pub const fn new(time: f64, position: Position) -> Self {
        Self { time, position }
    }

    /// Time of the waypoint in seconds.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Location of the dot at this waypoint.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Role a segment plays in the alternating walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    /// The dot jumps towards a freshly sampled position.
    Movement,
    /// The dot holds its position.
    Rest,
}

impl SegmentRole {
    /// Role assigned to the segment generated at `index`.
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Movement
        } else {
            Self::Rest
        }
    }
}

impl fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movement => f.pad("movement"),
            Self::Rest => f.pad("rest"),
        }
    }
}

/// RGB color applied when the dot is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl StimulusColor {
    /// Opaque white, the default background.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    /// Opaque black, the default dot color.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Visual attributes copied verbatim into every generated segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotAppearance {
    /// Radius of the dot in domain units.
    pub radius: f64,
    /// Color filling the area around the dot.
    pub background: StimulusColor,
    /// Color of the dot itself.
    pub foreground: StimulusColor,
}

impl Default for DotAppearance {
    fn default() -> Self {
        Self {
            radius: 2.0,
            background: StimulusColor::WHITE,
            foreground: StimulusColor::BLACK,
        }
    }
}

/// Linear interpolation instruction between two waypoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    role: SegmentRole,
    start: Waypoint,
    end: Waypoint,
    appearance: DotAppearance,
}

impl Segment {
    /// Creates a segment spanning `start` to `end`.
    #[must_use]
    pub const fn new(
        role: SegmentRole,
        start: Waypoint,
        end: Waypoint,
        appearance: DotAppearance,
    ) -> Self {
        Self {
            role,
            start,
            end,
            appearance,
        }
    }

    /// Whether the segment moves or holds the dot.
    #[must_use]
    pub const fn role(&self) -> SegmentRole {
        self.role
    }

    /// Waypoint the segment starts from.
    #[must_use]
    pub const fn start(&self) -> Waypoint {
        self.start
    }

    /// Waypoint the segment ends on.
    #[must_use]
    pub const fn end(&self) -> Waypoint {
        self.end
    }

    /// Time of the start waypoint.
    #[must_use]
    pub const fn start_time(&self) -> f64 {
        self.start.time
    }

    /// Time of the end waypoint.
    #[must_use]
    pub const fn end_time(&self) -> f64 {
        self.end.time
    }

    /// Position of the start waypoint.
    #[must_use]
    pub const fn start_position(&self) -> Position {
        self.start.position
    }

    /// Position of the end waypoint.
    #[must_use]
    pub const fn end_position(&self) -> Position {
        self.end.position
    }

    /// Length of the interpolation interval.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end.time - self.start.time
    }

    /// Radius of the dot.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.appearance.radius
    }

    /// Background color.
    #[must_use]
    pub const fn background(&self) -> StimulusColor {
        self.appearance.background
    }

    /// Dot color.
    #[must_use]
    pub const fn foreground(&self) -> StimulusColor {
        self.appearance.foreground
    }

    /// Visual attributes carried by the segment.
    #[must_use]
    pub const fn appearance(&self) -> DotAppearance {
        self.appearance
    }

    /// Interpolated position at `time`, clamped to the end waypoints outside
    /// the segment's interval.
    #[must_use]
    pub fn position_at(&self, time: f64) -> Position {
        if time >= self.end.time || time.is_nan() {
            return self.end.position;
        }
        if time <= self.start.time {
            return self.start.position;
        }
        let fraction = (time - self.start.time) / self.duration();
        self.start.position.lerp(self.end.position, fraction)
    }
}

/// Time window `[start, end]` assigned to one kind of segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentWindow {
    start: f64,
    end: f64,
}

impl SegmentWindow {
    /// Creates a window from its bounds.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Lower bound of the window.
    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// Upper bound of the window.
    #[must_use]
    pub const fn end(&self) -> f64 {
        self.end
    }

    /// Returns the window moved later by `offset` seconds.
    #[must_use]
    pub fn shifted(self, offset: f64) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }
}

/// Clock policy used to place segment windows on the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentTimeBase {
    /// Every segment reuses its literal window; times are local to the segment.
    #[default]
    Fixed,
    /// Windows are offset by a running clock that starts where the previous
    /// segment ended.
    Cumulative,
}

impl fmt::Display for SegmentTimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.pad("fixed"),
            Self::Cumulative => f.pad("cumulative"),
        }
    }
}

/// Parameters of the bounded random walk.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Number of segments to emit. Signed so out-of-range parameter values
    /// surface as a [`ConfigurationError`].
    pub segment_count: i64,
    /// Position the walk starts from.
    pub start_position: Position,
    /// Per-axis maximum step magnitude.
    pub movement_bound: AxisBound,
    /// Maximum coordinate value on either axis.
    pub domain_limit: f64,
    /// Window spanned by movement segments.
    pub movement_window: SegmentWindow,
    /// Window spanned by rest segments.
    pub rest_window: SegmentWindow,
    /// Radius and colors copied into each segment.
    pub appearance: DotAppearance,
    /// How windows are placed on the timeline.
    pub time_base: SegmentTimeBase,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            segment_count: 10,
            start_position: Position::new(10.0, 10.0),
            movement_bound: AxisBound::new(10.0, 10.0),
            domain_limit: 40.0,
            movement_window: SegmentWindow::new(1.0, 1.5),
            rest_window: SegmentWindow::new(0.0, 0.5),
            appearance: DotAppearance::default(),
            time_base: SegmentTimeBase::Fixed,
        }
    }
}

impl GeneratorConfig {
    /// Checks every precondition of the generator.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.segment_count < 0 {
            return Err(ConfigurationError::NegativeSegmentCount(self.segment_count));
        }
        if usize::try_from(self.segment_count).is_err() {
            return Err(ConfigurationError::SegmentCountTooLarge(self.segment_count));
        }

        let limit = self.domain_limit;
        if !limit.is_finite() || limit < 0.0 {
            return Err(ConfigurationError::InvalidDomainLimit(limit));
        }

        if !self.start_position.within(limit) {
            return Err(ConfigurationError::StartOutOfDomain {
                x: self.start_position.x(),
                y: self.start_position.y(),
                limit,
            });
        }

        let bound = self.movement_bound;
        if !bound.is_valid() {
            return Err(ConfigurationError::NegativeMovementBound {
                x: bound.x(),
                y: bound.y(),
            });
        }

        for (role, window) in [
            (SegmentRole::Movement, self.movement_window),
            (SegmentRole::Rest, self.rest_window),
        ] {
            if !window.is_valid() {
                return Err(ConfigurationError::InvalidWindow {
                    role,
                    start: window.start(),
                    end: window.end(),
                });
            }
        }

        let radius = self.appearance.radius;
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigurationError::InvalidRadius(radius));
        }

        Ok(())
    }
}

/// Reasons a [`GeneratorConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The requested number of segments was negative.
    #[error("segment count must be non-negative, got {0}")]
    NegativeSegmentCount(i64),
    /// The requested number of segments does not fit in memory on this target.
    #[error("segment count {0} exceeds the addressable range")]
    SegmentCountTooLarge(i64),
    /// The domain limit was negative or not finite.
    #[error("domain limit must be finite and non-negative, got {0}")]
    InvalidDomainLimit(f64),
    /// The start position falls outside `[0, limit]` on some axis.
    #[error("start position ({x}, {y}) lies outside the domain [0, {limit}]")]
    StartOutOfDomain {
        /// Requested horizontal start coordinate.
        x: f64,
        /// Requested vertical start coordinate.
        y: f64,
        /// Domain limit in effect.
        limit: f64,
    },
    /// A movement bound was negative or not finite.
    #[error("movement bound ({x}, {y}) must be finite and non-negative")]
    NegativeMovementBound {
        /// Horizontal bound.
        x: f64,
        /// Vertical bound.
        y: f64,
    },
    /// A segment window was reversed, negative or not finite.
    #[error("{role} window [{start}, {end}] must be finite, non-negative and ordered")]
    InvalidWindow {
        /// Segment kind the window belongs to.
        role: SegmentRole,
        /// Lower bound supplied.
        start: f64,
        /// Upper bound supplied.
        end: f64,
    },
    /// The dot radius was negative or not finite.
    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),
}

/// Injectable source of randomness consumed by the generator.
///
/// Implementations are assumed total: every call returns a value within the
/// requested range.
pub trait RandomSource {
    /// Draws a value uniformly from `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Draws an integer uniformly from `[low, high)`.
    fn integer(&mut self, low: i64, high: i64) -> i64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }

    fn integer(&mut self, low: i64, high: i64) -> i64 {
        (**self).integer(low, high)
    }
}

/// Reproducible random source backed by a seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct SeededRandomSource {
    rng: ChaCha8Rng,
}

impl SeededRandomSource {
    /// Creates a source whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high || low.is_nan() || high.is_nan() {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn integer(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

/// Single value replayed by a [`ScriptedRandomSource`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScriptedDraw {
    /// Answer to the next [`RandomSource::uniform`] call.
    Uniform(f64),
    /// Answer to the next [`RandomSource::integer`] call.
    Integer(i64),
}

/// Random source that replays a fixed script of draws, used to force
/// specific branches of the walk.
///
/// Values are returned as scripted, without rescaling to the requested range.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandomSource {
    draws: VecDeque<ScriptedDraw>,
    consumed: usize,
}

impl ScriptedRandomSource {
    /// Creates a source that replays `draws` in order.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = ScriptedDraw>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of draws handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of draws still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    fn next_draw(&mut self) -> ScriptedDraw {
        let Some(draw) = self.draws.pop_front() else {
            panic!(
                "scripted random source exhausted after {} draws",
                self.consumed
            );
        };
        self.consumed += 1;
        draw
    }
}

impl RandomSource for ScriptedRandomSource {
    /// # Panics
    ///
    /// Panics when the script is exhausted or the next draw is not uniform.
    fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
        match self.next_draw() {
            ScriptedDraw::Uniform(value) => value,
            other => panic!("expected a uniform draw, script supplied {other:?}"),
        }
    }

    /// # Panics
    ///
    /// Panics when the script is exhausted or the next draw is not an integer.
    fn integer(&mut self, _low: i64, _high: i64) -> i64 {
        match self.next_draw() {
            ScriptedDraw::Integer(value) => value,
            other => panic!("expected an integer draw, script supplied {other:?}"),
        }
    }
}
