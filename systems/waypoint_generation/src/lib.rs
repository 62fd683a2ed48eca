#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic bounded random walk that produces dot stimulus segments.
//!
//! Even-indexed segments move the dot towards a freshly sampled offset, odd
//! ones hold it in place. The walk is expressed as a fold that threads the
//! walk state through one step per segment, so the only randomness
//! consumed is what the injected [`RandomSource`] hands out.

use dot_stimulus_core::{
    ConfigurationError, GeneratorConfig, Position, RandomSource, Segment, SegmentRole,
    SegmentTimeBase, SegmentWindow, Waypoint, RECOVERY_RANGE,
};

/// Pure system that turns a [`GeneratorConfig`] into an ordered segment list.
#[derive(Clone, Copy, Debug, Default)]
pub struct WaypointSequenceGenerator;

impl WaypointSequenceGenerator {
    /// Generates exactly `config.segment_count` segments.
    ///
    /// The configuration is validated before the first draw, so a rejected
    /// configuration never consumes entropy from `rng`.
    pub fn generate<R>(
        &self,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Result<Vec<Segment>, ConfigurationError>
    where
        R: RandomSource + ?Sized,
    {
        config.validate()?;
        let count = usize::try_from(config.segment_count)
            .map_err(|_| ConfigurationError::SegmentCountTooLarge(config.segment_count))?;

        let initial = (
            GeneratorState::new(config.start_position),
            Vec::with_capacity(count),
        );
        let (_, segments) = (0..count).fold(initial, |(state, mut segments), index| {
            let (next, segment) = step(state, index, rng, config);
            segments.push(segment);
            (next, segments)
        });

        Ok(segments)
    }
}

/// Walk state carried from one segment to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
struct GeneratorState {
    /// Only movement steps write this, so between movements it is the end of
    /// the most recent one and rest segments hold both axes at it.
    position: Position,
    /// End time of the previous segment, used by the cumulative time base.
    clock: f64,
}

impl GeneratorState {
    fn new(start: Position) -> Self {
        Self {
            position: start,
            clock: 0.0,
        }
    }
}

fn step<R>(
    state: GeneratorState,
    index: usize,
    rng: &mut R,
    config: &GeneratorConfig,
) -> (GeneratorState, Segment)
where
    R: RandomSource + ?Sized,
{
    match SegmentRole::for_index(index) {
        SegmentRole::Movement => {
            let dx = rng.uniform(0.0, 1.0) * config.movement_bound.x();
            let dy = rng.uniform(0.0, 1.0) * config.movement_bound.y();
            let limit = config.domain_limit;
            let target = Position::new(
                resolve_axis(state.position.x(), dx, limit, rng),
                resolve_axis(state.position.y(), dy, limit, rng),
            );

            let window = place_window(config.movement_window, state.clock, config.time_base);
            let segment = Segment::new(
                SegmentRole::Movement,
                Waypoint::new(window.start(), state.position),
                Waypoint::new(window.end(), target),
                config.appearance,
            );
            let next = GeneratorState {
                position: target,
                clock: window.end(),
            };
            (next, segment)
        }
        SegmentRole::Rest => {
            let held = state.position;
            let window = place_window(config.rest_window, state.clock, config.time_base);
            let segment = Segment::new(
                SegmentRole::Rest,
                Waypoint::new(window.start(), held),
                Waypoint::new(window.end(), held),
                config.appearance,
            );
            let next = GeneratorState {
                clock: window.end(),
                ..state
            };
            (next, segment)
        }
    }
}

fn place_window(window: SegmentWindow, clock: f64, time_base: SegmentTimeBase) -> SegmentWindow {
    match time_base {
        SegmentTimeBase::Fixed => window,
        SegmentTimeBase::Cumulative => window.shifted(clock),
    }
}

/// Applies the boundary policy to one axis.
fn resolve_axis<R>(current: f64, step: f64, limit: f64, rng: &mut R) -> f64
where
    R: RandomSource + ?Sized,
{
    let overshoots = current + step > limit;
    if overshoots && current - step < 0.0 {
        let reseeded = rng.integer(0, recovery_range(limit)) as f64;
        tracing::debug!(
            current,
            step,
            limit,
            reseeded,
            "step leaves the domain in both directions, re-seeding coordinate"
        );
        reseeded
    } else if overshoots {
        current - step
    } else {
        current + step
    }
}

/// Exclusive upper bound for re-seeded coordinates, narrowed so that domains
/// smaller than [`RECOVERY_RANGE`] still contain every possible draw.
fn recovery_range(limit: f64) -> i64 {
    if limit < RECOVERY_RANGE as f64 {
        limit.floor() as i64 + 1
    } else {
        RECOVERY_RANGE
    }
}
