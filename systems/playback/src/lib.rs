#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Playback timeline mirroring how a stimulus player walks a segment list.
//!
//! With [`SegmentTimeBase::Fixed`] each segment's waypoint times are local to
//! the segment: the player runs segments back to back, each lasting until its
//! end waypoint, and holds the start position until the start waypoint is
//! reached. With [`SegmentTimeBase::Cumulative`] waypoint times are already
//! absolute and the timeline only has to bridge the gaps between segments.

use dot_stimulus_core::{Position, Segment, SegmentTimeBase, Waypoint};
use thiserror::Error;

/// Largest number of waypoints a single [`Timeline::sample`] call produces.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Reasons a timeline cannot be sampled at the requested rate.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SampleError {
    /// The rate was zero, negative or not finite.
    #[error("sample rate must be finite and positive, got {0} Hz")]
    InvalidRate(f64),
    /// The rate would produce more than [`MAX_SAMPLES`] waypoints.
    #[error("sampling {duration} s at {rate_hz} Hz exceeds the limit of {limit} samples")]
    TooManySamples {
        /// Requested rate.
        rate_hz: f64,
        /// Playback duration of the timeline.
        duration: f64,
        /// Sample limit in effect.
        limit: usize,
    },
}

/// Segment list laid out on a single playback clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    entries: Vec<ScheduledSegment>,
    duration: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScheduledSegment {
    /// Playback time the segment becomes active.
    begin: f64,
    /// Added to the segment's own waypoint times to obtain playback time.
    offset: f64,
    segment: Segment,
}

impl Timeline {
    /// Lays `segments` out in generation order.
    #[must_use]
    pub fn new(segments: Vec<Segment>, time_base: SegmentTimeBase) -> Self {
        let mut entries = Vec::with_capacity(segments.len());
        let mut cursor = 0.0_f64;
        for segment in segments {
            let offset = match time_base {
                SegmentTimeBase::Fixed => cursor,
                SegmentTimeBase::Cumulative => 0.0,
            };
            entries.push(ScheduledSegment {
                begin: cursor,
                offset,
                segment,
            });
            cursor = cursor.max(offset + segment.end_time());
        }

        Self {
            entries,
            duration: cursor,
        }
    }

    /// Number of scheduled segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the timeline holds no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Playback time at which the last segment finishes.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Playback time at which the segment at `index` becomes active.
    #[must_use]
    pub fn segment_begin(&self, index: usize) -> Option<f64> {
        self.entries.get(index).map(|entry| entry.begin)
    }

    /// Iterates over the scheduled segments in playback order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.entries.iter().map(|entry| &entry.segment)
    }

    /// Position of the dot at playback time `time`.
    ///
    /// Returns `None` for an empty timeline or a negative or non-finite time.
    /// Past the end the final position is held.
    #[must_use]
    pub fn position_at(&self, time: f64) -> Option<Position> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let active = self.entries.partition_point(|entry| entry.begin <= time);
        let entry = self.entries.get(active.checked_sub(1)?)?;
        Some(entry.segment.position_at(time - entry.offset))
    }

    /// Number of waypoints [`Timeline::sample`] yields at `rate_hz`.
    pub fn sample_count(&self, rate_hz: f64) -> Result<usize, SampleError> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(SampleError::InvalidRate(rate_hz));
        }
        if self.is_empty() {
            return Ok(0);
        }

        let ticks = (self.duration * rate_hz).floor();
        if ticks.is_nan() || ticks >= MAX_SAMPLES as f64 {
            return Err(SampleError::TooManySamples {
                rate_hz,
                duration: self.duration,
                limit: MAX_SAMPLES,
            });
        }
        Ok(ticks as usize + 1)
    }

    /// Samples the timeline every `1 / rate_hz` seconds from zero through
    /// [`Timeline::duration`].
    ///
    /// Fails without allocating when the rate is invalid or would exceed
    /// [`MAX_SAMPLES`].
    pub fn sample(&self, rate_hz: f64) -> Result<Vec<Waypoint>, SampleError> {
        let count = self.sample_count(rate_hz)?;
        let samples = (0..count)
            .filter_map(|tick| {
                let time = tick as f64 / rate_hz;
                self.position_at(time)
                    .map(|position| Waypoint::new(time, position))
            })
            .collect();
        Ok(samples)
    }
}
