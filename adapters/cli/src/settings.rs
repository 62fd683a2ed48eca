use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use dot_stimulus_core::{
    AxisBound, DotAppearance, GeneratorConfig, Position, SegmentTimeBase, SegmentWindow,
    StimulusColor,
};
use serde::Deserialize;

const MAX_SEGMENT_COUNT: i64 = 1_000;
const MAX_START_COORDINATE: f64 = 100.0;
const MAX_MOVEMENT_BOUND: f64 = 40.0;
const MAX_RADIUS: f64 = 100.0;
const MAX_WINDOW_TIME: f64 = 100.0;

/// Experiment parameters as declared in a protocol file.
///
/// Every field is optional in the file; omitted ones fall back to the
/// protocol defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ProtocolSettings {
    pub(crate) segment_count: i64,
    pub(crate) start_x: f64,
    pub(crate) start_y: f64,
    pub(crate) movement_bound_x: f64,
    pub(crate) movement_bound_y: f64,
    pub(crate) radius: f64,
    pub(crate) movement_window_start: f64,
    pub(crate) movement_window_end: f64,
    pub(crate) rest_window_start: f64,
    pub(crate) rest_window_end: f64,
    pub(crate) domain_limit: f64,
    pub(crate) time_base: SegmentTimeBase,
    pub(crate) background_color: [u8; 3],
    pub(crate) foreground_color: [u8; 3],
    pub(crate) seed: Option<u64>,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            segment_count: 10,
            start_x: 10.0,
            start_y: 10.0,
            movement_bound_x: 10.0,
            movement_bound_y: 10.0,
            radius: 2.0,
            movement_window_start: 1.0,
            movement_window_end: 1.5,
            rest_window_start: 0.0,
            rest_window_end: 0.5,
            domain_limit: 40.0,
            time_base: SegmentTimeBase::Fixed,
            background_color: [255, 255, 255],
            foreground_color: [0, 0, 0],
            seed: None,
        }
    }
}

impl ProtocolSettings {
    /// Reads and checks a TOML protocol file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read protocol file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid protocol file {}", path.display()))
    }

    /// Parses protocol settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse protocol toml contents")?;
        settings.check_declared_ranges()?;
        Ok(settings)
    }

    /// Rejects values above the limits the parameters are declared with.
    /// Lower bounds and domain membership are left to the generator.
    fn check_declared_ranges(&self) -> Result<()> {
        if self.segment_count > MAX_SEGMENT_COUNT {
            bail!(
                "segment_count {} exceeds the declared maximum of {MAX_SEGMENT_COUNT}",
                self.segment_count
            );
        }

        let limits = [
            ("start_x", self.start_x, MAX_START_COORDINATE),
            ("start_y", self.start_y, MAX_START_COORDINATE),
            ("movement_bound_x", self.movement_bound_x, MAX_MOVEMENT_BOUND),
            ("movement_bound_y", self.movement_bound_y, MAX_MOVEMENT_BOUND),
            ("radius", self.radius, MAX_RADIUS),
            ("movement_window_start", self.movement_window_start, MAX_WINDOW_TIME),
            ("movement_window_end", self.movement_window_end, MAX_WINDOW_TIME),
            ("rest_window_start", self.rest_window_start, MAX_WINDOW_TIME),
            ("rest_window_end", self.rest_window_end, MAX_WINDOW_TIME),
        ];
        for (name, value, max) in limits {
            if value > max {
                bail!("{name} {value} exceeds the declared maximum of {max}");
            }
        }

        Ok(())
    }

    /// Builds the generator configuration described by these settings.
    pub(crate) fn generator_config(&self) -> GeneratorConfig {
        let [red, green, blue] = self.background_color;
        let background = StimulusColor::from_rgb(red, green, blue);
        let [red, green, blue] = self.foreground_color;
        let foreground = StimulusColor::from_rgb(red, green, blue);

        GeneratorConfig {
            segment_count: self.segment_count,
            start_position: Position::new(self.start_x, self.start_y),
            movement_bound: AxisBound::new(self.movement_bound_x, self.movement_bound_y),
            domain_limit: self.domain_limit,
            movement_window: SegmentWindow::new(
                self.movement_window_start,
                self.movement_window_end,
            ),
            rest_window: SegmentWindow::new(self.rest_window_start, self.rest_window_end),
            appearance: DotAppearance {
                radius: self.radius,
                background,
                foreground,
            },
            time_base: self.time_base,
        }
    }
}
