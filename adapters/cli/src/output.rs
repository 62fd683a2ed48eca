use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use dot_stimulus_core::{Segment, StimulusColor, Waypoint};

/// Textual representation used when printing results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width columns for reading in a terminal.
    Table,
    /// Pretty-printed JSON array.
    Json,
}

pub(crate) fn render_segments(segments: &[Segment], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(segments).context("failed to serialise segments")
        }
        OutputFormat::Table => {
            let mut table = format!(
                "{:>5}  {:<8}  {:>8}  {:>8}  {:>9}  {:>9}  {:>9}  {:>9}  {:>6}  {:<7}  {:<7}\n",
                "index", "role", "t0", "t1", "x0", "y0", "x1", "y1", "radius", "bg", "fg"
            );
            for (index, segment) in segments.iter().enumerate() {
                let start = segment.start_position();
                let end = segment.end_position();
                let _ = writeln!(
                    table,
                    "{index:>5}  {:<8}  {:>8.3}  {:>8.3}  {:>9.3}  {:>9.3}  {:>9.3}  {:>9.3}  {:>6.2}  {:<7}  {:<7}",
                    segment.role(),
                    segment.start_time(),
                    segment.end_time(),
                    start.x(),
                    start.y(),
                    end.x(),
                    end.y(),
                    segment.radius(),
                    hex(segment.background()),
                    hex(segment.foreground()),
                );
            }
            Ok(table)
        }
    }
}

pub(crate) fn render_samples(samples: &[Waypoint], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(samples).context("failed to serialise samples")
        }
        OutputFormat::Table => {
            let mut table = format!("{:>9}  {:>9}  {:>9}\n", "t", "x", "y");
            for sample in samples {
                let position = sample.position();
                let _ = writeln!(
                    table,
                    "{:>9.4}  {:>9.3}  {:>9.3}",
                    sample.time(),
                    position.x(),
                    position.y()
                );
            }
            Ok(table)
        }
    }
}

fn hex(color: StimulusColor) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        color.red(),
        color.green(),
        color.blue()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_stimulus_core::{DotAppearance, Position, SegmentRole};

    fn sample_segment() -> Segment {
        Segment::new(
            SegmentRole::Movement,
            Waypoint::new(1.0, Position::new(10.0, 10.0)),
            Waypoint::new(1.5, Position::new(15.0, 12.5)),
            DotAppearance::default(),
        )
    }

    #[test]
    fn table_lists_one_row_per_segment() {
        let table =
            render_segments(&[sample_segment(), sample_segment()], OutputFormat::Table)
                .expect("table renders");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("role"));
        assert!(lines[1].contains("movement"));
        assert!(lines[1].contains("15.000"));
        assert!(lines[1].contains("#ffffff"));
        assert!(lines[1].contains("#000000"));
    }

    #[test]
    fn json_exposes_player_fields() {
        let json = render_segments(&[sample_segment()], OutputFormat::Json).expect("json renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let segment = &value[0];
        assert_eq!(segment["role"], "movement");
        assert_eq!(segment["start"]["time"], 1.0);
        assert_eq!(segment["end"]["position"]["x"], 15.0);
        assert_eq!(segment["appearance"]["radius"], 2.0);
        assert_eq!(segment["appearance"]["background"]["red"], 255);
    }

    #[test]
    fn samples_render_as_rows() {
        let samples = [
            Waypoint::new(0.0, Position::new(1.0, 2.0)),
            Waypoint::new(0.5, Position::new(3.0, 4.0)),
        ];
        let table = render_samples(&samples, OutputFormat::Table).expect("table renders");
        assert_eq!(table.lines().count(), 3);
        let json = render_samples(&samples, OutputFormat::Json).expect("json renders");
        assert!(json.contains("\"time\": 0.5"));
    }
}
