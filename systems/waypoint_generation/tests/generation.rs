use dot_stimulus_core::{
    AxisBound, ConfigurationError, DotAppearance, GeneratorConfig, Position, RandomSource,
    ScriptedDraw, ScriptedRandomSource, SeededRandomSource, SegmentRole, SegmentTimeBase,
    SegmentWindow, StimulusColor,
};
use dot_stimulus_system_waypoint_generation::WaypointSequenceGenerator;

fn config_with(start: Position, bound: AxisBound, segment_count: i64) -> GeneratorConfig {
    GeneratorConfig {
        segment_count,
        start_position: start,
        movement_bound: bound,
        domain_limit: 40.0,
        ..GeneratorConfig::default()
    }
}

#[test]
fn zero_segments_yield_empty_sequence() {
    let config = config_with(Position::new(10.0, 10.0), AxisBound::new(10.0, 10.0), 0);
    let mut rng = ScriptedRandomSource::default();
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");
    assert!(segments.is_empty());
    assert_eq!(rng.consumed(), 0);
}

#[test]
fn negative_segment_count_fails_before_drawing() {
    let config = config_with(Position::new(10.0, 10.0), AxisBound::new(10.0, 10.0), -1);
    let mut rng = ScriptedRandomSource::new([ScriptedDraw::Uniform(0.5)]);
    let result = WaypointSequenceGenerator.generate(&config, &mut rng);
    assert_eq!(result, Err(ConfigurationError::NegativeSegmentCount(-1)));
    assert_eq!(rng.consumed(), 0);
    assert_eq!(rng.remaining(), 1);
}

#[test]
fn out_of_domain_start_is_rejected() {
    let config = config_with(Position::new(-1.0, 10.0), AxisBound::new(10.0, 10.0), 4);
    let mut rng = SeededRandomSource::new(1);
    assert!(matches!(
        WaypointSequenceGenerator.generate(&config, &mut rng),
        Err(ConfigurationError::StartOutOfDomain { .. })
    ));
}

#[test]
fn advance_branch_moves_outward() {
    // Bound 10 with a 0.5 draw gives a step of 5 on both axes.
    let config = config_with(Position::new(10.0, 10.0), AxisBound::new(10.0, 10.0), 1);
    let mut rng =
        ScriptedRandomSource::new([ScriptedDraw::Uniform(0.5), ScriptedDraw::Uniform(0.5)]);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_position(), Position::new(10.0, 10.0));
    assert_eq!(segments[0].end_position(), Position::new(15.0, 15.0));
}

#[test]
fn reflect_branch_moves_inward() {
    let config = config_with(Position::new(35.0, 35.0), AxisBound::new(20.0, 20.0), 1);
    let mut rng =
        ScriptedRandomSource::new([ScriptedDraw::Uniform(0.5), ScriptedDraw::Uniform(0.5)]);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");
    assert_eq!(segments[0].end_position(), Position::new(25.0, 25.0));
}

#[test]
fn recovery_branch_reseeds_within_small_range() {
    // Bound 40 with a 0.9 draw gives a step of 36: 5 + 36 > 40 and 5 - 36 < 0.
    let config = config_with(Position::new(5.0, 5.0), AxisBound::new(40.0, 40.0), 1);
    let mut rng = ScriptedRandomSource::new([
        ScriptedDraw::Uniform(0.9),
        ScriptedDraw::Uniform(0.9),
        ScriptedDraw::Integer(3),
        ScriptedDraw::Integer(9),
    ]);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");
    let end = segments[0].end_position();
    assert_eq!(end, Position::new(3.0, 9.0));
    assert!((0.0..10.0).contains(&end.x()));
    assert!((0.0..10.0).contains(&end.y()));
    assert_eq!(rng.remaining(), 0);
}

#[test]
fn recovery_branch_with_seeded_source_stays_in_range() {
    let config = config_with(Position::new(5.0, 5.0), AxisBound::new(40.0, 40.0), 1);
    for seed in 0..200 {
        let mut rng = AlwaysHigh(SeededRandomSource::new(seed));
        let segments = WaypointSequenceGenerator
            .generate(&config, &mut rng)
            .expect("valid config");
        let end = segments[0].end_position();
        assert!((0.0..10.0).contains(&end.x()), "seed {seed}: {end:?}");
        assert!((0.0..10.0).contains(&end.y()), "seed {seed}: {end:?}");
        assert_eq!(end.x().fract(), 0.0);
    }
}

/// Forces every uniform draw to 0.9 while delegating integer draws.
struct AlwaysHigh(SeededRandomSource);

impl RandomSource for AlwaysHigh {
    fn uniform(&mut self, _low: f64, _high: f64) -> f64 {
        0.9
    }

    fn integer(&mut self, low: i64, high: i64) -> i64 {
        self.0.integer(low, high)
    }
}

#[test]
fn rest_segments_hold_position_without_drawing() {
    let config = config_with(Position::new(10.0, 10.0), AxisBound::new(10.0, 10.0), 3);
    let mut rng = ScriptedRandomSource::new([
        ScriptedDraw::Uniform(0.5),
        ScriptedDraw::Uniform(0.2),
        ScriptedDraw::Uniform(0.1),
        ScriptedDraw::Uniform(0.3),
    ]);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");

    assert_eq!(rng.consumed(), 4);
    let rest = segments[1];
    assert_eq!(rest.role(), SegmentRole::Rest);
    assert_eq!(rest.start_position(), Position::new(15.0, 12.0));
    assert_eq!(rest.end_position(), Position::new(15.0, 12.0));
    assert_eq!(segments[2].start_position(), Position::new(15.0, 12.0));
    assert_eq!(segments[2].end_position(), Position::new(16.0, 15.0));
}

#[test]
fn fixed_time_base_reuses_literal_windows() {
    let config = GeneratorConfig {
        segment_count: 6,
        movement_window: SegmentWindow::new(1.0, 1.5),
        rest_window: SegmentWindow::new(0.0, 0.5),
        ..GeneratorConfig::default()
    };
    let mut rng = SeededRandomSource::new(11);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");

    for (index, segment) in segments.iter().enumerate() {
        let expected = if index % 2 == 0 { (1.0, 1.5) } else { (0.0, 0.5) };
        assert_eq!((segment.start_time(), segment.end_time()), expected);
    }
}

#[test]
fn cumulative_time_base_advances_monotonically() {
    let config = GeneratorConfig {
        segment_count: 6,
        time_base: SegmentTimeBase::Cumulative,
        ..GeneratorConfig::default()
    };
    let mut rng = SeededRandomSource::new(11);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");

    let times: Vec<(f64, f64)> = segments
        .iter()
        .map(|segment| (segment.start_time(), segment.end_time()))
        .collect();
    assert_eq!(
        times,
        vec![
            (1.0, 1.5),
            (1.5, 2.0),
            (3.0, 3.5),
            (3.5, 4.0),
            (5.0, 5.5),
            (5.5, 6.0),
        ]
    );
}

#[test]
fn appearance_is_copied_unchanged() {
    let appearance = DotAppearance {
        radius: 7.5,
        background: StimulusColor::from_rgb(1, 2, 3),
        foreground: StimulusColor::from_rgb(250, 0, 0),
    };
    let config = GeneratorConfig {
        segment_count: 5,
        appearance,
        ..GeneratorConfig::default()
    };
    let mut rng = SeededRandomSource::new(3);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .expect("valid config");
    for segment in &segments {
        assert_eq!(segment.radius(), 7.5);
        assert_eq!(segment.background(), StimulusColor::from_rgb(1, 2, 3));
        assert_eq!(segment.foreground(), StimulusColor::from_rgb(250, 0, 0));
    }
}

#[test]
fn invariants_hold_across_seeds_and_configs() {
    let mut config_rng = SeededRandomSource::new(0x5eed);
    for seed in 0..300u64 {
        let limit = config_rng.uniform(0.0, 60.0);
        let segment_count = config_rng.integer(0, 40);
        let config = GeneratorConfig {
            segment_count,
            start_position: Position::new(
                config_rng.uniform(0.0, limit),
                config_rng.uniform(0.0, limit),
            ),
            movement_bound: AxisBound::new(
                config_rng.uniform(0.0, 80.0),
                config_rng.uniform(0.0, 80.0),
            ),
            domain_limit: limit,
            ..GeneratorConfig::default()
        };
        let mut rng = SeededRandomSource::new(seed);
        let segments = WaypointSequenceGenerator
            .generate(&config, &mut rng)
            .expect("valid config");

        assert_eq!(segments.len() as i64, segment_count, "length for seed {seed}");

        for (index, segment) in segments.iter().enumerate() {
            assert_eq!(segment.role(), SegmentRole::for_index(index));
            for position in [segment.start_position(), segment.end_position()] {
                assert!(
                    position.within(limit),
                    "seed {seed} index {index}: {position:?} outside [0, {limit}]"
                );
            }
            if segment.role() == SegmentRole::Rest {
                assert_eq!(segment.start_position(), segment.end_position());
            }
        }

        for index in (0..segments.len()).step_by(2) {
            if index + 2 < segments.len() {
                assert_eq!(
                    segments[index].end_position(),
                    segments[index + 2].start_position(),
                    "chain broken at {index} for seed {seed}"
                );
            }
        }
    }
}
