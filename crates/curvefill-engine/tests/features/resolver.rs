use curvefill_core::{FillControl, Point};
use curvefill_engine::config::{AngleMode, FillConfig, PatternMode, ScaleMode};
use curvefill_engine::path::Path;
use curvefill_engine::planner::stations_at;
use curvefill_engine::random::FillRng;
use curvefill_engine::resolver::{PlacementTransform, Resolver};
use curvefill_engine::sampler::{CurveSampler, SamplerOptions};
use curvefill_engine::stamp::StampVariant;

fn circle_sampler() -> CurveSampler {
    CurveSampler::build(
        Path::circle(Point::ZERO, 20.0).unwrap(),
        &SamplerOptions::default(),
    )
    .unwrap()
}

fn resolve(
    sampler: &CurveSampler,
    config: &FillConfig,
    stamps: &[StampVariant],
    arc: &[f64],
    seed: u64,
) -> Vec<PlacementTransform> {
    let stations = stations_at(sampler, arc, 0).unwrap();
    let resolver = Resolver::new(sampler, config, stamps).unwrap();
    let mut rng = FillRng::seeded(seed);
    resolver
        .resolve_all(&stations, stations.len(), &mut rng, &FillControl::new())
        .unwrap()
        .into_inner()
}

fn three_stamps() -> Vec<StampVariant> {
    vec![
        StampVariant::centered(10, 2.0, 2.0),
        StampVariant::centered(11, 3.0, 1.0),
        StampVariant::centered(12, 1.0, 3.0),
    ]
}

#[test]
fn test_follow_curve_centres_stamp_on_curve() {
    let sampler = circle_sampler();
    let config = FillConfig::default();
    let stamps = vec![StampVariant::centered(1, 2.0, 2.0)];
    let arc: Vec<f64> = (0..8).map(|i| i as f64 * 10.0).collect();
    let out = resolve(&sampler, &config, &stamps, &arc, 0);
    for (t, s) in out.iter().zip(&arc) {
        let (point, angle) = sampler.position_at(*s).unwrap();
        assert!(t.apply(Point::ZERO).distance_to(&point) < 1e-9);
        assert!((t.rotation - angle).abs() < 1e-12);
        assert!(!t.corner_adjusted);
    }
}

#[test]
fn test_alternating_pattern_cycles() {
    let sampler = circle_sampler();
    let config = FillConfig::default().with_pattern(PatternMode::Alternating);
    let arc: Vec<f64> = (0..5).map(|i| i as f64 * 20.0).collect();
    let out = resolve(&sampler, &config, &three_stamps(), &arc, 0);
    let picked: Vec<usize> = out.iter().map(|t| t.stamp_index).collect();
    assert_eq!(picked, vec![0, 1, 2, 0, 1]);
}

#[test]
fn test_random_choices_follow_seed() {
    let sampler = circle_sampler();
    let config = FillConfig::default()
        .with_pattern(PatternMode::Random)
        .with_angle(AngleMode::Random {
            min: -30.0,
            max: 30.0,
        })
        .with_scale(ScaleMode::Random { min: 0.5, max: 2.0 });
    let arc: Vec<f64> = (0..12).map(|i| i as f64 * 10.0).collect();

    let a = resolve(&sampler, &config, &three_stamps(), &arc, 77);
    let b = resolve(&sampler, &config, &three_stamps(), &arc, 77);
    assert_eq!(a, b);

    for t in &a {
        assert!(t.stamp_index < 3);
        assert!(t.rotation >= (-30f64).to_radians() && t.rotation <= 30f64.to_radians());
        assert!((0.5..=2.0).contains(&t.scale.x));
        assert_eq!(t.scale.x, t.scale.y);
    }
    let distinct: std::collections::HashSet<usize> = a.iter().map(|t| t.stamp_index).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn test_sequence_without_custom_order() {
    let sampler = circle_sampler();
    let config = FillConfig::default().with_pattern(PatternMode::Sequence);
    let arc = [0.0, 10.0, 20.0, 30.0];
    let out = resolve(&sampler, &config, &three_stamps(), &arc, 0);
    let picked: Vec<usize> = out.iter().map(|t| t.stamp_index).collect();
    assert_eq!(picked, vec![0, 1, 2, 0]);
}

#[test]
fn test_empty_stamp_list_is_rejected() {
    let sampler = circle_sampler();
    let config = FillConfig::default();
    let err = Resolver::new(&sampler, &config, &[]).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_transform_serializes() {
    let sampler = circle_sampler();
    let out = resolve(
        &sampler,
        &FillConfig::default(),
        &[StampVariant::centered(1, 1.0, 1.0)],
        &[0.0],
        0,
    );
    let json = serde_json::to_value(out[0]).unwrap();
    assert_eq!(json["station_index"], 0);
    assert_eq!(json["mirrored"], false);
    assert!(json["position"]["x"].as_f64().is_some());
}
