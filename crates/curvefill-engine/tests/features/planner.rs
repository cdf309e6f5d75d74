use curvefill_core::{FillControl, Point};
use curvefill_engine::config::{CountPolicy, FillConfig, SpacingMode};
use curvefill_engine::path::Path;
use curvefill_engine::planner::{plan, stations_at, Planner};
use curvefill_engine::random::FillRng;
use curvefill_engine::sampler::{CurveSampler, SamplerOptions};
use curvefill_engine::stamp::StampVariant;

fn stamps() -> Vec<StampVariant> {
    vec![StampVariant::centered(1, 5.0, 5.0)]
}

fn plan_with(total: f64, closed: bool, config: &FillConfig) -> Vec<f64> {
    let mut rng = FillRng::from_seed(config.random_seed);
    plan(total, closed, config, &stamps(), &mut rng, &FillControl::new())
        .unwrap()
        .into_inner()
}

#[test]
fn test_fixed_spacing_on_open_path() {
    let stations = plan_with(95.0, false, &FillConfig::default());
    assert_eq!(stations.len(), 10);
    assert_eq!(stations[9], 90.0);
}

#[test]
fn test_long_fill_does_not_drift() {
    let config = FillConfig::default().with_spacing(SpacingMode::Fixed { distance: 0.1 });
    let stations = plan_with(1000.0, false, &config);
    assert_eq!(stations.len(), 10_001);
    assert!((stations[10_000] - 1000.0).abs() < 1e-9);
}

#[test]
fn test_manual_even_spans_padded_range() {
    let config = FillConfig::default()
        .with_padding(10.0, 10.0)
        .with_count(CountPolicy::ManualEven(3));
    assert_eq!(plan_with(100.0, false, &config), vec![10.0, 50.0, 90.0]);
}

#[test]
fn test_manual_on_padded_closed_path() {
    let config = FillConfig::default()
        .with_padding(5.0, 5.0)
        .with_count(CountPolicy::Manual(2));
    assert_eq!(plan_with(40.0, true, &config), vec![12.5, 27.5]);
}

#[test]
fn test_auto_fit_full_loop() {
    let config = FillConfig::default().with_spacing(SpacingMode::AutoFit { target: Some(7.0) });
    let stations = plan_with(70.0, true, &config);
    assert_eq!(stations.len(), 10);
    assert_eq!(stations[1], 7.0);
}

#[test]
fn test_seeded_random_spacing_is_reproducible() {
    let config = FillConfig::default()
        .with_spacing(SpacingMode::Random { min: 2.0, max: 6.0 })
        .with_seed(1234);
    let a = plan_with(200.0, false, &config);
    let b = plan_with(200.0, false, &config);
    assert_eq!(a, b);

    let other = config.clone().with_seed(4321);
    assert_ne!(a, plan_with(200.0, false, &other));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = FillConfig::default().with_padding(-1.0, 0.0);
    let mut rng = FillRng::seeded(0);
    let err = plan(10.0, false, &config, &stamps(), &mut rng, &FillControl::new()).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_degenerate_length_is_rejected() {
    let mut rng = FillRng::seeded(0);
    let err = plan(
        0.0,
        false,
        &FillConfig::default(),
        &stamps(),
        &mut rng,
        &FillControl::new(),
    )
    .unwrap_err();
    assert!(err.is_degenerate_geometry());
}

#[test]
fn test_extend_closed_path_stops_before_seam() {
    let config = FillConfig::default();
    let planner = Planner::new(40.0, true, &config, &[]);
    let mut rng = FillRng::seeded(0);
    let more = planner
        .extend(&[0.0, 10.0], 5, &mut rng, &FillControl::new())
        .unwrap()
        .into_inner();
    assert_eq!(more, vec![20.0, 30.0]);
}

#[test]
fn test_stations_carry_geometry() {
    let path = Path::polyline(&[Point::ZERO, Point::new(0.0, 20.0)], false).unwrap();
    let sampler = CurveSampler::build(path, &SamplerOptions::default()).unwrap();
    let stations = stations_at(&sampler, &[0.0, 10.0, 20.0], 4).unwrap();
    assert_eq!(stations[0].index, 4);
    assert_eq!(stations[2].index, 6);
    assert_eq!(stations[1].point, Point::new(0.0, 10.0));
    assert!((stations[1].tangent_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!((stations[1].normal.x + 1.0).abs() < 1e-12);
}

#[test]
fn test_progress_reaches_completion() {
    let control = FillControl::new();
    let mut rng = FillRng::seeded(0);
    plan(50.0, false, &FillConfig::default(), &stamps(), &mut rng, &control).unwrap();
    assert_eq!(control.progress_percent(), 100.0);
}
