//! End-to-end fills through [`FillSession`].

use curvefill_core::{FillControl, Point};
use curvefill_engine::config::{CountPolicy, FillConfig, PatternMode};
use curvefill_engine::path::Path;
use curvefill_engine::session::FillSession;
use curvefill_engine::stamp::StampVariant;
use std::f64::consts::{PI, TAU};

fn run(path: Path, stamps: Vec<StampVariant>, config: FillConfig) -> FillSession {
    let mut session = FillSession::new();
    let planned = session
        .plan(path, stamps, config, &FillControl::new())
        .unwrap();
    assert!(!planned.is_cancelled());
    let outcome = session.execute(&FillControl::new()).unwrap();
    assert!(!outcome.is_cancelled());
    session
}

fn wrap(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

#[test]
fn test_circle_with_fixed_spacing() {
    let radius = 100.0 / TAU;
    let session = run(
        Path::circle(Point::ZERO, radius).unwrap(),
        vec![StampVariant::centered(1, 2.0, 2.0)],
        FillConfig::default(),
    );
    let result = session.result().unwrap();
    assert_eq!(result.count, 10);

    for (i, t) in result.transforms.iter().enumerate() {
        assert!((t.s - i as f64 * 10.0).abs() < 1e-9);
        let centre = t.apply(Point::ZERO);
        assert!((centre.length() - radius).abs() < 1e-2);
    }

    // Tangent angles turn a full revolution in equal steps.
    let rotations: Vec<f64> = result.transforms.iter().map(|t| t.rotation).collect();
    let mut turned = 0.0;
    for i in 0..rotations.len() {
        let step = wrap(rotations[(i + 1) % rotations.len()] - rotations[i]);
        assert!((step - TAU / 10.0).abs() < 0.01);
        turned += step;
    }
    assert!((turned - TAU).abs() < 1e-9);
    assert!((rotations[0] - PI / 2.0).abs() < 1e-6);
}

#[test]
fn test_even_count_on_straight_line() {
    let session = run(
        Path::polyline(&[Point::ZERO, Point::new(40.0, 0.0)], false).unwrap(),
        vec![StampVariant::centered(1, 2.0, 2.0)],
        FillConfig::default().with_count(CountPolicy::ManualEven(5)),
    );
    let s: Vec<f64> = session
        .result()
        .unwrap()
        .transforms
        .iter()
        .map(|t| t.s)
        .collect();
    assert_eq!(s, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
}

#[test]
fn test_two_stamp_sequence() {
    let session = run(
        Path::polyline(&[Point::ZERO, Point::new(60.0, 0.0)], false).unwrap(),
        vec![
            StampVariant::centered(1, 2.0, 2.0),
            StampVariant::centered(2, 3.0, 3.0),
        ],
        FillConfig::default().with_pattern(PatternMode::Sequence),
    );
    let picked: Vec<usize> = session
        .result()
        .unwrap()
        .transforms
        .iter()
        .map(|t| t.stamp_index)
        .collect();
    assert_eq!(picked, vec![0, 1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_overlapping_stamps_are_thinned() {
    let path = Path::polyline(&[Point::ZERO, Point::new(50.0, 0.0)], false).unwrap();
    let stamps = vec![StampVariant::centered(1, 15.0, 3.0)];

    let unfiltered = run(path.clone(), stamps.clone(), FillConfig::default());
    let filtered = run(
        path,
        stamps,
        FillConfig::default().with_collision_detection(true),
    );

    let all = unfiltered.result().unwrap();
    let kept = filtered.result().unwrap();
    assert_eq!(all.count, 6);
    assert!(!all.collisions_discarded);
    assert!(kept.count < all.count);
    assert!(kept.collisions_discarded);

    let s: Vec<f64> = kept.transforms.iter().map(|t| t.s).collect();
    assert_eq!(s, vec![0.0, 20.0, 40.0]);
    assert!(s.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_square_frame_with_corner_handling() {
    let square = Path::polyline(
        &[
            Point::ZERO,
            Point::new(40.0, 0.0),
            Point::new(40.0, 40.0),
            Point::new(0.0, 40.0),
        ],
        true,
    )
    .unwrap();
    let stamps = vec![StampVariant::centered(1, 4.0, 4.0)];
    let config = FillConfig::default()
        .with_padding(1.0, 0.0)
        .with_collision_detection(true);
    let session = run(square, stamps, config);
    let result = session.result().unwrap();

    assert_eq!(result.count, 16);
    // Stations 1, 41, 81 and 121 sit 1 past a corner and move 1 further on.
    let adjusted: Vec<f64> = result
        .transforms
        .iter()
        .filter(|t| t.corner_adjusted)
        .map(|t| t.s)
        .collect();
    assert_eq!(adjusted.len(), 4);
    for (s, expected) in adjusted.iter().zip([2.0, 42.0, 82.0, 122.0]) {
        assert!((s - expected).abs() < 1e-9);
    }
    assert_eq!(result.transforms[1].s, 11.0);
    assert!(!result.collisions_discarded);
}
