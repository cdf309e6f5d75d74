use curvefill_core::{FillControl, Point};
use curvefill_engine::collision::{CollisionFilter, Footprint};
use curvefill_engine::resolver::{PlacementTransform, Scale};
use curvefill_engine::stamp::StampVariant;
use std::f64::consts::{FRAC_PI_2, PI};

fn placed(station: usize, position: Point, rotation: f64, scale: f64) -> PlacementTransform {
    PlacementTransform {
        position,
        rotation,
        scale: Scale::uniform(scale),
        stamp_index: 0,
        station_index: station,
        s: station as f64,
        mirrored: false,
        corner_adjusted: false,
    }
}

#[test]
fn test_footprint_follows_rotation_and_scale() {
    let stamp = StampVariant::centered(1, 4.0, 2.0);
    let footprint = Footprint::new(&stamp, &placed(0, Point::new(10.0, 10.0), FRAC_PI_2, 2.0));
    let bounds = footprint.bounds();
    assert!((bounds.width() - 4.0).abs() < 1e-9);
    assert!((bounds.height() - 8.0).abs() < 1e-9);
    assert!((bounds.center().0 - 10.0).abs() < 1e-9);
}

#[test]
fn test_hull_proxy_collision() {
    let triangle = StampVariant::hull(
        1,
        vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)],
    );
    let a = Footprint::new(&triangle, &placed(0, Point::ZERO, 0.0, 1.0));
    // Boxes overlap but the hypotenuse separates the triangles.
    let b = Footprint::new(&triangle, &placed(1, Point::new(4.5, 4.5), PI, 1.0));
    assert!(a.bounds().intersects(b.bounds()));
    assert!(!a.overlaps(&b));

    let c = Footprint::new(&triangle, &placed(2, Point::new(1.0, 1.0), 0.0, 1.0));
    assert!(a.overlaps(&c));
}

#[test]
fn test_filter_is_deterministic() {
    let stamps = vec![StampVariant::centered(1, 3.0, 3.0)];
    let transforms: Vec<_> = (0..40)
        .map(|i| {
            let angle = i as f64 * 0.3;
            placed(i, Point::new(8.0 * angle.cos(), 8.0 * angle.sin()), angle, 1.0)
        })
        .collect();

    let run = || {
        let mut filter = CollisionFilter::for_stamps(&stamps, 1.0);
        filter
            .filter(&transforms, &stamps, &FillControl::new())
            .into_inner()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(!first.discarded.is_empty());
    assert_eq!(first.accepted.len() + first.discarded.len(), transforms.len());
    assert_eq!(first.accepted[0].station_index, 0);
    for pair in first.accepted.windows(2) {
        assert!(pair[0].station_index < pair[1].station_index);
    }
}

#[test]
fn test_no_accepted_footprints_overlap() {
    let stamps = vec![StampVariant::centered(1, 5.0, 1.0)];
    let transforms: Vec<_> = (0..30)
        .map(|i| placed(i, Point::new(i as f64 * 1.5, (i % 3) as f64), 0.2 * i as f64, 1.0))
        .collect();
    let mut filter = CollisionFilter::for_stamps(&stamps, 1.0);
    let report = filter
        .filter(&transforms, &stamps, &FillControl::new())
        .into_inner();
    let footprints: Vec<_> = report
        .accepted
        .iter()
        .map(|t| Footprint::new(&stamps[0], t))
        .collect();
    for (i, a) in footprints.iter().enumerate() {
        for b in &footprints[i + 1..] {
            assert!(!a.overlaps(b));
        }
    }
}

#[test]
fn test_cell_size_tracks_largest_stamp() {
    let stamps = vec![
        StampVariant::centered(1, 3.0, 4.0),
        StampVariant::centered(2, 1.0, 1.0),
    ];
    let filter = CollisionFilter::for_stamps(&stamps, 2.0);
    assert!((filter.cell_size() - 10.0).abs() < 1e-12);
}

#[test]
fn test_manual_insert_blocks_later_candidates() {
    let stamps = vec![StampVariant::centered(1, 2.0, 2.0)];
    let mut filter = CollisionFilter::new(2.0);
    filter.insert(&stamps[0], &placed(0, Point::ZERO, 0.0, 1.0));
    let probe = Footprint::new(&stamps[0], &placed(1, Point::new(1.0, 0.0), 0.0, 1.0));
    assert!(filter.collides(&probe));
    filter.clear();
    assert!(!filter.collides(&probe));
}
