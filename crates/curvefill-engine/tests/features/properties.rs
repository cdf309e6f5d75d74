use curvefill_core::{FillControl, Point};
use curvefill_engine::collision::CollisionFilter;
use curvefill_engine::config::{CountPolicy, FillConfig, ScaleMode, SpacingMode};
use curvefill_engine::path::{Path, Segment};
use curvefill_engine::planner::plan;
use curvefill_engine::random::FillRng;
use curvefill_engine::resolver::{PlacementTransform, Scale};
use curvefill_engine::sampler::{CurveSampler, SamplerOptions};
use curvefill_engine::session::FillSession;
use curvefill_engine::stamp::StampVariant;
use proptest::prelude::*;

fn cubic() -> impl Strategy<Value = Path> {
    prop::array::uniform6(-50.0..50.0f64).prop_filter_map("degenerate", |c| {
        Path::new(
            vec![Segment::cubic(
                Point::ZERO,
                Point::new(c[0], c[1]),
                Point::new(c[2], c[3]),
                Point::new(c[4], c[5]),
            )],
            false,
        )
        .ok()
        .filter(|p| p.end().length() > 1.0)
    })
}

proptest! {
    #[test]
    fn prop_closed_path_wraps(radius in 0.5..500.0f64, cx in -100.0..100.0f64) {
        let path = Path::circle(Point::new(cx, 0.0), radius).unwrap();
        let sampler = CurveSampler::build(path, &SamplerOptions::default()).unwrap();
        let (a, _) = sampler.position_at(0.0).unwrap();
        let (b, _) = sampler.position_at(sampler.total_length()).unwrap();
        prop_assert!(a.distance_to(&b) < 1e-9 * radius.max(1.0));
    }

    #[test]
    fn prop_fixed_spacing_count(d in 0.5..50.0f64, k in 1usize..200, frac in 0.05..0.95f64) {
        let total = (k as f64 + frac) * d;
        let config = FillConfig::default().with_spacing(SpacingMode::Fixed { distance: d });
        let stamps = vec![StampVariant::centered(1, 1.0, 1.0)];
        let mut rng = FillRng::seeded(0);
        let stations = plan(total, false, &config, &stamps, &mut rng, &FillControl::new())
            .unwrap()
            .into_inner();
        prop_assert_eq!(stations.len(), k + 1);
        prop_assert_eq!(stations[0], 0.0);
        for pair in stations.windows(2) {
            prop_assert!((pair[1] - pair[0] - d).abs() < 1e-9 * total.max(1.0));
        }
    }

    #[test]
    fn prop_plan_is_idempotent(seed in any::<u64>(), min in 0.5..5.0f64, extra in 0.0..5.0f64) {
        let config = FillConfig::default()
            .with_spacing(SpacingMode::Random { min, max: min + extra })
            .with_seed(seed);
        let stamps = vec![StampVariant::centered(1, 1.0, 1.0)];
        let run = || {
            let mut rng = FillRng::from_seed(config.random_seed);
            plan(120.0, true, &config, &stamps, &mut rng, &FillControl::new())
                .unwrap()
                .into_inner()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn prop_gradient_scale_hits_both_ends(
        n in 2usize..80,
        start in 0.1..5.0f64,
        end in 0.1..5.0f64,
        closed in any::<bool>(),
    ) {
        let path = if closed {
            Path::circle(Point::ZERO, 20.0).unwrap()
        } else {
            Path::polyline(&[Point::ZERO, Point::new(100.0, 0.0)], false).unwrap()
        };
        let config = FillConfig::default()
            .with_count(CountPolicy::ManualEven(n))
            .with_scale(ScaleMode::Gradient { start, end });
        let mut session = FillSession::new();
        session
            .plan(path, vec![StampVariant::centered(1, 1.0, 1.0)], config, &FillControl::new())
            .unwrap();
        let result = session.execute(&FillControl::new()).unwrap().into_inner();
        prop_assert_eq!(result.count, n);
        prop_assert_eq!(result.transforms[0].scale.x, start);
        prop_assert_eq!(result.transforms[n - 1].scale.x, end);
    }

    #[test]
    fn prop_arc_length_round_trip(path in cubic(), f in 0.0..=1.0f64) {
        let sampler = CurveSampler::build(path, &SamplerOptions::default()).unwrap();
        let s = f * sampler.total_length();
        let (segment, t) = sampler.locate(s).unwrap();
        let back = sampler.arc_length_at(segment, t);
        prop_assert!((back - s).abs() < 1e-6 * sampler.total_length().max(1.0));
    }

    #[test]
    fn prop_collision_filter_is_order_stable(
        xs in prop::collection::vec(0.0..100.0f64, 1..60),
        size in 1.0..10.0f64,
    ) {
        let stamps = vec![StampVariant::centered(1, size, size)];
        let transforms: Vec<PlacementTransform> = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| PlacementTransform {
                position: Point::new(x, 0.0),
                rotation: x * 0.1,
                scale: Scale::uniform(1.0),
                stamp_index: 0,
                station_index: i,
                s: i as f64,
                mirrored: false,
                corner_adjusted: false,
            })
            .collect();
        let mut a = CollisionFilter::for_stamps(&stamps, 1.0);
        let mut b = CollisionFilter::for_stamps(&stamps, 1.0);
        let first = a.filter(&transforms, &stamps, &FillControl::new()).into_inner();
        let second = b.filter(&transforms, &stamps, &FillControl::new()).into_inner();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.accepted[0].station_index, 0);
        for pair in first.accepted.windows(2) {
            prop_assert!(pair[0].station_index < pair[1].station_index);
        }
    }
}
