use curvefill_core::Point;
use curvefill_engine::path::{Path, Segment};

#[test]
fn test_path_from_json() {
    let json = r#"{
        "segments": [
            {"kind": "line", "from": {"x": 0.0, "y": 0.0}, "to": {"x": 10.0, "y": 0.0}},
            {"kind": "cubic",
             "from": {"x": 10.0, "y": 0.0},
             "ctrl1": {"x": 15.0, "y": 0.0},
             "ctrl2": {"x": 20.0, "y": 5.0},
             "to": {"x": 20.0, "y": 10.0}}
        ],
        "closed": false
    }"#;
    let path: Path = serde_json::from_str(json).unwrap();
    assert_eq!(path.segment_count(), 2);
    assert!(!path.is_closed());
    assert_eq!(path.end(), Point::new(20.0, 10.0));
}

#[test]
fn test_scaled_path() {
    let path = Path::polyline(&[Point::ZERO, Point::new(1.0, 2.0)], false).unwrap();
    let scaled = path.scaled(25.4).unwrap();
    assert_eq!(scaled.end(), Point::new(25.4, 50.8));
}

#[test]
fn test_small_gap_is_tolerated() {
    let path = Path::new(
        vec![
            Segment::line(Point::ZERO, Point::new(100.0, 0.0)),
            Segment::line(Point::new(100.0, 1e-7), Point::new(100.0, 100.0)),
        ],
        false,
    );
    assert!(path.is_ok());
}

#[test]
fn test_bounds_include_control_hull() {
    let path = Path::circle(Point::new(5.0, 5.0), 5.0).unwrap();
    let bounds = path.bounds();
    assert!(bounds.min_x <= 0.0 + 1e-9);
    assert!(bounds.max_y >= 10.0 - 1e-9);
}
