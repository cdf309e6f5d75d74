use curvefill_core::Bounds;
use curvefill_engine::spatial_index::SpatialIndex;

#[test]
fn test_bounds_creation() {
    let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(bounds.min_x, 0.0);
    assert_eq!(bounds.max_x, 10.0);
    assert_eq!(bounds.width(), 10.0);
    assert_eq!(bounds.height(), 10.0);
}

#[test]
fn test_bounds_center() {
    let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let (cx, cy) = bounds.center();
    assert_eq!(cx, 5.0);
    assert_eq!(cy, 5.0);
}

#[test]
fn test_bounds_intersection() {
    let b1 = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let b2 = Bounds::new(5.0, 5.0, 15.0, 15.0);
    let b3 = Bounds::new(20.0, 20.0, 30.0, 30.0);

    assert!(b1.intersects(&b2));
    assert!(b2.intersects(&b1));
    assert!(!b1.intersects(&b3));
}

#[test]
fn test_spatial_index_creation() {
    let index = SpatialIndex::new(5.0);
    let stats = index.stats();
    assert_eq!(stats.total_items, 0);
    assert_eq!(stats.total_cells, 0);
    assert!(index.is_empty());
}

#[test]
fn test_spatial_index_insert_and_query() {
    let mut index = SpatialIndex::new(10.0);
    index.insert(0, &Bounds::new(10.0, 10.0, 20.0, 20.0));
    index.insert(1, &Bounds::new(-50.0, -50.0, -40.0, -40.0));
    index.insert(2, &Bounds::new(15.0, 15.0, 35.0, 35.0));

    let results = index.query(&Bounds::new(12.0, 12.0, 18.0, 18.0));
    assert_eq!(results, vec![0, 2]);

    let results = index.query(&Bounds::new(-45.0, -45.0, -44.0, -44.0));
    assert_eq!(results, vec![1]);
}

#[test]
fn test_spatial_index_query_point() {
    let mut index = SpatialIndex::default();
    index.insert(7, &Bounds::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(index.query_point(5.0, 5.0), vec![7]);
    assert!(index.query_point(11.0, 5.0).is_empty());
}

#[test]
fn test_spatial_index_remove_and_clear() {
    let mut index = SpatialIndex::new(1.0);
    for i in 0..10 {
        let x = i as f64 * 3.0;
        index.insert(i, &Bounds::new(x, 0.0, x + 2.0, 2.0));
    }
    assert_eq!(index.len(), 10);
    assert!(index.remove(4));
    assert!(!index.remove(4));
    assert!(index.query_point(13.0, 1.0).is_empty());
    assert!(index.get(5).is_some());

    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.stats().total_cells, 0);
}

#[test]
fn test_spatial_index_negative_coordinates() {
    let mut index = SpatialIndex::new(4.0);
    index.insert(0, &Bounds::new(-6.0, -6.0, -1.0, -1.0));
    assert_eq!(index.query_point(-0.5, -0.5), Vec::<usize>::new());
    assert_eq!(index.query_point(-1.0, -1.0), vec![0]);
}
