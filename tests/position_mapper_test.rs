//! Tests for mapping turtle positions to board cells.

use strictly_turtle::{CellLayout, Point, Position};

#[test]
fn test_each_center_maps_to_its_cell() {
    let layout = CellLayout::default();
    for pos in Position::ALL {
        assert_eq!(layout.map_to_cell(layout.center(pos)), Some(pos));
    }
}

#[test]
fn test_far_point_maps_to_nothing() {
    let layout = CellLayout::default();
    assert_eq!(layout.map_to_cell(Point::new(100.0, 100.0)), None);
    assert_eq!(layout.map_to_cell(Point::new(-3.0, 5.5)), None);
}

#[test]
fn test_gap_between_cells_maps_to_nothing() {
    let layout = CellLayout::default();
    // Halfway between Center and TopCenter, 1.5 from each.
    assert_eq!(layout.map_to_cell(Point::new(5.5, 7.0)), None);
}

#[test]
fn test_tolerance_edge_is_inside() {
    let layout = CellLayout::default();
    let corner = layout.center(Position::BottomRight).offset(1.0, -1.0);
    assert_eq!(layout.map_to_cell(corner), Some(Position::BottomRight));

    let outside = layout.center(Position::BottomRight).offset(1.01, 0.0);
    assert_eq!(layout.map_to_cell(outside), None);
}

#[test]
fn test_custom_centers() {
    let mut centers = [Point::default(); 9];
    for pos in Position::ALL {
        centers[pos.to_index()] = Point::new(pos.col() as f64 * 10.0, -(pos.row() as f64) * 10.0);
    }
    let layout = CellLayout::new(centers, 2.0);

    assert_eq!(layout.map_to_cell(Point::new(21.0, -19.0)), Some(Position::BottomRight));
    assert_eq!(layout.map_to_cell(Point::new(5.0, 0.0)), None);
    assert!(!layout.overlaps());
}

#[test]
fn test_overlapping_regions_prefer_lower_index() {
    let layout = CellLayout::grid(Point::new(5.5, 5.5), 3.0, 1.5);
    assert!(layout.overlaps());
    // Exactly on the shared edge of TopLeft and TopCenter.
    assert_eq!(layout.map_to_cell(Point::new(4.0, 8.5)), Some(Position::TopLeft));
}
