//! Canvas geometry: where each cell sits and which cell a pose falls in.

use crate::games::tictactoe::Position;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A point on the actuator's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, derive_new::new)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows upward).
    pub y: f64,
}

impl Point {
    /// Returns this point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A point plus heading, as accepted by teleport commands.
///
/// Missing coordinates in a config file default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, derive_new::new)]
#[serde(default)]
pub struct Pose {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Heading in radians.
    pub theta: f64,
}

impl Pose {
    /// The position part of this pose.
    pub fn point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Cell centers and the capture tolerance used to resolve a pose to a cell.
///
/// Fixed at start-up. Nothing stops `tolerance` from reaching half the
/// distance between neighbouring centers; when capture regions overlap the
/// lower-indexed cell wins (see [`CellLayout::overlaps`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct CellLayout {
    /// Center of each cell, indexed like [`Position`].
    centers: [Point; 9],
    /// Maximum per-axis distance from a center that still counts as that cell.
    tolerance: f64,
}

impl CellLayout {
    /// Creates a layout from explicit centers.
    pub fn new(centers: [Point; 9], tolerance: f64) -> Self {
        Self { centers, tolerance }
    }

    /// Creates a 3x3 grid around `middle`, `spacing` apart, row 0 on top.
    pub fn grid(middle: Point, spacing: f64, tolerance: f64) -> Self {
        let centers = Position::ALL.map(|pos| {
            let dx = (pos.col() as f64 - 1.0) * spacing;
            let dy = (1.0 - pos.row() as f64) * spacing;
            middle.offset(dx, dy)
        });
        Self { centers, tolerance }
    }

    /// Center of the given cell.
    pub fn center(&self, pos: Position) -> Point {
        self.centers[pos.to_index()]
    }

    /// Resolves a point to the first cell, in index order, whose center is
    /// within tolerance on both axes.
    #[instrument(level = "debug", skip(self), fields(tolerance = self.tolerance))]
    pub fn map_to_cell(&self, point: Point) -> Option<Position> {
        Position::ALL.into_iter().find(|&pos| {
            let c = self.center(pos);
            (point.x - c.x).abs() <= self.tolerance && (point.y - c.y).abs() <= self.tolerance
        })
    }

    /// Smallest per-axis separation between any two distinct centers.
    ///
    /// Two capture squares intersect only if they intersect on both axes, so
    /// the larger of the two axis gaps is what keeps a pair apart.
    pub fn min_spacing(&self) -> f64 {
        let mut min = f64::INFINITY;
        for (i, a) in self.centers.iter().enumerate() {
            for b in &self.centers[i + 1..] {
                let gap = (a.x - b.x).abs().max((a.y - b.y).abs());
                min = min.min(gap);
            }
        }
        min
    }

    /// True when some point lies in two cells' capture regions.
    pub fn overlaps(&self) -> bool {
        self.tolerance * 2.0 >= self.min_spacing()
    }
}

impl Default for CellLayout {
    fn default() -> Self {
        Self::grid(Point::new(5.5, 5.5), 3.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_row_zero_on_top() {
        let layout = CellLayout::default();
        assert_eq!(layout.center(Position::TopLeft), Point::new(2.5, 8.5));
        assert_eq!(layout.center(Position::Center), Point::new(5.5, 5.5));
        assert_eq!(layout.center(Position::BottomRight), Point::new(8.5, 2.5));
    }

    #[test]
    fn test_tolerance_is_inclusive_per_axis() {
        let layout = CellLayout::default();
        assert_eq!(layout.map_to_cell(Point::new(6.5, 4.5)), Some(Position::Center));
        assert_eq!(layout.map_to_cell(Point::new(6.6, 5.5)), None);
    }

    #[test]
    fn test_overlap_favours_lower_index() {
        let layout = CellLayout::grid(Point::new(5.5, 5.5), 3.0, 2.0);
        assert!(layout.overlaps());
        // Halfway between center (4) and middle-right (5).
        assert_eq!(layout.map_to_cell(Point::new(7.0, 5.5)), Some(Position::Center));
    }

    #[test]
    fn test_default_grid_does_not_overlap() {
        let layout = CellLayout::default();
        assert_eq!(layout.min_spacing(), 3.0);
        assert!(!layout.overlaps());
    }
}
