//! Grid snapping for object positions.

use kurbo::Point;

/// Grid size for snapping.
pub const GRID_SIZE: f64 = 10.0;

/// Snap mode for aligning objects while they move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapMode {
    /// No snapping.
    #[default]
    None,
    /// Snap positions to grid intersections.
    Grid,
}

impl SnapMode {
    /// Flip between off and grid.
    pub fn toggle(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != SnapMode::None
    }
}

impl From<bool> for SnapMode {
    fn from(enabled: bool) -> Self {
        if enabled { SnapMode::Grid } else { SnapMode::None }
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate moved.
    pub snapped_x: bool,
    /// Whether the Y coordinate moved.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a point to the nearest multiple of `grid_size` on both axes.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult {
            point,
            snapped_x: false,
            snapped_y: false,
        };
    }
    let snapped = Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    );
    SnapResult {
        point: snapped,
        snapped_x: (snapped.x - point.x).abs() > f64::EPSILON,
        snapped_y: (snapped.y - point.y).abs() > f64::EPSILON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(13.0, 27.0), GRID_SIZE);
        assert_eq!(result.point, Point::new(10.0, 30.0));
        assert!(result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Point::new(40.0, -20.0), GRID_SIZE);
        assert_eq!(result.point, Point::new(40.0, -20.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_round_up() {
        let result = snap_to_grid(Point::new(15.0, 4.9), GRID_SIZE);
        assert_eq!(result.point, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_zero_grid_is_noop() {
        let result = snap_to_grid(Point::new(3.3, 4.4), 0.0);
        assert_eq!(result.point, Point::new(3.3, 4.4));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_mode_toggle() {
        assert_eq!(SnapMode::None.toggle(), SnapMode::Grid);
        assert_eq!(SnapMode::Grid.toggle(), SnapMode::None);
        assert!(SnapMode::from(true).is_enabled());
        assert!(!SnapMode::default().is_enabled());
    }
}
