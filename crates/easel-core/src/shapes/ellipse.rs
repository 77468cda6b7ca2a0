//! Ellipse payload.

use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// An ellipse inscribed in its box. The radii always equal half the
/// intrinsic width and height.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    pub fn new(rx: f64, ry: f64) -> Self {
        Self { rx, ry }
    }

    /// Get as a kurbo Ellipse in intrinsic coordinates.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(Point::new(self.rx, self.ry), (self.rx, self.ry), 0.0)
    }

    pub fn outline(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_centered_in_box() {
        let ellipse = Ellipse::new(20.0, 10.0).as_kurbo();
        assert!(ellipse.contains(Point::new(20.0, 10.0)));
        assert!(!ellipse.contains(Point::new(1.0, 1.0)));
    }
}
