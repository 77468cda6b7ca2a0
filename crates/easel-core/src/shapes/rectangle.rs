//! Rectangle payload.

use super::Geometry;
use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// A rectangle with optional rounded corners. Frames are rectangles too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    /// Corner radius (0 = sharp corners). Applies to both axes.
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    pub fn new(corner_radius: f64) -> Self {
        Self { corner_radius }
    }

    /// The rounded rect in intrinsic coordinates, radius clamped to half the short side.
    pub fn as_rounded_rect(&self, geometry: &Geometry) -> RoundedRect {
        let rect = Rect::new(0.0, 0.0, geometry.width, geometry.height);
        let max_radius = geometry.width.min(geometry.height).max(0.0) / 2.0;
        rect.to_rounded_rect(self.corner_radius.clamp(0.0, max_radius))
    }

    pub fn outline(&self, geometry: &Geometry) -> BezPath {
        if self.corner_radius > 0.0 {
            self.as_rounded_rect(geometry).to_path(0.1)
        } else {
            Rect::new(0.0, 0.0, geometry.width, geometry.height).to_path(0.1)
        }
    }
}
