//! Easel Render Library
//!
//! Snapshot export of a canvas as PNG, JPEG or SVG. Exports only read the
//! surface's objects; nothing here mutates a document.

mod raster;
mod svg;

pub use raster::{RasterImage, rasterize};
pub use svg::render_svg;

use easel_core::shapes::{RenderObject, SerializableColor};
use easel_core::surface::Surface;
use kurbo::Rect;
use thiserror::Error;

/// Largest raster edge, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing visible to export")]
    EmptyScene,
    #[error("Invalid scale multiplier: {0}")]
    InvalidMultiplier(f64),
    #[error("Image too large: {width}x{height}")]
    TooLarge { width: f64, height: f64 },
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, ExportFormat::Svg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Output pixels per scene unit. Ignored for SVG.
    pub multiplier: f64,
    /// Fill behind the scene. `None` is transparent, except for JPEG
    /// which falls back to white.
    pub background: Option<SerializableColor>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            multiplier: 1.0,
            background: None,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_background(mut self, background: SerializableColor) -> Self {
        self.background = Some(background);
        self
    }
}

/// Scene-space box of one object, rotation and stroke included.
pub fn object_bounds(object: &RenderObject) -> Rect {
    let geometry = &object.geometry;
    let local = Rect::new(0.0, 0.0, geometry.width, geometry.height);
    let bounds = geometry.transform().transform_rect_bbox(local);
    match object.style.stroke {
        Some(_) if object.style.stroke_width > 0.0 => {
            let half = object.style.stroke_width / 2.0;
            bounds.inflate(half, half)
        }
        _ => bounds,
    }
}

/// Union of the visible objects' bounds, or `None` when nothing is visible.
pub fn visible_bounds<'a>(objects: impl IntoIterator<Item = &'a RenderObject>) -> Option<Rect> {
    objects
        .into_iter()
        .filter(|o| o.visible)
        .map(object_bounds)
        .reduce(|acc, b| acc.union(b))
}

/// Export every object on a surface.
pub fn export(surface: &dyn Surface, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    let objects: Vec<&RenderObject> = surface.objects().iter().map(|o| &o.render).collect();
    export_objects(&objects, options)
}

/// Export objects listed bottom-first.
pub fn export_objects(objects: &[&RenderObject], options: &ExportOptions) -> ExportResult<Vec<u8>> {
    log::debug!(
        "Exporting {} object(s) as {:?} at {}x",
        objects.len(),
        options.format,
        options.multiplier
    );
    match options.format {
        ExportFormat::Svg => render_svg(objects, options.background).map(String::into_bytes),
        format => rasterize(objects, options.multiplier, options.background)?.encode(format),
    }
}
