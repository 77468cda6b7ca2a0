//! Easel Core Library
//!
//! Platform-agnostic scene model, history and canvas controller for the
//! Easel design canvas. Rendering and hit-testing live behind the
//! [`surface::Surface`] trait; [`surface::MemorySurface`] is a headless
//! implementation used by tests and tooling.

pub mod config;
pub mod controller;
pub mod controls;
pub mod geometry;
pub mod history;
pub mod input;
pub mod labels;
pub mod layers;
pub mod properties;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod surface;
pub mod tabs;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use controller::{CanvasController, ClipboardEntry, Gesture, contrast_text_color};
pub use history::{History, MAX_HISTORY};
pub use input::{Key, KeyInput, Modifiers, PointerInput, WheelInput};
pub use layers::{DropPosition, LayerNode};
pub use properties::{ObjectProperties, PropertyUpdate};
pub use scene::{ObjectId, ObjectKind, ObjectMeta, SceneObject, SceneStore, StoreChange};
pub use snap::{GRID_SIZE, SnapMode, SnapResult, snap_to_grid};
pub use storage::{
    CanvasState, DocumentMeta, DocumentStore, Preferences, StorageError, StorageResult,
};
pub use surface::{MemorySurface, Surface, SurfaceEvent, SurfaceKey};
pub use tabs::{Tab, TabManager};
pub use tools::ToolKind;
pub use viewport::Viewport;

/// Boxed future returned by storage backends and surfaces.
///
/// Not `Send`: the editor runs on a single thread and WASM futures are
/// not `Send` either.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + 'a>>;
