//! Canvas controller: binds one live surface to one document.
//!
//! The controller owns the surface, the scene store mirroring it and the
//! undo history. Hosts feed it pointer, wheel and key input; after each call
//! it drains the surface's event queue and reacts (store sync, history
//! capture, auto-reparenting, frame-drags-children, autosave scheduling).
//!
//! Every operation tolerates a detached surface and does nothing.

mod actions;
mod clipboard;
mod keyboard;
mod persistence;
mod pointer;

pub use clipboard::ClipboardEntry;
pub use pointer::contrast_text_color;

use crate::config::EditorConfig;
use crate::geometry::{collect_descendants, find_containing_frame};
use crate::history::History;
use crate::labels::frame_labels;
use crate::scene::{CUSTOM_FIELDS, ObjectId, ObjectMeta, SceneStore};
use crate::snap::{SnapMode, snap_to_grid};
use crate::storage::{AutoSaveTimer, DocumentStore, Instant};
use crate::surface::{Surface, SurfaceEvent, SurfaceKey};
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Pointer gesture owned by the controller.
///
/// Dragging a selection is not modeled here: the surface moves, scales
/// and rotates active objects natively while the controller is `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// A new shape is being dragged out from `start`.
    Drawing {
        start: Point,
        shape: SurfaceKey,
        tool: ToolKind,
    },
    /// The viewport follows the pointer. `last_point` is in screen pixels.
    Panning { last_point: Point },
    EditingText { key: SurfaceKey },
}

/// State machine for one mounted canvas.
pub struct CanvasController<S: Surface> {
    document_id: String,
    config: EditorConfig,
    surface: Option<S>,
    store: SceneStore,
    history: History,
    gesture: Gesture,
    space_held: bool,
    snap: SnapMode,
    clipboard: Vec<ClipboardEntry>,
    /// Frame origins at the previous move tick, keyed by frame.
    frame_positions: HashMap<SurfaceKey, Point>,
    autosave: AutoSaveTimer,
    documents: Arc<dyn DocumentStore>,
}

impl<S: Surface> std::fmt::Debug for CanvasController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasController")
            .field("document_id", &self.document_id)
            .field("attached", &self.surface.is_some())
            .field("gesture", &self.gesture)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> CanvasController<S> {
    /// Mount a controller on a surface.
    ///
    /// Until [`CanvasController::restore`] completes, history capture,
    /// autosave and the final save on unmount are suppressed.
    pub fn new(
        document_id: impl Into<String>,
        surface: S,
        documents: Arc<dyn DocumentStore>,
        config: EditorConfig,
    ) -> Self {
        let mut history = History::with_limit(config.history_limit);
        history.set_restoring(true);
        Self {
            document_id: document_id.into(),
            autosave: AutoSaveTimer::new(config.autosave_delay()),
            config,
            surface: Some(surface),
            store: SceneStore::new(),
            history,
            gesture: Gesture::Idle,
            space_held: false,
            snap: SnapMode::None,
            clipboard: Vec::new(),
            frame_positions: HashMap::new(),
            documents,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Mutable store access, for subscriptions and panel toggles.
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Direct surface access. Call [`CanvasController::process_events`]
    /// afterwards so the controller sees what changed.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Detach the surface. Later calls become no-ops.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.autosave.cancel();
        self.gesture = Gesture::Idle;
        let surface = self.surface.take();
        self.sync();
        surface
    }

    pub fn is_editing_text(&self) -> bool {
        self.history.is_editing_text()
    }

    pub fn is_restore_pending(&self) -> bool {
        self.history.is_restoring()
    }

    pub fn snap_mode(&self) -> SnapMode {
        self.snap
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    /// Re-derive the store's object list from the surface.
    pub fn sync(&mut self) {
        self.store
            .sync_from_surface(self.surface.as_ref().map(|s| s as &dyn Surface));
    }

    /// Paint the surface with the frame label overlay.
    pub fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let labels = frame_labels(surface);
        surface.render(&labels);
    }

    /// Drain and handle everything the surface reported.
    pub fn process_events(&mut self) {
        loop {
            let events = match self.surface.as_mut() {
                Some(surface) => surface.drain_events(),
                None => return,
            };
            if events.is_empty() {
                return;
            }
            for event in events {
                self.handle_event(event);
            }
        }
    }

    /// Like [`CanvasController::process_events`], but every add, remove
    /// and commit in the queue counts as a single edit.
    fn process_events_as_one_edit(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let mut changed = false;
        for event in surface.drain_events() {
            match event {
                SurfaceEvent::ObjectAdded(_)
                | SurfaceEvent::ObjectRemoved(_)
                | SurfaceEvent::ObjectModified(_) => changed = true,
                other => self.handle_event(other),
            }
        }
        if changed {
            self.structural_change();
        }
        self.process_events();
    }

    fn handle_event(&mut self, event: SurfaceEvent) {
        log::trace!("{}: {:?}", self.document_id, event);
        match event {
            SurfaceEvent::ObjectAdded(_) | SurfaceEvent::ObjectRemoved(_) => {
                self.structural_change();
            }
            SurfaceEvent::ObjectModified(key) => {
                self.auto_reparent(key);
                self.structural_change();
            }
            SurfaceEvent::ObjectMoving(key) => self.object_moving(key),
            SurfaceEvent::SelectionCreated(keys) | SurfaceEvent::SelectionUpdated(keys) => {
                let ids: Vec<ObjectId> = keys
                    .iter()
                    .filter_map(|key| self.store.object_by_key(*key).map(|o| o.id.clone()))
                    .collect();
                self.store.set_selected_ids(ids);
                self.store.set_right_panel_open(true);
            }
            SurfaceEvent::SelectionCleared => {
                self.store.set_selected_ids(Vec::new());
                self.store.set_right_panel_open(false);
            }
            SurfaceEvent::TextEditingEntered(key) => {
                self.history.set_editing_text(true);
                self.gesture = Gesture::EditingText { key };
            }
            SurfaceEvent::TextEditingExited(_) => {
                self.history.set_editing_text(false);
                if matches!(self.gesture, Gesture::EditingText { .. }) {
                    self.gesture = Gesture::Idle;
                }
                // Keystrokes are coalesced into one snapshot here.
                self.structural_change();
            }
            SurfaceEvent::TextChanged(_) => self.sync(),
        }
    }

    /// Sync, record a snapshot and schedule an autosave.
    fn structural_change(&mut self) {
        self.sync();
        if matches!(self.gesture, Gesture::Drawing { .. }) {
            return;
        }
        self.capture_snapshot();
        if !self.history.is_restoring() {
            self.autosave.schedule(Instant::now());
        }
    }

    /// Record the surface as a history snapshot unless capture is suppressed.
    pub fn capture_snapshot(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        if self.history.is_suppressed() {
            return;
        }
        match surface.to_json(&CUSTOM_FIELDS) {
            Ok(json) => {
                self.history.record(json);
            }
            Err(e) => log::warn!("Failed to capture snapshot for {}: {}", self.document_id, e),
        }
    }

    /// Step back one snapshot. Returns false at the start of history, or
    /// when the snapshot cannot be loaded, in which case the cursor stays.
    pub async fn undo(&mut self) -> bool {
        if self.surface.is_none() {
            return false;
        }
        let Some(snapshot) = self.history.step_back().map(str::to_owned) else {
            return false;
        };
        if self.replay(&snapshot).await {
            return true;
        }
        self.history.step_forward();
        false
    }

    /// Step forward one snapshot. Returns false at the end of history, or
    /// when the snapshot cannot be loaded, in which case the cursor stays.
    pub async fn redo(&mut self) -> bool {
        if self.surface.is_none() {
            return false;
        }
        let Some(snapshot) = self.history.step_forward().map(str::to_owned) else {
            return false;
        };
        if self.replay(&snapshot).await {
            return true;
        }
        self.history.step_back();
        false
    }

    async fn replay(&mut self, snapshot: &str) -> bool {
        self.gesture = Gesture::Idle;
        self.history.set_replaying(true);
        let loaded = match self.surface.as_mut() {
            Some(surface) => match surface.load_from_json(snapshot).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to replay snapshot for {}: {}", self.document_id, e);
                    false
                }
            },
            None => false,
        };
        self.process_events();
        // Cleared whether or not the load succeeded.
        self.history.set_replaying(false);
        self.sync();
        loaded
    }

    /// Recompute the containing frame of a committed non-frame object.
    fn auto_reparent(&mut self, key: SurfaceKey) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.store.sync_from_surface(Some(&*surface));
        let Some(target) = self.store.object_by_key(key) else {
            return;
        };
        if target.is_frame {
            return;
        }
        let parent = find_containing_frame(self.store.objects(), target);
        if parent == target.parent_id {
            return;
        }
        log::debug!("Reparenting {} to {:?}", target.id, parent);
        if let Some(object) = surface.get_mut(key) {
            let mut meta = ObjectMeta::from_properties(&object.properties);
            meta.parent_id = parent;
            meta.write_to(&mut object.properties);
        }
    }

    /// Snap a moving object and drag a moving frame's descendants along.
    fn object_moving(&mut self, key: SurfaceKey) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.snap.is_enabled() {
            if let Some(object) = surface.get_mut(key) {
                let geometry = &mut object.render.geometry;
                let snapped = snap_to_grid(geometry.origin(), self.config.grid_size);
                geometry.set_origin(snapped.point);
            }
        }

        let Some(object) = surface.get(key) else {
            return;
        };
        let meta = ObjectMeta::from_properties(&object.properties);
        let Some(frame_id) = meta.id.filter(|_| meta.is_frame) else {
            return;
        };
        let current = object.render.geometry.origin();
        let Some(previous) = self.frame_positions.insert(key, current) else {
            return;
        };
        let delta = current - previous;
        if delta == Vec2::ZERO {
            return;
        }

        // Selected children already move with the selection.
        let active: HashSet<SurfaceKey> = surface.active_keys().iter().copied().collect();
        for id in collect_descendants(self.store.objects(), &frame_id) {
            let Some(child_key) = self.store.key_of(&id) else {
                continue;
            };
            if active.contains(&child_key) {
                continue;
            }
            if let Some(child) = surface.get_mut(child_key) {
                child.render.geometry.translate(delta);
            }
        }
    }

    /// Remember where the active frames are before a drag starts.
    fn record_frame_positions(&mut self) {
        self.frame_positions.clear();
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        for key in surface.active_keys() {
            if let Some(object) = surface.get(*key) {
                if ObjectMeta::from_properties(&object.properties).is_frame {
                    self.frame_positions
                        .insert(*key, object.render.geometry.origin());
                }
            }
        }
    }
}

/// Zoom level as shown to the user, rounded to two decimals.
pub(crate) fn display_zoom(zoom: f64) -> f64 {
    (zoom * 100.0).round() / 100.0
}
