//! Scene graph store: the render-independent mirror of the live surface.

use super::{ObjectId, ObjectKind, ObjectMeta, SceneObject};
use crate::surface::{Surface, SurfaceKey};
use crate::tools::ToolKind;
use kurbo::Point;
use std::collections::HashSet;

/// What changed in a store notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Objects,
    Selection,
    Tool,
    Zoom,
    Cursor,
    Panels,
}

/// Handle returned by [`SceneStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(StoreChange)>;

/// Authoritative object list, selection and view state for one canvas.
///
/// Objects only change through [`SceneStore::sync_from_surface`]; every
/// other mutation goes through the live surface first.
pub struct SceneStore {
    objects: Vec<SceneObject>,
    selected_ids: Vec<ObjectId>,
    active_tool: ToolKind,
    zoom: f64,
    cursor_position: Option<Point>,
    left_sidebar_open: bool,
    right_panel_open: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            selected_ids: Vec::new(),
            active_tool: ToolKind::default(),
            zoom: 1.0,
            cursor_position: None,
            left_sidebar_open: true,
            right_panel_open: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl std::fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneStore")
            .field("objects", &self.objects.len())
            .field("selected_ids", &self.selected_ids)
            .field("active_tool", &self.active_tool)
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(StoreChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    fn notify(&mut self, change: StoreChange) {
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }

    /// Re-derive the object list from the surface, in z-order.
    ///
    /// With no surface attached the store empties. Selected ids that no
    /// longer exist are dropped.
    pub fn sync_from_surface(&mut self, surface: Option<&dyn Surface>) {
        self.objects = match surface {
            Some(surface) => surface
                .objects()
                .iter()
                .enumerate()
                .map(|(index, object)| {
                    let meta = ObjectMeta::from_properties(&object.properties);
                    let kind = ObjectKind::of(&object.render.shape, meta.is_frame);
                    SceneObject {
                        id: meta
                            .id
                            .unwrap_or_else(|| ObjectId::new(format!("obj-{}", index))),
                        kind,
                        name: meta.name.unwrap_or_else(|| {
                            format!("{} {}", object.render.shape.type_name(), index + 1)
                        }),
                        visible: object.render.visible,
                        locked: !object.render.selectable,
                        parent_id: meta.parent_id,
                        is_frame: meta.is_frame,
                        is_component: meta.is_component,
                        bounds: object.render.bounds(),
                        key: object.key,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let live: HashSet<&ObjectId> = self.objects.iter().map(|o| &o.id).collect();
        let before = self.selected_ids.len();
        self.selected_ids.retain(|id| live.contains(id));
        let pruned = self.selected_ids.len() != before;

        self.notify(StoreChange::Objects);
        if pruned {
            self.notify(StoreChange::Selection);
        }
    }

    /// Objects in z-order, bottom first.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn object_by_key(&self, key: SurfaceKey) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.key == key)
    }

    /// Surface key of an object, if it is live.
    pub fn key_of(&self, id: &ObjectId) -> Option<SurfaceKey> {
        self.object(id).map(|o| o.key)
    }

    pub fn selected_ids(&self) -> &[ObjectId] {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selected_ids.contains(id)
    }

    pub fn selected_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| self.selected_ids.contains(&o.id))
    }

    /// Replace the selection. Unknown ids and duplicates are dropped.
    pub fn set_selected_ids(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        let mut selected: Vec<ObjectId> = Vec::new();
        for id in ids {
            if self.object(&id).is_some() && !selected.contains(&id) {
                selected.push(id);
            }
        }
        self.selected_ids = selected;
        self.notify(StoreChange::Selection);
    }

    pub fn clear_selection(&mut self) {
        if !self.selected_ids.is_empty() {
            self.selected_ids.clear();
            self.notify(StoreChange::Selection);
        }
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn set_active_tool(&mut self, tool: ToolKind) {
        if self.active_tool != tool {
            self.active_tool = tool;
            self.notify(StoreChange::Tool);
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.notify(StoreChange::Zoom);
    }

    pub fn cursor_position(&self) -> Option<Point> {
        self.cursor_position
    }

    pub fn set_cursor_position(&mut self, position: Point) {
        self.cursor_position = Some(position);
        self.notify(StoreChange::Cursor);
    }

    pub fn left_sidebar_open(&self) -> bool {
        self.left_sidebar_open
    }

    pub fn right_panel_open(&self) -> bool {
        self.right_panel_open
    }

    pub fn set_left_sidebar_open(&mut self, open: bool) {
        self.left_sidebar_open = open;
        self.notify(StoreChange::Panels);
    }

    pub fn set_right_panel_open(&mut self, open: bool) {
        self.right_panel_open = open;
        self.notify(StoreChange::Panels);
    }

    pub fn toggle_left_sidebar(&mut self) {
        self.set_left_sidebar_open(!self.left_sidebar_open);
    }

    pub fn toggle_right_panel(&mut self) {
        self.set_right_panel_open(!self.right_panel_open);
    }
}
