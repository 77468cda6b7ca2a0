//! Store actions invoked from the toolbar, layer panel and properties panel.

use super::{CanvasController, display_zoom};
use crate::layers::{self, DropPosition};
use crate::properties::{ObjectProperties, PropertyUpdate};
use crate::scene::{ObjectId, ObjectMeta};
use crate::snap::SnapMode;
use crate::surface::{Cursor, Surface, SurfaceKey};
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

impl<S: Surface> CanvasController<S> {
    /// Switch tools. The hand tool locks every object and disables the
    /// marquee; any other tool unlocks them again.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.store.set_active_tool(tool);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let hand = tool == ToolKind::Hand;
        if hand {
            surface.discard_active();
        }
        let keys: Vec<SurfaceKey> = surface.objects().iter().map(|o| o.key).collect();
        for key in keys {
            if let Some(object) = surface.get_mut(key) {
                object.render.selectable = !hand;
            }
        }
        surface.set_selection_enabled(!hand);
        surface.set_cursor(match tool {
            ToolKind::Hand => Cursor::Grab,
            ToolKind::Select => Cursor::Default,
            ToolKind::Text => Cursor::Text,
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Frame => Cursor::Crosshair,
        });
        self.process_events();
        self.sync();
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap = SnapMode::from(enabled);
    }

    pub fn toggle_snap(&mut self) {
        self.snap = self.snap.toggle();
    }

    pub fn zoom_in(&mut self) {
        let zoom = self.current_zoom() * self.config.zoom_step;
        self.zoom_to(zoom);
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.current_zoom() / self.config.zoom_step;
        self.zoom_to(zoom);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_to(1.0);
    }

    /// Set the zoom level about the center of the viewport.
    pub fn zoom_to(&mut self, zoom: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let zoom = self.config.clamp_zoom(zoom);
        let size = surface.size();
        surface.zoom_to_point(Point::new(size.width / 2.0, size.height / 2.0), zoom);
        self.store.set_zoom(display_zoom(zoom));
    }

    fn current_zoom(&self) -> f64 {
        self.surface.as_ref().map_or(1.0, |s| s.zoom())
    }

    fn live_key(&self, id: &ObjectId) -> Option<SurfaceKey> {
        self.surface.as_ref()?;
        self.store.key_of(id)
    }

    /// Make one object the active selection.
    pub fn select_object(&mut self, id: &ObjectId) {
        let Some(key) = self.live_key(id) else {
            return;
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.set_active(vec![key]);
        }
        self.process_events();
    }

    pub fn toggle_visibility(&mut self, id: &ObjectId) {
        let Some(key) = self.live_key(id) else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Some(object) = surface.get_mut(key) {
            object.render.visible = !object.render.visible;
            surface.commit(key);
        }
        self.process_events();
    }

    /// Delete one object, promoting its children to top level.
    pub fn delete_object(&mut self, id: &ObjectId) {
        let Some(key) = self.live_key(id) else {
            return;
        };
        self.promote_children(&[id.clone()]);
        if let Some(surface) = self.surface.as_mut() {
            surface.remove(key);
        }
        self.process_events_as_one_edit();
    }

    /// Delete every active object. Skipped while editing text.
    pub fn delete_selected(&mut self) {
        if self.is_editing_text() {
            return;
        }
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let keys = surface.active_keys().to_vec();
        if keys.is_empty() {
            return;
        }
        let ids: Vec<ObjectId> = keys
            .iter()
            .filter_map(|key| self.store.object_by_key(*key).map(|o| o.id.clone()))
            .collect();
        self.promote_children(&ids);
        if let Some(surface) = self.surface.as_mut() {
            for key in keys {
                surface.remove(key);
            }
            surface.discard_active();
        }
        self.process_events_as_one_edit();
    }

    /// Clear `parentId` on every object whose parent is being deleted.
    pub(super) fn promote_children(&mut self, parents: &[ObjectId]) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let orphans: Vec<SurfaceKey> = self
            .store
            .objects()
            .iter()
            .filter(|o| o.parent_id.as_ref().is_some_and(|p| parents.contains(p)))
            .map(|o| o.key)
            .collect();
        for key in orphans {
            if let Some(object) = surface.get_mut(key) {
                let mut meta = ObjectMeta::from_properties(&object.properties);
                meta.parent_id = None;
                meta.write_to(&mut object.properties);
            }
        }
    }

    /// Clone an object next to the original and select the clone.
    pub fn duplicate_object(&mut self, id: &ObjectId) -> Option<ObjectId> {
        let key = self.live_key(id)?;
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let name = self.store.object(id).map(|o| o.name.clone())?;
        let surface = self.surface.as_mut()?;
        let original = surface.get(key)?;

        let mut render = original.render.clone();
        render.geometry.translate(offset);
        let mut meta = ObjectMeta::from_properties(&original.properties);
        let new_id = ObjectId::generate();
        meta.id = Some(new_id.clone());
        meta.name = Some(format!("{} copy", name));

        let clone = surface.add(render, meta.to_properties());
        surface.set_active(vec![clone]);
        self.process_events();
        Some(new_id)
    }

    pub fn rename_object(&mut self, id: &ObjectId, name: &str) {
        self.update_meta(id, |meta| meta.name = Some(name.to_string()));
    }

    pub fn toggle_component(&mut self, id: &ObjectId) {
        self.update_meta(id, |meta| meta.is_component = !meta.is_component);
    }

    fn update_meta(&mut self, id: &ObjectId, update: impl FnOnce(&mut ObjectMeta)) {
        let Some(key) = self.live_key(id) else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Some(object) = surface.get_mut(key) {
            let mut meta = ObjectMeta::from_properties(&object.properties);
            update(&mut meta);
            meta.write_to(&mut object.properties);
            surface.commit(key);
        }
        self.process_events();
    }

    pub fn bring_to_front(&mut self, id: &ObjectId) {
        self.reorder(id, true);
    }

    pub fn send_to_back(&mut self, id: &ObjectId) {
        self.reorder(id, false);
    }

    fn reorder(&mut self, id: &ObjectId, front: bool) {
        let Some(key) = self.live_key(id) else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let moved = if front {
            surface.bring_to_front(key)
        } else {
            surface.send_to_back(key)
        };
        if moved {
            self.structural_change();
        }
    }

    /// Layer panel drop. Returns false when the drop was rejected.
    pub fn reparent(
        &mut self,
        source: &ObjectId,
        target: &ObjectId,
        position: DropPosition,
    ) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let moved = layers::reparent(surface, self.store.objects(), source, target, position);
        if moved {
            self.process_events_as_one_edit();
        }
        moved
    }

    /// Editable properties of the single selected object.
    pub fn selected_properties(&self) -> Option<ObjectProperties> {
        let [id] = self.store.selected_ids() else {
            return None;
        };
        let key = self.store.key_of(id)?;
        let object = self.surface.as_ref()?.get(key)?;
        Some(ObjectProperties::of(&object.render))
    }

    /// Apply a properties panel edit to the single selected object and
    /// commit it. Returns false when nothing changed.
    pub fn update_property(&mut self, update: PropertyUpdate) -> bool {
        let [id] = self.store.selected_ids() else {
            return false;
        };
        let Some(key) = self.store.key_of(id) else {
            return false;
        };
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        let changed = surface
            .get_mut(key)
            .is_some_and(|object| update.apply(&mut object.render));
        if changed {
            surface.commit(key);
            self.process_events();
        }
        changed
    }

    pub fn toggle_left_sidebar(&mut self) {
        self.store.toggle_left_sidebar();
    }

    pub fn toggle_right_panel(&mut self) {
        self.store.toggle_right_panel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::shapes::{Geometry, Rectangle, RenderObject, Shape, ShapeStyle};
    use crate::storage::MemoryDocumentStore;
    use crate::surface::MemorySurface;
    use pollster::block_on;
    use std::sync::Arc;

    fn controller() -> CanvasController<MemorySurface> {
        let mut controller = CanvasController::new(
            "doc",
            MemorySurface::new(),
            Arc::new(MemoryDocumentStore::new()),
            EditorConfig::default(),
        );
        block_on(controller.restore());
        controller
    }

    fn add(controller: &mut CanvasController<MemorySurface>, meta: ObjectMeta) {
        let render = RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(10.0, 10.0, 100.0, 50.0),
            ShapeStyle::default(),
        );
        controller
            .surface_mut()
            .unwrap()
            .add(render, meta.to_properties());
        controller.process_events();
    }

    fn id(s: &str) -> ObjectId {
        ObjectId::from(s)
    }

    #[test]
    fn test_zoom_buttons_clamp() {
        let mut controller = controller();
        controller.zoom_in();
        assert!((controller.store().zoom() - 1.2).abs() < f64::EPSILON);
        controller.zoom_to(100.0);
        assert!((controller.store().zoom() - 20.0).abs() < f64::EPSILON);
        controller.zoom_to(0.0);
        assert!((controller.store().zoom() - 0.1).abs() < f64::EPSILON);
        controller.reset_zoom();
        assert!((controller.surface().unwrap().zoom() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hand_tool_locks_objects() {
        let mut controller = controller();
        add(&mut controller, ObjectMeta::new(id("a"), "A"));
        controller.set_tool(ToolKind::Hand);
        assert!(controller.store().objects()[0].locked);
        assert!(!controller.surface().unwrap().selection_enabled());
        controller.set_tool(ToolKind::Select);
        assert!(!controller.store().objects()[0].locked);
    }

    #[test]
    fn test_duplicate_offsets_and_renames() {
        let mut controller = controller();
        add(&mut controller, ObjectMeta::new(id("a"), "Box"));
        let copy = controller.duplicate_object(&id("a")).unwrap();
        let object = controller.store().object(&copy).unwrap();
        assert_eq!(object.name, "Box copy");
        assert_eq!(object.bounds.origin(), Point::new(30.0, 30.0));
        assert_eq!(controller.store().selected_ids(), &[copy]);
    }

    #[test]
    fn test_rename_and_component_are_undoable() {
        let mut controller = controller();
        add(&mut controller, ObjectMeta::new(id("a"), "A"));
        controller.rename_object(&id("a"), "Header");
        controller.toggle_component(&id("a"));
        let object = controller.store().object(&id("a")).unwrap();
        assert_eq!(object.name, "Header");
        assert!(object.is_component);

        block_on(controller.undo());
        block_on(controller.undo());
        assert_eq!(controller.store().object(&id("a")).unwrap().name, "A");
    }

    #[test]
    fn test_visibility_and_ordering() {
        let mut controller = controller();
        add(&mut controller, ObjectMeta::new(id("a"), "A"));
        add(&mut controller, ObjectMeta::new(id("b"), "B"));
        controller.toggle_visibility(&id("a"));
        assert!(!controller.store().object(&id("a")).unwrap().visible);

        controller.bring_to_front(&id("a"));
        assert_eq!(controller.store().objects()[1].id, id("a"));
        controller.send_to_back(&id("a"));
        assert_eq!(controller.store().objects()[0].id, id("a"));
    }

    #[test]
    fn test_property_update_on_single_selection() {
        let mut controller = controller();
        add(&mut controller, ObjectMeta::new(id("a"), "A"));
        assert!(controller.selected_properties().is_none());

        controller.select_object(&id("a"));
        let properties = controller.selected_properties().unwrap();
        assert!((properties.width - 100.0).abs() < f64::EPSILON);

        let before = controller.history().len();
        assert!(controller.update_property(PropertyUpdate::Width(200.0)));
        let properties = controller.selected_properties().unwrap();
        assert!((properties.width - 200.0).abs() < 1e-9);
        assert_eq!(controller.history().len(), before + 1);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut controller = controller();
        controller.delete_object(&id("ghost"));
        controller.toggle_visibility(&id("ghost"));
        assert!(controller.duplicate_object(&id("ghost")).is_none());
        assert!(!controller.reparent(&id("ghost"), &id("other"), DropPosition::Inside));
        assert_eq!(controller.history().len(), 1);
    }
}
