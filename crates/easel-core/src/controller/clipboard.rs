//! Copy, cut and paste of the active objects.

use super::CanvasController;
use crate::scene::{ObjectId, ObjectMeta};
use crate::shapes::RenderObject;
use crate::surface::{Surface, SurfaceKey};
use kurbo::Vec2;
use std::collections::HashMap;

/// One copied object: its renderable and its custom fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub render: RenderObject,
    pub meta: ObjectMeta,
}

impl<S: Surface> CanvasController<S> {
    pub fn clipboard(&self) -> &[ClipboardEntry] {
        &self.clipboard
    }

    /// Copy the active objects in z-order. Returns how many were copied.
    pub fn copy(&mut self) -> usize {
        if self.is_editing_text() {
            return 0;
        }
        let Some(surface) = self.surface.as_ref() else {
            return 0;
        };
        let active = surface.active_keys();
        if active.is_empty() {
            return 0;
        }
        self.clipboard = surface
            .objects()
            .iter()
            .filter(|o| active.contains(&o.key))
            .map(|o| ClipboardEntry {
                render: o.render.clone(),
                meta: ObjectMeta::from_properties(&o.properties),
            })
            .collect();
        log::debug!("Copied {} object(s)", self.clipboard.len());
        self.clipboard.len()
    }

    /// Copy, then remove the active objects and clear the selection.
    ///
    /// Children of removed frames are promoted to the top level.
    pub fn cut(&mut self) -> usize {
        let copied = self.copy();
        if copied == 0 {
            return 0;
        }
        let Some(surface) = self.surface.as_ref() else {
            return 0;
        };
        let keys = surface.active_keys().to_vec();
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
        copied
    }

    /// Add offset clones of the clipboard with fresh ids and select them.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        if self.is_editing_text() || self.clipboard.is_empty() {
            return Vec::new();
        }
        let Some(surface) = self.surface.as_mut() else {
            return Vec::new();
        };
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let fresh: HashMap<ObjectId, ObjectId> = self
            .clipboard
            .iter()
            .filter_map(|entry| entry.meta.id.clone())
            .map(|id| (id, ObjectId::generate()))
            .collect();
        let mut keys: Vec<SurfaceKey> = Vec::with_capacity(self.clipboard.len());
        let mut ids = Vec::with_capacity(self.clipboard.len());
        for entry in &self.clipboard {
            let mut render = entry.render.clone();
            render.geometry.translate(offset);
            let mut meta = entry.meta.clone();
            let id = meta
                .id
                .as_ref()
                .and_then(|id| fresh.get(id).cloned())
                .unwrap_or_else(ObjectId::generate);
            meta.id = Some(id.clone());
            // Pasted children follow their pasted frame; parents that are
            // neither pasted nor live are dropped.
            meta.parent_id = meta.parent_id.and_then(|parent| match fresh.get(&parent) {
                Some(copy) => Some(copy.clone()),
                None => self.store.object(&parent).is_some().then_some(parent),
            });
            keys.push(surface.add(render, meta.to_properties()));
            ids.push(id);
        }
        surface.set_active(keys);
        self.process_events_as_one_edit();
        ids
    }
}
