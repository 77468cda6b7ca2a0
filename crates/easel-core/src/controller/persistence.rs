//! Restore on mount, debounced autosave and the final save on unmount.

use super::{CanvasController, display_zoom};
use crate::scene::CUSTOM_FIELDS;
use crate::storage::{CanvasState, Instant, StorageResult};
use crate::surface::Surface;
use kurbo::Affine;

impl<S: Surface> CanvasController<S> {
    /// Load the document's saved state into the surface.
    ///
    /// A malformed scene is logged and replaced by an empty canvas. When
    /// the load is done the baseline history snapshot is recorded and
    /// capture, autosave and the unmount save are re-enabled.
    pub async fn restore(&mut self) {
        let state = match self.documents.get_canvas_state(&self.document_id).await {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Failed to read saved state for {}: {}", self.document_id, e);
                None
            }
        };

        if let Some(state) = state {
            if let Some(surface) = self.surface.as_mut() {
                if let Err(e) = surface.load_from_json(&state.json).await {
                    log::warn!(
                        "Discarding malformed canvas state for {}: {}",
                        self.document_id,
                        e
                    );
                    surface.clear();
                }
                surface.set_viewport_transform(Affine::new(state.viewport_transform));
                if (surface.zoom() - state.zoom).abs() > f64::EPSILON {
                    surface.set_zoom(state.zoom);
                }
                self.store.set_zoom(display_zoom(surface.zoom()));
            }
        }

        self.process_events();
        self.sync();
        self.history.set_restoring(false);
        self.capture_snapshot();
        log::info!(
            "Restored {} with {} object(s)",
            self.document_id,
            self.store.objects().len()
        );
    }

    /// The scene, zoom and viewport as they should be persisted.
    pub fn canvas_state(&self) -> Option<CanvasState> {
        let surface = self.surface.as_ref()?;
        let json = match surface.to_json(&CUSTOM_FIELDS) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize {}: {}", self.document_id, e);
                return None;
            }
        };
        Some(CanvasState {
            json,
            zoom: surface.zoom(),
            viewport_transform: surface.viewport_transform().as_coeffs(),
        })
    }

    /// Persist the canvas now. Does nothing while a restore is pending,
    /// since the surface does not hold the real document yet.
    pub async fn save(&self) -> StorageResult<()> {
        if self.history.is_restoring() {
            log::debug!("Skipping save of {}: restore pending", self.document_id);
            return Ok(());
        }
        let Some(state) = self.canvas_state() else {
            return Ok(());
        };
        self.documents
            .save_canvas_state(&self.document_id, &state)
            .await
    }

    pub fn is_autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Run the debounced save if it is due at `now`. Returns true when a
    /// save was attempted.
    pub async fn poll_autosave(&mut self, now: Instant) -> bool {
        if !self.autosave.take_due(now) {
            return false;
        }
        if let Err(e) = self.save().await {
            log::error!("Autosave of {} failed: {}", self.document_id, e);
        }
        true
    }

    /// Tear the controller down: cancel the pending autosave, save one
    /// last time unless a restore is still in flight, and hand the
    /// surface back.
    pub async fn unmount(mut self) -> Option<S> {
        self.autosave.cancel();
        if let Err(e) = self.save().await {
            log::error!("Final save of {} failed: {}", self.document_id, e);
        }
        self.surface.take()
    }
}
