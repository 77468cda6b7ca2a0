//! Open documents as tabs, with one mounted canvas controller at a time.

use crate::config::EditorConfig;
use crate::controller::CanvasController;
use crate::scene::next_available_name;
use crate::storage::{
    DocumentMeta, DocumentStore, Instant, LAST_ACTIVE_CANVAS_KEY, LEFT_SIDEBAR_OPEN_KEY,
    Preferences, RIGHT_PANEL_OPEN_KEY, StorageError, StorageResult, get_preference_or,
    set_preference_value,
};
use crate::surface::Surface;
use serde::Serialize;
use std::sync::Arc;

const UNTITLED: &str = "Untitled";

/// One open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub name: String,
    /// Changed since it was opened.
    pub edited: bool,
}

impl From<DocumentMeta> for Tab {
    fn from(meta: DocumentMeta) -> Self {
        Self {
            id: meta.id,
            name: meta.name,
            edited: false,
        }
    }
}

/// Tab list plus the controller of the active tab.
///
/// Switching tabs unmounts the current controller, awaiting its final
/// save, before the next controller restores. The two never overlap.
pub struct TabManager<S: Surface> {
    documents: Arc<dyn DocumentStore>,
    preferences: Arc<dyn Preferences>,
    config: EditorConfig,
    make_surface: Box<dyn Fn() -> S>,
    tabs: Vec<Tab>,
    active_id: Option<String>,
    controller: Option<CanvasController<S>>,
}

impl<S: Surface> std::fmt::Debug for TabManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabManager")
            .field("tabs", &self.tabs)
            .field("active_id", &self.active_id)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> TabManager<S> {
    /// `make_surface` builds a fresh surface for every mount.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        preferences: Arc<dyn Preferences>,
        config: EditorConfig,
        make_surface: impl Fn() -> S + 'static,
    ) -> Self {
        Self {
            documents,
            preferences,
            config,
            make_surface: Box::new(make_surface),
            tabs: Vec::new(),
            active_id: None,
            controller: None,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn controller(&self) -> Option<&CanvasController<S>> {
        self.controller.as_ref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut CanvasController<S>> {
        self.controller.as_mut()
    }

    /// Open every stored document as a tab and mount the last active one.
    /// Creates `"Untitled 1"` when the store is empty.
    pub async fn open_or_create(&mut self) -> StorageResult<()> {
        let mut documents = self.documents.list_documents().await?;
        if documents.is_empty() {
            let name = next_available_name(UNTITLED, std::iter::empty());
            documents.push(self.documents.create_document(&name).await?);
        }
        self.tabs = documents.into_iter().map(Tab::from).collect();

        let last: Option<String> =
            get_preference_or(&*self.preferences, LAST_ACTIVE_CANVAS_KEY, None).await;
        let target = last
            .filter(|id| self.tab(id).is_some())
            .or_else(|| self.tabs.first().map(|t| t.id.clone()));
        if let Some(id) = target {
            self.mount(&id).await;
        }
        log::info!("Opened {} tab(s)", self.tabs.len());
        Ok(())
    }

    /// Create an empty document named `"Untitled N"` and switch to it.
    pub async fn new_tab(&mut self) -> StorageResult<String> {
        let name = next_available_name(UNTITLED, self.tabs.iter().map(|t| t.name.as_str()));
        let meta = self.documents.create_document(&name).await?;
        let id = meta.id.clone();
        self.tabs.push(Tab::from(meta));
        self.switch_to(&id).await?;
        Ok(id)
    }

    /// Copy a tab's saved state into a new `"{name} copy"` document and
    /// switch to it.
    pub async fn duplicate_tab(&mut self, id: &str) -> StorageResult<String> {
        let source = self
            .tab(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if self.active_id.as_deref() == Some(id) {
            if let Some(controller) = self.controller.as_ref() {
                controller.save().await?;
            }
        }

        let state = self.documents.get_canvas_state(id).await?;
        let meta = self
            .documents
            .create_document(&format!("{} copy", source.name))
            .await?;
        if let Some(state) = state {
            self.documents.save_canvas_state(&meta.id, &state).await?;
        }
        let new_id = meta.id.clone();
        self.tabs.push(Tab::from(meta));
        self.switch_to(&new_id).await?;
        Ok(new_id)
    }

    /// Close a tab without deleting its document.
    ///
    /// At least one tab stays open: closing the last one opens a new
    /// untitled tab. Closing the active tab activates the last remaining.
    pub async fn close_tab(&mut self, id: &str) -> StorageResult<()> {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return Ok(());
        };
        let was_active = self.active_id.as_deref() == Some(id);
        if was_active {
            self.unmount_active().await;
        }
        self.tabs.remove(index);

        if self.tabs.is_empty() {
            let name = next_available_name(UNTITLED, std::iter::empty());
            let meta = self.documents.create_document(&name).await?;
            self.tabs.push(Tab::from(meta));
        }
        if was_active {
            if let Some(next) = self.tabs.last().map(|t| t.id.clone()) {
                self.mount(&next).await;
            }
        }
        Ok(())
    }

    /// Close the tab and delete its document from storage.
    pub async fn delete_document(&mut self, id: &str) -> StorageResult<()> {
        self.close_tab(id).await?;
        self.documents.delete_document(id).await
    }

    /// Make a tab active. The current controller is unmounted, and its
    /// final save awaited, before the next one restores.
    pub async fn switch_to(&mut self, id: &str) -> StorageResult<()> {
        if self.tab(id).is_none() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if self.active_id.as_deref() == Some(id) && self.controller.is_some() {
            return Ok(());
        }
        self.unmount_active().await;
        self.mount(id).await;
        Ok(())
    }

    pub async fn rename_tab(&mut self, id: &str, name: &str) -> StorageResult<()> {
        self.documents.rename_document(id, name).await?;
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.name = name.to_string();
        }
        Ok(())
    }

    pub fn mark_edited(&mut self, id: &str) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.edited = true;
        }
    }

    /// Toggle the layer sidebar and remember the choice.
    pub async fn toggle_left_sidebar(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        controller.toggle_left_sidebar();
        let open = controller.store().left_sidebar_open();
        self.remember(LEFT_SIDEBAR_OPEN_KEY, open).await;
    }

    /// Toggle the properties panel and remember the choice.
    pub async fn toggle_right_panel(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        controller.toggle_right_panel();
        let open = controller.store().right_panel_open();
        self.remember(RIGHT_PANEL_OPEN_KEY, open).await;
    }

    /// Forward to the active controller's debounced save. A save marks
    /// the tab edited.
    pub async fn poll_autosave(&mut self, now: Instant) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };
        let saved = controller.poll_autosave(now).await;
        if saved {
            let id = controller.document_id().to_string();
            self.mark_edited(&id);
        }
        saved
    }

    /// Unmount the active controller, saving it.
    pub async fn shutdown(&mut self) {
        self.unmount_active().await;
    }

    async fn unmount_active(&mut self) {
        if let Some(controller) = self.controller.take() {
            log::debug!("Unmounting {}", controller.document_id());
            controller.unmount().await;
        }
        self.active_id = None;
    }

    async fn mount(&mut self, id: &str) {
        let mut controller = CanvasController::new(
            id,
            (self.make_surface)(),
            self.documents.clone(),
            self.config.clone(),
        );
        let left = get_preference_or(&*self.preferences, LEFT_SIDEBAR_OPEN_KEY, true).await;
        let right = get_preference_or(&*self.preferences, RIGHT_PANEL_OPEN_KEY, false).await;
        controller.store_mut().set_left_sidebar_open(left);
        controller.store_mut().set_right_panel_open(right);
        controller.restore().await;

        self.controller = Some(controller);
        self.active_id = Some(id.to_string());
        self.remember(LAST_ACTIVE_CANVAS_KEY, id).await;
    }

    async fn remember<T: Serialize>(&self, key: &str, value: T) {
        if let Err(e) = set_preference_value(&*self.preferences, key, value).await {
            log::warn!("Failed to store preference '{}': {}", key, e);
        }
    }
}
