//! In-memory document store.

use super::{
    BoxFuture, CanvasState, DocumentMeta, DocumentStore, StorageError, StorageResult, timestamp,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredDocument {
    meta: DocumentMeta,
    state: Option<CanvasState>,
}

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryDocumentStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sort_order(documents: &HashMap<String, StoredDocument>) -> u32 {
        documents
            .values()
            .map(|doc| doc.meta.sort_order + 1)
            .max()
            .unwrap_or(0)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<DocumentMeta>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            let mut metas: Vec<DocumentMeta> = docs.values().map(|d| d.meta.clone()).collect();
            metas.sort_by(|a, b| {
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            });
            Ok(metas)
        })
    }

    fn create_document(&self, name: &str) -> BoxFuture<'_, StorageResult<DocumentMeta>> {
        let name = name.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            let meta = DocumentMeta::new(name, Self::next_sort_order(&docs));
            docs.insert(
                meta.id.clone(),
                StoredDocument {
                    meta: meta.clone(),
                    state: Some(CanvasState::default()),
                },
            );
            Ok(meta)
        })
    }

    fn rename_document(&self, id: &str, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let name = name.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            let doc = docs.get_mut(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            doc.meta.name = name;
            doc.meta.updated_at = timestamp();
            Ok(())
        })
    }

    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&id);
            Ok(())
        })
    }

    fn get_canvas_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasState>>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.get(&id).and_then(|doc| doc.state.clone()))
        })
    }

    fn save_canvas_state(
        &self,
        id: &str,
        state: &CanvasState,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let state = state.clone();
        Box::pin(async move {
            serde_json::from_str::<serde_json::Value>(&state.json).map_err(|e| {
                StorageError::Serialization(format!("Invalid canvas JSON: {}", e))
            })?;
            let mut docs = self.documents.write().map_err(lock_error)?;
            match docs.get_mut(&id) {
                Some(doc) => {
                    doc.state = Some(state);
                    doc.meta.updated_at = timestamp();
                }
                None => {
                    let mut meta = DocumentMeta::new("Untitled", Self::next_sort_order(&docs));
                    meta.id = id.clone();
                    docs.insert(
                        id,
                        StoredDocument {
                            meta,
                            state: Some(state),
                        },
                    );
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_create_list_in_order() {
        let store = MemoryDocumentStore::new();
        let a = block_on(store.create_document("A")).unwrap();
        let b = block_on(store.create_document("B")).unwrap();
        let list = block_on(store.list_documents()).unwrap();
        assert_eq!(list, vec![a.clone(), b.clone()]);
        assert_eq!((a.sort_order, b.sort_order), (0, 1));
    }

    #[test]
    fn test_new_document_has_empty_state() {
        let store = MemoryDocumentStore::new();
        let meta = block_on(store.create_document("A")).unwrap();
        let state = block_on(store.get_canvas_state(&meta.id)).unwrap();
        assert_eq!(state, Some(CanvasState::default()));
        assert_eq!(block_on(store.get_canvas_state("missing")).unwrap(), None);
    }

    #[test]
    fn test_save_and_rename() {
        let store = MemoryDocumentStore::new();
        let meta = block_on(store.create_document("A")).unwrap();
        let state = CanvasState {
            zoom: 3.0,
            ..CanvasState::default()
        };
        block_on(store.save_canvas_state(&meta.id, &state)).unwrap();
        block_on(store.rename_document(&meta.id, "Renamed")).unwrap();

        assert_eq!(block_on(store.get_canvas_state(&meta.id)).unwrap(), Some(state));
        assert_eq!(block_on(store.list_documents()).unwrap()[0].name, "Renamed");
        assert!(matches!(
            block_on(store.rename_document("missing", "x")),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_malformed_state_is_rejected() {
        let store = MemoryDocumentStore::new();
        let meta = block_on(store.create_document("A")).unwrap();
        let bad = CanvasState {
            json: "not json".into(),
            ..CanvasState::default()
        };
        assert!(block_on(store.save_canvas_state(&meta.id, &bad)).is_err());
        assert_eq!(
            block_on(store.get_canvas_state(&meta.id)).unwrap(),
            Some(CanvasState::default())
        );
    }

    #[test]
    fn test_delete() {
        let store = MemoryDocumentStore::new();
        let meta = block_on(store.create_document("A")).unwrap();
        block_on(store.delete_document(&meta.id)).unwrap();
        block_on(store.delete_document(&meta.id)).unwrap();
        assert!(block_on(store.list_documents()).unwrap().is_empty());
    }
}
