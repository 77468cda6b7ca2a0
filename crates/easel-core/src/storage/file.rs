//! File-based document store for native platforms.

use super::{
    BoxFuture, CanvasState, DocumentMeta, DocumentStore, EASEL_EXTENSION, EaselFile,
    StorageError, StorageResult, timestamp,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const INDEX_FILE: &str = "index.json";

/// File-based storage for native platforms.
///
/// Each document is one `.easel` file named after its id. `index.json`
/// keeps names and sort order; `.easel` files missing from the index are
/// picked up on the next listing.
#[derive(Debug)]
pub struct FileDocumentStore {
    /// Base directory for document storage.
    base_path: PathBuf,
    /// Serializes index read-modify-write cycles.
    index_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            index_lock: Mutex::new(()),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/easel/canvases/`
    /// On Windows: `%LOCALAPPDATA%\easel\canvases\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("easel").join("canvases"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a document id.
    pub fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.{}", safe_id, EASEL_EXTENSION))
    }

    fn index_path(&self) -> PathBuf {
        self.base_path.join(INDEX_FILE)
    }

    fn read_index(&self) -> StorageResult<Vec<DocumentMeta>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write_index(&self, index: &[DocumentMeta]) -> StorageResult<()> {
        let path = self.index_path();
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write index: {}", e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| StorageError::Io(format!("Failed to rename index: {}", e)))
    }

    /// Run `f` on the index under the lock, writing it back afterwards.
    fn update_index<T>(
        &self,
        f: impl FnOnce(&mut Vec<DocumentMeta>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let _guard = self
            .index_lock
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        let mut index = self.read_index()?;
        let result = f(&mut index)?;
        self.write_index(&index)?;
        Ok(result)
    }

    fn next_sort_order(index: &[DocumentMeta]) -> u32 {
        index.iter().map(|m| m.sort_order + 1).max().unwrap_or(0)
    }

    /// Add `.easel` files that are not in the index yet.
    fn reconcile(&self, index: &mut Vec<DocumentMeta>) -> StorageResult<()> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;
        let mut found: Vec<(String, PathBuf)> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(EASEL_EXTENSION))
            .filter_map(|path| {
                let id = path.file_stem()?.to_str()?.to_string();
                Some((id, path))
            })
            .filter(|(id, _)| !id.is_empty() && !index.iter().any(|m| &m.id == id))
            .collect();
        found.sort();

        for (id, path) in found {
            match EaselFile::load(&path) {
                Ok(file) => {
                    log::info!("Indexed untracked document {}", path.display());
                    index.push(DocumentMeta {
                        id,
                        name: file.name,
                        sort_order: Self::next_sort_order(index),
                        created_at: file.created_at,
                        updated_at: file.updated_at,
                    });
                }
                Err(e) => log::warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    /// Copy an external `.easel` file into the store as a new document.
    pub fn import_file(&self, source: &Path) -> StorageResult<DocumentMeta> {
        if !source.exists() {
            return Err(StorageError::NotFound(source.display().to_string()));
        }
        let file = EaselFile::load(source)?;
        self.update_index(|index| {
            let meta = DocumentMeta::new(file.name.clone(), Self::next_sort_order(index));
            file.save(&self.document_path(&meta.id))?;
            index.push(meta.clone());
            Ok(meta)
        })
    }

    /// Write a document's `.easel` file to `dest`.
    pub fn export_file(&self, id: &str, dest: &Path) -> StorageResult<()> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        EaselFile::load(&path)?.save(dest)
    }
}

impl DocumentStore for FileDocumentStore {
    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<DocumentMeta>>> {
        Box::pin(async move {
            let mut index = self.update_index(|index| {
                self.reconcile(index)?;
                Ok(index.clone())
            })?;
            index.sort_by_key(|m| m.sort_order);
            Ok(index)
        })
    }

    fn create_document(&self, name: &str) -> BoxFuture<'_, StorageResult<DocumentMeta>> {
        let name = name.to_string();
        Box::pin(async move {
            self.update_index(|index| {
                let meta = DocumentMeta::new(name.clone(), Self::next_sort_order(index));
                EaselFile::new(&name).save(&self.document_path(&meta.id))?;
                index.push(meta.clone());
                Ok(meta)
            })
        })
    }

    fn rename_document(&self, id: &str, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let name = name.to_string();
        Box::pin(async move {
            let path = self.document_path(&id);
            self.update_index(|index| {
                let meta = index
                    .iter_mut()
                    .find(|m| m.id == id)
                    .ok_or_else(|| StorageError::NotFound(id.clone()))?;
                meta.name = name.clone();
                meta.updated_at = timestamp();
                Ok(())
            })?;
            if path.exists() {
                let mut file = EaselFile::load(&path)?;
                file.name = name;
                file.save(&path)?;
            }
            Ok(())
        })
    }

    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.update_index(|index| {
                index.retain(|m| m.id != id);
                Ok(())
            })?;
            let path = self.document_path(&id);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn get_canvas_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasState>>> {
        let path = self.document_path(id);
        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            EaselFile::load(&path)?.canvas_state().map(Some)
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
            let path = self.document_path(&id);
            let mut file = if path.exists() {
                EaselFile::load(&path)?
            } else {
                let name = self
                    .read_index()?
                    .into_iter()
                    .find(|m| m.id == id)
                    .map(|m| m.name)
                    .unwrap_or_else(|| "Untitled".to_string());
                EaselFile::new(&name)
            };
            file.apply_state(&state)?;
            file.save(&path)?;

            let updated_at = file.updated_at.clone();
            self.update_index(|index| {
                if let Some(meta) = index.iter_mut().find(|m| m.id == id) {
                    meta.updated_at = updated_at;
                }
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_create_writes_file_and_index() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let meta = block_on(store.create_document("Untitled 1")).unwrap();

        assert!(store.document_path(&meta.id).exists());
        assert!(dir.path().join(INDEX_FILE).exists());
        let list = block_on(store.list_documents()).unwrap();
        assert_eq!(list, vec![meta.clone()]);
        assert_eq!(
            block_on(store.get_canvas_state(&meta.id)).unwrap(),
            Some(CanvasState::default())
        );
    }

    #[test]
    fn test_save_and_reload_state() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let meta = block_on(store.create_document("Doc")).unwrap();
        let state = CanvasState {
            json: r#"{"version":"7.0.0","objects":[]}"#.into(),
            zoom: 0.5,
            viewport_transform: [0.5, 0.0, 0.0, 0.5, 3.0, 4.0],
        };
        block_on(store.save_canvas_state(&meta.id, &state)).unwrap();

        let reopened = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(reopened.get_canvas_state(&meta.id)).unwrap(), Some(state));
    }

    #[test]
    fn test_missing_state_is_none() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(store.get_canvas_state("nope")).unwrap(), None);
    }

    #[test]
    fn test_rename_updates_file() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let meta = block_on(store.create_document("Old")).unwrap();
        block_on(store.rename_document(&meta.id, "New")).unwrap();

        assert_eq!(block_on(store.list_documents()).unwrap()[0].name, "New");
        let file = EaselFile::load(&store.document_path(&meta.id)).unwrap();
        assert_eq!(file.name, "New");
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let meta = block_on(store.create_document("Doc")).unwrap();
        block_on(store.delete_document(&meta.id)).unwrap();
        assert!(!store.document_path(&meta.id).exists());
        assert!(block_on(store.list_documents()).unwrap().is_empty());
    }

    #[test]
    fn test_untracked_files_are_indexed() {
        let dir = tempdir().unwrap();
        EaselFile::new("Dropped in")
            .save(&dir.path().join("manual-id.easel"))
            .unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let list = block_on(store.list_documents()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "manual-id");
        assert_eq!(list[0].name, "Dropped in");
    }

    #[test]
    fn test_import_and_export() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let source = outside.path().join("shared.easel");
        EaselFile::new("Shared").save(&source).unwrap();

        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let meta = store.import_file(&source).unwrap();
        assert_eq!(meta.name, "Shared");

        let dest = outside.path().join("copy.easel");
        store.export_file(&meta.id, &dest).unwrap();
        assert_eq!(EaselFile::load(&dest).unwrap().name, "Shared");
        assert!(matches!(
            store.import_file(&outside.path().join("missing.easel")),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().to_path_buf()).unwrap();
        let path = store.document_path("a/b:c*d");
        assert_eq!(path.file_name().unwrap(), "a_b_c_d.easel");
    }
}
