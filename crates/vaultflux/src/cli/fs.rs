//! Filesystem-backed implementations of the core storage traits.
//!
//! The destination directory mirrors the store shape: folders and
//! entries become directories, pages become `.md` (or `.html` after
//! conversion) files inside their entry directory. Ids are indices
//! into interning tables guarded by an `RwLock`, so the store can be
//! shared across the concurrent conversion pass.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use vaultflux_core::error::{FluxError, Result};
use vaultflux_core::media::{MediaStorage, StorageBackend, UploadOptions, UploadedAsset};
use vaultflux_core::permission::PermissionLevel;
use vaultflux_core::store::{
    BoxFuture, DocumentStore, EntryId, FolderId, PageFormat, PageId,
};

/// Sidecar file an explicit entry permission is recorded in.
const PERMISSION_FILE: &str = ".permission.json";

#[derive(Default)]
struct FsState {
    folders: Vec<PathBuf>,
    entries: Vec<PathBuf>,
    pages: Vec<PathBuf>,
}

/// Document store rooted at a destination directory.
pub struct FsDocumentStore {
    root: PathBuf,
    state: RwLock<FsState>,
}

impl FsDocumentStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<FsDocumentStore> {
        fs::create_dir_all(root)?;
        Ok(FsDocumentStore {
            root: root.to_path_buf(),
            state: RwLock::new(FsState::default()),
        })
    }

    fn folder_dir(&self, state: &FsState, folder: Option<FolderId>) -> Result<PathBuf> {
        match folder {
            None => Ok(self.root.clone()),
            Some(id) => state
                .folders
                .get(id.0 as usize)
                .cloned()
                .ok_or(FluxError::UnknownFolder(id.0)),
        }
    }

    fn entry_dir(&self, state: &FsState, entry: EntryId) -> Result<PathBuf> {
        state
            .entries
            .get(entry.0 as usize)
            .cloned()
            .ok_or(FluxError::UnknownEntry(entry.0))
    }

    fn page_path(&self, state: &FsState, page: PageId) -> Result<PathBuf> {
        state
            .pages
            .get(page.0 as usize)
            .cloned()
            .ok_or(FluxError::UnknownPage(page.0))
    }

    fn intern_folder(state: &mut FsState, dir: PathBuf) -> FolderId {
        match state.folders.iter().position(|p| *p == dir) {
            Some(idx) => FolderId(idx as u64),
            None => {
                state.folders.push(dir);
                FolderId((state.folders.len() - 1) as u64)
            }
        }
    }

    fn intern_entry(state: &mut FsState, dir: PathBuf) -> EntryId {
        match state.entries.iter().position(|p| *p == dir) {
            Some(idx) => EntryId(idx as u64),
            None => {
                state.entries.push(dir);
                EntryId((state.entries.len() - 1) as u64)
            }
        }
    }
}

impl DocumentStore for FsDocumentStore {
    fn find_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<FolderId>>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let dir = self.folder_dir(&state, parent)?.join(name);
            if dir.is_dir() {
                Ok(Some(Self::intern_folder(&mut state, dir)))
            } else {
                Ok(None)
            }
        })
    }

    fn create_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<FolderId>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let dir = self.folder_dir(&state, parent)?.join(name);
            fs::create_dir_all(&dir)?;
            Ok(Self::intern_folder(&mut state, dir))
        })
    }

    fn find_entry<'a>(
        &'a self,
        name: &'a str,
        folder: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<EntryId>>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let dir = self.folder_dir(&state, folder)?.join(name);
            // Only directories this store created count as entries;
            // a plain subdirectory of the same name is a folder.
            if state.entries.contains(&dir) {
                Ok(Some(Self::intern_entry(&mut state, dir)))
            } else {
                Ok(None)
            }
        })
    }

    fn create_entry<'a>(
        &'a self,
        name: &'a str,
        folder: Option<FolderId>,
        permission: Option<PermissionLevel>,
    ) -> BoxFuture<'a, Result<EntryId>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let dir = self.folder_dir(&state, folder)?.join(name);
            fs::create_dir_all(&dir)?;
            if let Some(level) = permission {
                let encoded = serde_json::to_string(&level)?;
                fs::write(dir.join(PERMISSION_FILE), encoded)?;
            }
            Ok(Self::intern_entry(&mut state, dir))
        })
    }

    fn find_page<'a>(
        &'a self,
        entry: EntryId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<PageId>>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            let dir = self.entry_dir(&state, entry)?;
            let path = dir.join(format!("{name}.md"));
            match state.pages.iter().position(|p| *p == path) {
                Some(idx) => Ok(Some(PageId(idx as u64))),
                None => Ok(None),
            }
        })
    }

    fn create_page<'a>(
        &'a self,
        name: &'a str,
        body: &'a str,
        entry: EntryId,
    ) -> BoxFuture<'a, Result<PageId>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let path = self.entry_dir(&state, entry)?.join(format!("{name}.md"));
            fs::write(&path, body)?;
            state.pages.push(path);
            Ok(PageId((state.pages.len() - 1) as u64))
        })
    }

    fn update_page<'a>(&'a self, page: PageId, body: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            let path = self.page_path(&state, page)?;
            fs::write(path, body)?;
            Ok(())
        })
    }

    fn page_body(&self, page: PageId) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            let path = self.page_path(&state, page)?;
            Ok(fs::read_to_string(path)?)
        })
    }

    fn set_page_format<'a>(
        &'a self,
        page: PageId,
        format: PageFormat,
        body: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let path = self.page_path(&state, page)?;
            let extension = match format {
                PageFormat::Markdown => "md",
                PageFormat::Html => "html",
            };
            let renamed = path.with_extension(extension);
            fs::write(&renamed, body)?;
            if renamed != path {
                fs::remove_file(&path)?;
                state.pages[page.0 as usize] = renamed;
            }
            Ok(())
        })
    }

    fn page_link(&self, page: PageId, label: &str) -> String {
        let state = self.state.read().unwrap();
        let target = match state.pages.get(page.0 as usize) {
            Some(path) => path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/"),
            None => String::new(),
        };
        format!("[{label}]({target})")
    }
}

/// Media storage that writes assets under the destination directory.
/// Only the local backend is available from the command line.
pub struct FsMediaStorage {
    root: PathBuf,
}

impl FsMediaStorage {
    /// Storage rooted at the destination directory.
    pub fn new(root: &Path) -> FsMediaStorage {
        FsMediaStorage {
            root: root.to_path_buf(),
        }
    }

    fn require_local(backend: StorageBackend) -> Result<()> {
        match backend {
            StorageBackend::Local => Ok(()),
            StorageBackend::Remote => Err(FluxError::Storage(
                "remote storage is not available from the command line".to_string(),
            )),
        }
    }
}

impl MediaStorage for FsMediaStorage {
    fn probe<'a>(&'a self, backend: StorageBackend, dir: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            Self::require_local(backend)?;
            if self.root.join(dir).is_dir() {
                Ok(())
            } else {
                Err(FluxError::StorageLookup(dir.to_string()))
            }
        })
    }

    fn ensure_directory<'a>(
        &'a self,
        backend: StorageBackend,
        dir: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            Self::require_local(backend)?;
            fs::create_dir_all(self.root.join(dir))?;
            Ok(())
        })
    }

    fn upload<'a>(
        &'a self,
        backend: StorageBackend,
        dir: &'a str,
        name: &'a str,
        data: &'a [u8],
        _options: &'a UploadOptions,
    ) -> BoxFuture<'a, Result<UploadedAsset>> {
        Box::pin(async move {
            Self::require_local(backend)?;
            fs::write(self.root.join(dir).join(name), data)?;
            Ok(UploadedAsset {
                path: format!("{}/{}", dir.trim_end_matches('/'), name),
            })
        })
    }
}

/// Settings persistence as one JSON file per scope in the user's
/// config directory.
pub struct FsSettingsStore {
    dir: PathBuf,
}

impl FsSettingsStore {
    /// Store under the platform config directory, falling back to the
    /// current directory when none is known.
    pub fn new() -> FsSettingsStore {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultflux");
        FsSettingsStore { dir }
    }

    fn scope_path(&self, scope: &str) -> PathBuf {
        self.dir.join(format!("{scope}.json"))
    }

    fn read_scope(&self, scope: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        let path = self.scope_path(scope);
        if !path.is_file() {
            return Ok(serde_json::Map::new());
        }
        let text = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        match value {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }
}

impl vaultflux_core::settings::SettingsStore for FsSettingsStore {
    fn save<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
        value: serde_json::Value,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut map = self.read_scope(scope)?;
            map.insert(key.to_string(), value);
            fs::create_dir_all(&self.dir)?;
            let encoded = serde_json::to_string_pretty(&serde_json::Value::Object(map))?;
            fs::write(self.scope_path(scope), encoded)?;
            Ok(())
        })
    }

    fn load<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>>> {
        Box::pin(async move {
            let map = self.read_scope(scope)?;
            Ok(map.get(key).cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    #[test]
    fn pages_live_inside_their_entry_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::open(tmp.path()).unwrap();
        block_on(async {
            let folder = store.create_folder("Guides", None).await.unwrap();
            let entry = store
                .create_entry("Note", Some(folder), Some(PermissionLevel::Observer))
                .await
                .unwrap();
            let page = store.create_page("Note", "body text", entry).await.unwrap();

            let on_disk = tmp.path().join("Guides").join("Note").join("Note.md");
            assert_eq!(fs::read_to_string(&on_disk).unwrap(), "body text");
            assert!(tmp
                .path()
                .join("Guides")
                .join("Note")
                .join(PERMISSION_FILE)
                .is_file());

            assert_eq!(
                store.find_page(entry, "Note").await.unwrap(),
                Some(page)
            );
            assert_eq!(
                store.page_link(page, "a note"),
                "[a note](Guides/Note/Note.md)"
            );
        });
    }

    #[test]
    fn plain_subdirectories_are_not_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::open(tmp.path()).unwrap();
        fs::create_dir_all(tmp.path().join("Guides")).unwrap();
        block_on(async {
            assert_eq!(store.find_entry("Guides", None).await.unwrap(), None);
            assert!(store.find_folder("Guides", None).await.unwrap().is_some());
        });
    }

    #[test]
    fn html_conversion_renames_the_page_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::open(tmp.path()).unwrap();
        block_on(async {
            let entry = store.create_entry("Note", None, None).await.unwrap();
            let page = store.create_page("Note", "body", entry).await.unwrap();
            store
                .set_page_format(page, PageFormat::Html, "<p>body</p>")
                .await
                .unwrap();

            let html = tmp.path().join("Note").join("Note.html");
            assert_eq!(fs::read_to_string(&html).unwrap(), "<p>body</p>");
            assert!(!tmp.path().join("Note").join("Note.md").exists());
            assert_eq!(store.page_body(page).await.unwrap(), "<p>body</p>");
        });
    }

    #[test]
    fn remote_uploads_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let media = FsMediaStorage::new(tmp.path());
        let err = block_on(media.probe(StorageBackend::Remote, "img")).unwrap_err();
        assert!(matches!(err, FluxError::Storage(_)));
    }
}
