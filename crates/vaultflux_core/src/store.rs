//! Document store abstraction.
//!
//! The target store organizes content as folders containing named
//! entries, each entry containing named pages. The import pipeline only
//! ever talks to it through [`DocumentStore`], which is object-safe so
//! it can live behind `dyn DocumentStore`; all methods return boxed
//! futures and every call is awaited to completion before the next is
//! issued.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use crate::error::{FluxError, Result};
use crate::permission::PermissionLevel;

/// A boxed future for object-safe async methods. Futures are `Send` for
/// compatibility with multi-threaded runtimes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identifier of a store folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub u64);

/// Identifier of a store entry (a named container of pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub u64);

/// Identifier of a store page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub u64);

/// Body format of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    /// Markdown source, the format every page starts in.
    Markdown,
    /// Rendered rich text, set by the optional conversion pass.
    Html,
}

/// Async abstraction over the target document store.
///
/// Entries are uniquely identified by `(name, parent_folder)` and are
/// looked up before creation; folders likewise by `(name, parent)`.
/// Page names are not enforced unique within an entry - the dedupe
/// policy lives in the import pipeline, not the store.
pub trait DocumentStore: Send + Sync {
    /// Find a folder by name under `parent` (`None` = store root).
    fn find_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<FolderId>>>;

    /// Create a folder under `parent`.
    fn create_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<FolderId>>;

    /// Find an entry by name in `folder` (`None` = store root).
    fn find_entry<'a>(
        &'a self,
        name: &'a str,
        folder: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<EntryId>>>;

    /// Create an entry. `permission` of `None` inherits the store default.
    fn create_entry<'a>(
        &'a self,
        name: &'a str,
        folder: Option<FolderId>,
        permission: Option<PermissionLevel>,
    ) -> BoxFuture<'a, Result<EntryId>>;

    /// Find the first page named `name` in `entry`.
    fn find_page<'a>(
        &'a self,
        entry: EntryId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<PageId>>>;

    /// Create a page with a markdown body.
    fn create_page<'a>(
        &'a self,
        name: &'a str,
        body: &'a str,
        entry: EntryId,
    ) -> BoxFuture<'a, Result<PageId>>;

    /// Replace a page's body.
    fn update_page<'a>(&'a self, page: PageId, body: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Read a page's current body.
    fn page_body(&self, page: PageId) -> BoxFuture<'_, Result<String>>;

    /// Replace a page's body and switch its format.
    fn set_page_format<'a>(
        &'a self,
        page: PageId,
        format: PageFormat,
        body: &'a str,
    ) -> BoxFuture<'a, Result<()>>;

    /// Render the store-native link string for a page with the given
    /// display label. Pure formatting, no store access.
    fn page_link(&self, page: PageId, label: &str) -> String;
}

/// Find a folder by `(name, parent)` or create it. An empty name means
/// "no folder" and yields `None`.
pub async fn create_or_get_folder(
    store: &dyn DocumentStore,
    name: &str,
    parent: Option<FolderId>,
) -> Result<Option<FolderId>> {
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(id) = store.find_folder(name, parent).await? {
        return Ok(Some(id));
    }
    Ok(Some(store.create_folder(name, parent).await?))
}

// ============================================================================
// InMemoryStore - reference implementation for tests and embedding
// ============================================================================

/// A folder record in the in-memory store.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    /// Folder id.
    pub id: FolderId,
    /// Folder name, unique among siblings.
    pub name: String,
    /// Parent folder, `None` at the store root.
    pub parent: Option<FolderId>,
}

/// An entry record in the in-memory store.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Entry id.
    pub id: EntryId,
    /// Entry name.
    pub name: String,
    /// Containing folder, `None` at the store root.
    pub folder: Option<FolderId>,
    /// Explicit permission level; `None` inherits the store default.
    pub permission: Option<PermissionLevel>,
}

/// A page record in the in-memory store.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// Page id.
    pub id: PageId,
    /// Owning entry.
    pub entry: EntryId,
    /// Page name.
    pub name: String,
    /// Current body text.
    pub body: String,
    /// Current body format.
    pub format: PageFormat,
}

#[derive(Default)]
struct StoreState {
    folders: Vec<FolderRecord>,
    entries: Vec<EntryRecord>,
    pages: Vec<PageRecord>,
    next_id: u64,
}

impl StoreState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory document store. The reference implementation used by
/// the test suite; also useful for dry runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, in creation order.
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.state.read().unwrap().entries.clone()
    }

    /// Snapshot of all pages, in creation order.
    pub fn pages(&self) -> Vec<PageRecord> {
        self.state.read().unwrap().pages.clone()
    }

    /// Snapshot of all folders, in creation order.
    pub fn folders(&self) -> Vec<FolderRecord> {
        self.state.read().unwrap().folders.clone()
    }

    /// Look up a single page record.
    pub fn page(&self, id: PageId) -> Option<PageRecord> {
        let state = self.state.read().unwrap();
        state.pages.iter().find(|p| p.id == id).cloned()
    }

    /// Look up a single entry record.
    pub fn entry(&self, id: EntryId) -> Option<EntryRecord> {
        let state = self.state.read().unwrap();
        state.entries.iter().find(|e| e.id == id).cloned()
    }
}

impl DocumentStore for InMemoryStore {
    fn find_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<FolderId>>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            Ok(state
                .folders
                .iter()
                .find(|f| f.name == name && f.parent == parent)
                .map(|f| f.id))
        })
    }

    fn create_folder<'a>(
        &'a self,
        name: &'a str,
        parent: Option<FolderId>,
    ) -> BoxFuture<'a, Result<FolderId>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let id = FolderId(state.next_id());
            state.folders.push(FolderRecord {
                id,
                name: name.to_string(),
                parent,
            });
            Ok(id)
        })
    }

    fn find_entry<'a>(
        &'a self,
        name: &'a str,
        folder: Option<FolderId>,
    ) -> BoxFuture<'a, Result<Option<EntryId>>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            Ok(state
                .entries
                .iter()
                .find(|e| e.name == name && e.folder == folder)
                .map(|e| e.id))
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
            let id = EntryId(state.next_id());
            state.entries.push(EntryRecord {
                id,
                name: name.to_string(),
                folder,
                permission,
            });
            Ok(id)
        })
    }

    fn find_page<'a>(
        &'a self,
        entry: EntryId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<PageId>>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            Ok(state
                .pages
                .iter()
                .find(|p| p.entry == entry && p.name == name)
                .map(|p| p.id))
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
            if !state.entries.iter().any(|e| e.id == entry) {
                return Err(FluxError::UnknownEntry(entry.0));
            }
            let id = PageId(state.next_id());
            state.pages.push(PageRecord {
                id,
                entry,
                name: name.to_string(),
                body: body.to_string(),
                format: PageFormat::Markdown,
            });
            Ok(id)
        })
    }

    fn update_page<'a>(&'a self, page: PageId, body: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.write().unwrap();
            let record = state
                .pages
                .iter_mut()
                .find(|p| p.id == page)
                .ok_or(FluxError::UnknownPage(page.0))?;
            record.body = body.to_string();
            Ok(())
        })
    }

    fn page_body(&self, page: PageId) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let state = self.state.read().unwrap();
            state
                .pages
                .iter()
                .find(|p| p.id == page)
                .map(|p| p.body.clone())
                .ok_or(FluxError::UnknownPage(page.0))
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
            let record = state
                .pages
                .iter_mut()
                .find(|p| p.id == page)
                .ok_or(FluxError::UnknownPage(page.0))?;
            record.format = format;
            record.body = body.to_string();
            Ok(())
        })
    }

    fn page_link(&self, page: PageId, label: &str) -> String {
        format!("@Page[{}]{{{}}}", page.0, label)
    }
}
