//! Import settings and the "last settings" persistence seam.
//!
//! Settings persistence is process-wide state; it hides behind the
//! [`SettingsStore`] trait with an injected scope key so tests (and
//! embedders) can substitute an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::BoxFuture;
use crate::vault::VaultSourceFile;

/// Fixed namespace for persisted vaultflux values.
pub const SETTINGS_SCOPE: &str = "vaultflux";

/// Key under which the previous run's settings snapshot is stored.
pub const LAST_SETTINGS_KEY: &str = "last-import-settings";

/// Options controlling a single import run.
///
/// The transient `vault_files` payload rides along with the settings so
/// a run is triggered with one object, but it is cleared before the
/// snapshot is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Name of the store folder every imported folder nests under.
    /// Empty means import at the store root.
    pub root_folder_name: String,
    /// Fold all markdown files of a folder into one entry.
    pub combine_notes: bool,
    /// Restrict combining to leaf folders (no child folders).
    pub combine_notes_no_subfolders: bool,
    /// Update an existing page of the same name in place.
    pub overwrite: bool,
    /// With `overwrite` off, leave an existing page untouched instead of
    /// creating a duplicate.
    pub ignore_duplicate: bool,
    /// Upload non-markdown files to media storage.
    pub import_non_markdown: bool,
    /// Upload to the remote backend instead of local storage.
    pub use_remote_storage: bool,
    /// Remote storage bucket; required with `use_remote_storage`.
    pub remote_bucket: Option<String>,
    /// Remote storage region; required with `use_remote_storage`.
    pub remote_region: Option<String>,
    /// Target directory for uploaded media.
    pub media_folder: String,
    /// Give players observer access to created entries.
    pub player_observe: bool,
    /// Lock entries whose metadata flags them GM-only.
    pub exclude_gm_only: bool,
    /// Render an aggregate index page after import.
    pub create_index_file: bool,
    /// Append backlink sections after import.
    pub create_backlinks: bool,
    /// Convert all produced pages to rich text as a final pass.
    pub use_rich_text_conversion: bool,
    /// The files to import. Transient: never persisted.
    #[serde(skip)]
    pub vault_files: Option<Vec<VaultSourceFile>>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            root_folder_name: String::new(),
            combine_notes: false,
            combine_notes_no_subfolders: true,
            overwrite: true,
            ignore_duplicate: false,
            import_non_markdown: true,
            use_remote_storage: false,
            remote_bucket: None,
            remote_region: None,
            media_folder: "img".to_string(),
            player_observe: false,
            exclude_gm_only: false,
            create_index_file: false,
            create_backlinks: true,
            use_rich_text_conversion: false,
            vault_files: None,
        }
    }
}

impl ImportSettings {
    /// A copy safe to persist: the transient file list is cleared.
    pub fn sanitized(&self) -> ImportSettings {
        ImportSettings {
            vault_files: None,
            ..self.clone()
        }
    }
}

/// Key-value persistence for settings snapshots, keyed by a namespace
/// scope and a value key.
pub trait SettingsStore: Send + Sync {
    /// Persist `value` under `(scope, key)`, replacing any previous value.
    fn save<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
        value: serde_json::Value,
    ) -> BoxFuture<'a, Result<()>>;

    /// Load the value stored under `(scope, key)`, if any.
    fn load<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>>>;
}

/// In-memory settings store for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemorySettingsStore {
    values: Arc<RwLock<HashMap<(String, String), serde_json::Value>>>,
}

impl InMemorySettingsStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn save<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
        value: serde_json::Value,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut values = self.values.write().unwrap();
            values.insert((scope.to_string(), key.to_string()), value);
            Ok(())
        })
    }

    fn load<'a>(
        &'a self,
        scope: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<serde_json::Value>>> {
        Box::pin(async move {
            let values = self.values.read().unwrap();
            Ok(values.get(&(scope.to_string(), key.to_string())).cloned())
        })
    }
}
