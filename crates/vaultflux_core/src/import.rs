//! Import orchestration.
//!
//! [`Importer::run`] drives the end-to-end workflow: settings snapshot,
//! upload-location validation, folder tree construction, recursive
//! per-folder import, then the corpus-wide link, index, backlink and
//! conversion passes. Every store interaction is awaited to completion
//! before the next is issued; ordering within a pass follows the frozen
//! input order. Any unrecovered error aborts the remainder of the run
//! with no rollback of already-applied writes.

use crate::backlinks;
use crate::convert;
use crate::error::{FluxError, Result};
use crate::frontmatter::Metadata;
use crate::index;
use crate::links;
use crate::media::{MediaStorage, StorageBackend, UploadOptions};
use crate::permission;
use crate::settings::{ImportSettings, SettingsStore, LAST_SETTINGS_KEY, SETTINGS_SCOPE};
use crate::store::{create_or_get_folder, BoxFuture, DocumentStore, EntryId, FolderId, PageId};
use crate::tree::FolderNode;
use crate::vault::{FileId, VaultFile};

/// How a folder node folds into the store, computed once per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeDisposition {
    /// All markdown files of the node share one combined entry.
    Combined,
    /// Each markdown file becomes its own entry inside a store folder.
    SplitPerFile,
    /// Nothing beneath warrants a folder of its own.
    Flat,
}

/// Drives one import run against the injected collaborators.
pub struct Importer<'a> {
    store: &'a dyn DocumentStore,
    media: &'a dyn MediaStorage,
    settings_store: &'a dyn SettingsStore,
}

impl<'a> Importer<'a> {
    /// Create an importer over the given collaborators.
    pub fn new(
        store: &'a dyn DocumentStore,
        media: &'a dyn MediaStorage,
        settings_store: &'a dyn SettingsStore,
    ) -> Self {
        Importer {
            store,
            media,
            settings_store,
        }
    }

    /// Run a full import with the given settings.
    pub async fn run(&self, settings: &ImportSettings) -> Result<()> {
        log::info!("beginning vault import");
        self.save_settings(settings).await?;

        let Some(sources) = settings.vault_files.as_ref() else {
            log::info!("no vault files supplied, nothing to import");
            return Ok(());
        };

        if settings.import_non_markdown {
            self.validate_upload_location(settings).await?;
        }

        let root_folder =
            create_or_get_folder(self.store, &settings.root_folder_name, None).await?;

        let mut files: Vec<VaultFile> = sources.iter().map(VaultFile::from_source).collect();
        let tree = FolderNode::build(&files);
        self.import_folder(&tree, settings, root_folder, &mut files)
            .await?;

        let imported = tree.files_recursive();
        let pages: Vec<PageId> = imported.iter().filter_map(|&id| files[id].page()).collect();

        log::debug!(
            "rewriting links for {} files across {} pages",
            imported.len(),
            pages.len()
        );
        for &id in &imported {
            links::rewrite_links(self.store, &files[id], &pages).await?;
        }

        if settings.create_index_file || settings.create_backlinks {
            let markdown_ids: Vec<FileId> = imported
                .iter()
                .copied()
                .filter(|&id| files[id].is_markdown())
                .collect();
            if settings.create_index_file {
                log::debug!("building index over {} markdown files", markdown_ids.len());
                index::build_index(self.store, settings, &files, &markdown_ids, root_folder)
                    .await?;
            }
            if settings.create_backlinks {
                log::debug!("appending backlinks");
                backlinks::append_backlinks(self.store, &files, &markdown_ids).await?;
            }
        }

        if settings.use_rich_text_conversion {
            log::debug!("converting {} pages to rich text", pages.len());
            convert::convert_all(self.store, &pages).await?;
        }

        log::info!("vault import complete");
        Ok(())
    }

    /// Persist a sanitized settings snapshot for reuse as a future
    /// run's defaults. One-shot, before any other work.
    async fn save_settings(&self, settings: &ImportSettings) -> Result<()> {
        let snapshot = serde_json::to_value(settings.sanitized())?;
        self.settings_store
            .save(SETTINGS_SCOPE, LAST_SETTINGS_KEY, snapshot)
            .await
    }

    /// Validate the media target before any store mutation. Remote
    /// storage requires bucket and region; the local directory is
    /// probed and created when missing.
    async fn validate_upload_location(&self, settings: &ImportSettings) -> Result<()> {
        if settings.use_remote_storage {
            if settings.remote_bucket.is_none() || settings.remote_region.is_none() {
                return Err(FluxError::InvalidStorageConfig);
            }
            return Ok(());
        }
        match self
            .media
            .probe(StorageBackend::Local, &settings.media_folder)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!(
                    "media folder '{}' is not reachable ({err}), creating it",
                    settings.media_folder
                );
                self.media
                    .ensure_directory(StorageBackend::Local, &settings.media_folder)
                    .await
            }
        }
    }

    /// Import one folder node: decide its disposition, materialize the
    /// combined entry and/or store folder it calls for, then import
    /// direct files and recurse into children.
    fn import_folder<'b>(
        &'b self,
        node: &'b FolderNode,
        settings: &'b ImportSettings,
        parent_folder: Option<FolderId>,
        files: &'b mut Vec<VaultFile>,
    ) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            let has_markdown = node.files.iter().any(|&id| files[id].is_markdown());
            let combine = settings.combine_notes
                && has_markdown
                && (!settings.combine_notes_no_subfolders || node.children.is_empty());
            let disposition = if combine {
                NodeDisposition::Combined
            } else if !node.name.is_empty() && node.has_markdown_recursive(files) {
                NodeDisposition::SplitPerFile
            } else {
                NodeDisposition::Flat
            };

            let mut parent_entry = None;
            if disposition == NodeDisposition::Combined {
                parent_entry = Some(self.combined_entry(node, settings, parent_folder).await?);
            }

            // A combined node still needs a store folder when descendant
            // subfolders carry markdown entries of their own.
            let needs_folder = match disposition {
                NodeDisposition::SplitPerFile => true,
                NodeDisposition::Combined => node
                    .children
                    .iter()
                    .any(|child| child.has_markdown_recursive(files)),
                NodeDisposition::Flat => false,
            };
            let parent_folder = if needs_folder {
                create_or_get_folder(self.store, &node.name, parent_folder).await?
            } else {
                parent_folder
            };

            for &id in &node.files {
                self.import_file(files, id, settings, parent_folder, parent_entry)
                    .await?;
            }
            for child in &node.children {
                self.import_folder(child, settings, parent_folder, files)
                    .await?;
            }
            Ok(())
        })
    }

    /// The combined entry for a node, found by `(name, folder)` or
    /// created with the run's global permission.
    async fn combined_entry(
        &self,
        node: &FolderNode,
        settings: &ImportSettings,
        parent_folder: Option<FolderId>,
    ) -> Result<EntryId> {
        if let Some(entry) = self.store.find_entry(&node.name, parent_folder).await? {
            return Ok(entry);
        }
        let level = permission::resolve(&Metadata::new(), settings);
        self.store
            .create_entry(&node.name, parent_folder, level)
            .await
    }

    async fn import_file(
        &self,
        files: &mut [VaultFile],
        id: FileId,
        settings: &ImportSettings,
        parent_folder: Option<FolderId>,
        parent_entry: Option<EntryId>,
    ) -> Result<()> {
        match &files[id] {
            VaultFile::Markdown(_) => {
                self.import_markdown_file(files, id, settings, parent_folder, parent_entry)
                    .await
            }
            VaultFile::Other(_) if settings.import_non_markdown => {
                self.import_other_file(files, id, settings).await
            }
            VaultFile::Other(_) => Ok(()),
        }
    }

    /// Import one markdown file into its target entry, applying the
    /// page dedupe policy, and record the resulting page on the file.
    async fn import_markdown_file(
        &self,
        files: &mut [VaultFile],
        id: FileId,
        settings: &ImportSettings,
        parent_folder: Option<FolderId>,
        parent_entry: Option<EntryId>,
    ) -> Result<()> {
        let (page_name, body, metadata) = match &files[id] {
            VaultFile::Markdown(md) => (md.path.name.clone(), md.body.clone(), md.metadata.clone()),
            VaultFile::Other(_) => return Ok(()),
        };

        let entry = match parent_entry {
            Some(entry) => entry,
            None => match self.store.find_entry(&page_name, parent_folder).await? {
                Some(entry) => entry,
                None => {
                    // The per-file permission applies only when a new
                    // entry is created; reused entries keep their level.
                    let level = permission::resolve(&metadata, settings);
                    self.store
                        .create_entry(&page_name, parent_folder, level)
                        .await?
                }
            },
        };

        let existing = self.store.find_page(entry, &page_name).await?;
        let page = match existing {
            Some(page) if settings.overwrite => {
                self.store.update_page(page, &body).await?;
                Some(page)
            }
            None => Some(self.store.create_page(&page_name, &body, entry).await?),
            Some(_) if !settings.ignore_duplicate => {
                Some(self.store.create_page(&page_name, &body, entry).await?)
            }
            Some(_) => None,
        };

        if let VaultFile::Markdown(md) = &mut files[id] {
            md.page = page;
        }
        Ok(())
    }

    /// Upload one asset file and record its resolved path.
    async fn import_other_file(
        &self,
        files: &mut [VaultFile],
        id: FileId,
        settings: &ImportSettings,
    ) -> Result<()> {
        let (name, data) = match &files[id] {
            VaultFile::Other(other) => (other.path.file_name(), other.data.clone()),
            VaultFile::Markdown(_) => return Ok(()),
        };

        let backend = if settings.use_remote_storage {
            StorageBackend::Remote
        } else {
            StorageBackend::Local
        };
        let options = UploadOptions {
            bucket: settings.remote_bucket.clone(),
        };
        let uploaded = self
            .media
            .upload(backend, &settings.media_folder, &name, &data, &options)
            .await?;

        if let VaultFile::Other(other) = &mut files[id] {
            other.upload_path = Some(uploaded.path);
        }
        Ok(())
    }
}
