//! Media asset storage abstraction.
//!
//! Non-markdown vault files (typically images) are uploaded to a media
//! location, either a local directory or a remote bucket. The pipeline
//! talks to storage through [`MediaStorage`]; the in-memory
//! implementation backs the test suite.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::error::{FluxError, Result};
use crate::store::BoxFuture;

/// Which storage backend an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local directory storage.
    Local,
    /// Remote bucket storage.
    Remote,
}

/// Backend-specific upload options.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Target bucket for the remote backend.
    pub bucket: Option<String>,
}

/// A successfully stored asset.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    /// Resolved path the asset is reachable under.
    pub path: String,
}

/// Async abstraction over media asset storage.
pub trait MediaStorage: Send + Sync {
    /// Check that `dir` exists on `backend`. A missing location is
    /// [`FluxError::StorageLookup`]; the caller decides whether to
    /// recover by creating it.
    fn probe<'a>(&'a self, backend: StorageBackend, dir: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Create `dir` (and missing parents) on `backend`.
    fn ensure_directory<'a>(
        &'a self,
        backend: StorageBackend,
        dir: &'a str,
    ) -> BoxFuture<'a, Result<()>>;

    /// Store `data` as `name` inside `dir` and return its resolved path.
    fn upload<'a>(
        &'a self,
        backend: StorageBackend,
        dir: &'a str,
        name: &'a str,
        data: &'a [u8],
        options: &'a UploadOptions,
    ) -> BoxFuture<'a, Result<UploadedAsset>>;
}

/// An uploaded asset as recorded by [`InMemoryMediaStorage`].
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    /// Backend the upload targeted.
    pub backend: StorageBackend,
    /// Resolved path.
    pub path: String,
    /// Raw bytes stored.
    pub data: Vec<u8>,
    /// Bucket requested, if any.
    pub bucket: Option<String>,
}

/// In-memory media storage for tests and dry runs.
#[derive(Clone, Default)]
pub struct InMemoryMediaStorage {
    directories: Arc<RwLock<HashSet<String>>>,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
}

impl InMemoryMediaStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a directory so probes succeed.
    pub fn with_directory(self, dir: &str) -> Self {
        self.directories.write().unwrap().insert(dir.to_string());
        self
    }

    /// Snapshot of all uploads, in order.
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().unwrap().clone()
    }

    /// Whether `dir` has been created.
    pub fn has_directory(&self, dir: &str) -> bool {
        self.directories.read().unwrap().contains(dir)
    }
}

impl MediaStorage for InMemoryMediaStorage {
    fn probe<'a>(&'a self, _backend: StorageBackend, dir: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.directories.read().unwrap().contains(dir) {
                Ok(())
            } else {
                Err(FluxError::StorageLookup(dir.to_string()))
            }
        })
    }

    fn ensure_directory<'a>(
        &'a self,
        _backend: StorageBackend,
        dir: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.directories.write().unwrap().insert(dir.to_string());
            Ok(())
        })
    }

    fn upload<'a>(
        &'a self,
        backend: StorageBackend,
        dir: &'a str,
        name: &'a str,
        data: &'a [u8],
        options: &'a UploadOptions,
    ) -> BoxFuture<'a, Result<UploadedAsset>> {
        Box::pin(async move {
            let path = format!("{}/{}", dir.trim_end_matches('/'), name);
            self.uploads.write().unwrap().push(RecordedUpload {
                backend,
                path: path.clone(),
                data: data.to_vec(),
                bucket: options.bucket.clone(),
            });
            Ok(UploadedAsset { path })
        })
    }
}
