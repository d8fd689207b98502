use thiserror::Error;

/// Unified error type for vaultflux operations
#[derive(Debug, Error)]
pub enum FluxError {
    /// IO failure from a filesystem-backed collaborator.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote storage was selected but bucket/region settings are missing.
    /// Raised before any store mutation.
    #[error("remote storage settings are invalid: bucket and region are required")]
    InvalidStorageConfig,

    /// A storage location probe failed. Recoverable: the import creates
    /// the missing directory and continues.
    #[error("storage location '{0}' does not exist")]
    StorageLookup(String),

    /// A folder id was presented to a store that does not know it.
    #[error("unknown folder id {0}")]
    UnknownFolder(u64),

    /// An entry id was presented to a store that does not know it.
    #[error("unknown entry id {0}")]
    UnknownEntry(u64),

    /// A page id was presented to a store that does not know it.
    #[error("unknown page id {0}")]
    UnknownPage(u64),

    /// Settings snapshot could not be encoded for persistence.
    #[error("settings serialization error: {0}")]
    SettingsEncode(#[from] serde_json::Error),

    /// Any other document store failure. Not raised by the built-in
    /// stores; external [`DocumentStore`](crate::store::DocumentStore)
    /// implementations report backend-specific failures through it.
    #[error("document store error: {0}")]
    Store(String),

    /// Any other media storage failure.
    #[error("media storage error: {0}")]
    Storage(String),
}

/// Result type alias for vaultflux operations
pub type Result<T> = std::result::Result<T, FluxError>;
