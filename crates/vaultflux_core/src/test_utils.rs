//! Shared fixtures for the test suite.

use crate::vault::{SourceContents, VaultSourceFile};

/// A markdown source file with the given relative path and text.
pub fn md_file(path: &str, text: &str) -> VaultSourceFile {
    VaultSourceFile {
        path: path.to_string(),
        contents: SourceContents::Text(text.to_string()),
    }
}

/// A binary source file with the given relative path and bytes.
pub fn bin_file(path: &str, bytes: &[u8]) -> VaultSourceFile {
    VaultSourceFile {
        path: path.to_string(),
        contents: SourceContents::Binary(bytes.to_vec()),
    }
}
