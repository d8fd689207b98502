//! Vaultflux core: import a markdown vault into a folder/entry/page
//! document store.
//!
//! The pipeline builds a folder tree from the flat vault file list,
//! imports each file as a store entry/page (or uploads it as a media
//! asset), then makes corpus-wide passes to rewrite wiki-style links,
//! append backlink sections, render an aggregate index and optionally
//! convert every page to rich text.
//!
//! All interaction with the outside world goes through three injected
//! traits: [`store::DocumentStore`], [`media::MediaStorage`] and
//! [`settings::SettingsStore`]. In-memory implementations of each ship
//! with the crate for tests and embedding.

#![warn(missing_docs)]

/// Backlink section generation
pub mod backlinks;

/// Rich-text page conversion (markdown to HTML)
pub mod convert;

/// Error (common error types)
pub mod error;

/// Frontmatter extraction and body normalization
pub mod frontmatter;

/// Import orchestration (the end-to-end run)
pub mod import;

/// Aggregate index page generation
pub mod index;

/// Cross-reference link rewriting
pub mod links;

/// Media asset storage abstraction
pub mod media;

/// Permission resolution from file metadata
pub mod permission;

/// Import settings and settings persistence
pub mod settings;

/// Document store abstraction
pub mod store;

/// Folder tree construction
pub mod tree;

/// Vault file records
pub mod vault;

#[cfg(test)]
pub mod test_utils;
