//! Vault file records.
//!
//! A vault is a flat collection of files with slash-delimited relative
//! paths. Each file is parsed once into a [`VaultFile`] at the start of
//! a run; the run owns the resulting arena and the folder tree refers
//! into it by [`FileId`].

use std::sync::OnceLock;

use regex::Regex;

use crate::frontmatter::{self, Metadata};
use crate::store::{DocumentStore, PageId};

/// Index of a file in the run's arena.
pub type FileId = usize;

/// Raw contents of a vault source file.
#[derive(Debug, Clone)]
pub enum SourceContents {
    /// Text contents (markdown and other text formats).
    Text(String),
    /// Binary contents (images and other assets).
    Binary(Vec<u8>),
}

/// An unparsed input record: a relative path plus raw contents.
#[derive(Debug, Clone)]
pub struct VaultSourceFile {
    /// Slash-delimited path relative to the vault root.
    pub path: String,
    /// Raw contents.
    pub contents: SourceContents,
}

/// Parsed location of a vault file.
#[derive(Debug, Clone)]
pub struct VaultPath {
    /// Filename without extension.
    pub name: String,
    /// Lowercased extension without the dot; empty when absent.
    pub extension: String,
    /// Ordered path segments, excluding the filename.
    pub directories: Vec<String>,
}

impl VaultPath {
    /// Parse a slash-delimited relative path.
    pub fn parse(path: &str) -> VaultPath {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = segments.pop().unwrap_or_default();
        let (name, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_ascii_lowercase()),
            _ => (file_name.to_string(), String::new()),
        };
        VaultPath {
            name,
            extension,
            directories: segments.into_iter().map(str::to_string).collect(),
        }
    }

    /// Filename with its extension.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Whether any path component is a dot-name.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.') || self.directories.iter().any(|d| d.starts_with('.'))
    }

    /// Whether the file is in canvas format.
    pub fn is_canvas(&self) -> bool {
        self.extension == "canvas"
    }
}

/// A markdown vault file, parsed.
#[derive(Debug, Clone)]
pub struct MarkdownFile {
    /// Parsed location.
    pub path: VaultPath,
    /// Flat frontmatter metadata.
    pub metadata: Metadata,
    /// Body with frontmatter removed and pseudo-headings escaped.
    pub body: String,
    /// Page produced during import, if any.
    pub page: Option<PageId>,
}

/// A non-markdown vault file (binary asset).
#[derive(Debug, Clone)]
pub struct OtherFile {
    /// Parsed location.
    pub path: VaultPath,
    /// Raw bytes.
    pub data: Vec<u8>,
    /// Resolved path after upload, if any.
    pub upload_path: Option<String>,
}

/// A vault file of either kind.
#[derive(Debug, Clone)]
pub enum VaultFile {
    /// A markdown file.
    Markdown(MarkdownFile),
    /// Any other file.
    Other(OtherFile),
}

impl VaultFile {
    /// Parse a source record into a vault file. Markdown is recognized
    /// by its `md` extension and parsed immediately; everything else is
    /// kept as raw bytes.
    pub fn from_source(source: &VaultSourceFile) -> VaultFile {
        let path = VaultPath::parse(&source.path);
        if path.extension == "md" {
            let text = match &source.contents {
                SourceContents::Text(text) => text.clone(),
                SourceContents::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            };
            let parsed = frontmatter::parse(&text);
            VaultFile::Markdown(MarkdownFile {
                path,
                metadata: parsed.metadata,
                body: parsed.body,
                page: None,
            })
        } else {
            let data = match &source.contents {
                SourceContents::Text(text) => text.clone().into_bytes(),
                SourceContents::Binary(bytes) => bytes.clone(),
            };
            VaultFile::Other(OtherFile {
                path,
                data,
                upload_path: None,
            })
        }
    }

    /// Parsed location of the file.
    pub fn path(&self) -> &VaultPath {
        match self {
            VaultFile::Markdown(md) => &md.path,
            VaultFile::Other(other) => &other.path,
        }
    }

    /// Whether this is a markdown file.
    pub fn is_markdown(&self) -> bool {
        matches!(self, VaultFile::Markdown(_))
    }

    /// The page produced for this file, if any.
    pub fn page(&self) -> Option<PageId> {
        match self {
            VaultFile::Markdown(md) => md.page,
            VaultFile::Other(_) => None,
        }
    }

    /// Names other vault files may use to reference this file in
    /// wiki-link tokens: the bare filename and the directory-qualified
    /// path, both with and without the vault root segment. Markdown
    /// references drop the extension; asset references keep it.
    fn reference_names(&self) -> Vec<String> {
        let path = self.path();
        let bare = match self {
            VaultFile::Markdown(_) => path.name.clone(),
            VaultFile::Other(_) => path.file_name(),
        };
        let mut names = vec![bare.clone()];
        if !path.directories.is_empty() {
            names.push(format!("{}/{}", path.directories.join("/"), bare));
        }
        if path.directories.len() > 1 {
            names.push(format!("{}/{}", path.directories[1..].join("/"), bare));
        }
        names.dedup();
        names
    }

    /// Compiled wiki-link patterns matching this file's reference names.
    /// Capture group 1 holds the alias segment after `|`, if present.
    pub fn link_patterns(&self) -> Vec<Regex> {
        self.reference_names()
            .iter()
            .filter_map(|name| {
                Regex::new(&format!(
                    r"!?\[\[{}(?:\|([^\]]*))?\]\]",
                    regex::escape(name)
                ))
                .ok()
            })
            .collect()
    }

    /// Render the store-native link for this file with an optional
    /// alias label. `None` when the file produced neither page nor
    /// upload (e.g. it was not imported).
    pub fn resolved_link(&self, alias: &str, store: &dyn DocumentStore) -> Option<String> {
        match self {
            VaultFile::Markdown(md) => {
                let page = md.page?;
                let label = if alias.is_empty() { &md.path.name } else { alias };
                Some(store.page_link(page, label))
            }
            VaultFile::Other(other) => {
                let upload_path = other.upload_path.as_ref()?;
                let label = if alias.is_empty() {
                    other.path.file_name()
                } else {
                    alias.to_string()
                };
                Some(format!("![{}]({})", label, upload_path))
            }
        }
    }

    /// Canonical (no-alias) rendered link.
    pub fn canonical_link(&self, store: &dyn DocumentStore) -> Option<String> {
        self.resolved_link("", store)
    }
}

/// The inline resize annotation on an asset wiki-link token, normalized
/// to `WIDTHxHEIGHT` with `*` for an unspecified height.
pub fn resize_annotation(token: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"(?i)\|(\d+)(?:x(\d+))?\]").expect("valid resize regex"));
    let caps = pattern.captures(token)?;
    let width = caps.get(1)?.as_str();
    let height = caps.get(2).map(|m| m.as_str()).unwrap_or("*");
    Some(format!("{}x{}", width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use futures_lite::future::block_on;

    fn md_source(path: &str, text: &str) -> VaultSourceFile {
        VaultSourceFile {
            path: path.to_string(),
            contents: SourceContents::Text(text.to_string()),
        }
    }

    #[test]
    fn parses_path_segments() {
        let path = VaultPath::parse("vault/Guides/Getting Started.md");
        assert_eq!(path.name, "Getting Started");
        assert_eq!(path.extension, "md");
        assert_eq!(path.directories, vec!["vault", "Guides"]);
        assert_eq!(path.file_name(), "Getting Started.md");
    }

    #[test]
    fn detects_hidden_and_canvas() {
        assert!(VaultPath::parse("vault/.obsidian/config.json").is_hidden());
        assert!(VaultPath::parse("vault/.hidden.md").is_hidden());
        assert!(!VaultPath::parse("vault/visible.md").is_hidden());
        assert!(VaultPath::parse("vault/board.canvas").is_canvas());
    }

    #[test]
    fn markdown_source_is_parsed() {
        let file = VaultFile::from_source(&md_source(
            "vault/Note.md",
            "---\npermission: owner\n---\nBody text.\n",
        ));
        let VaultFile::Markdown(md) = &file else {
            panic!("expected markdown");
        };
        assert_eq!(md.body, "Body text.\n");
        assert!(md.metadata.contains_key("permission"));
    }

    #[test]
    fn patterns_match_bare_and_qualified_references() {
        let file = VaultFile::from_source(&md_source("vault/Guides/Note.md", "body text"));
        let patterns = file.link_patterns();

        let hits = |text: &str| {
            patterns
                .iter()
                .filter(|p| p.is_match(text))
                .count()
        };
        assert!(hits("see [[Note]]") > 0);
        assert!(hits("see [[Note|the note]]") > 0);
        assert!(hits("see [[vault/Guides/Note]]") > 0);
        assert!(hits("see [[Guides/Note]]") > 0);
        assert!(hits("see [[Other]]") == 0);
    }

    #[test]
    fn asset_patterns_keep_the_extension() {
        let file = VaultFile::from_source(&VaultSourceFile {
            path: "vault/img/map.png".to_string(),
            contents: SourceContents::Binary(vec![1, 2, 3]),
        });
        let patterns = file.link_patterns();
        assert!(patterns.iter().any(|p| p.is_match("![[map.png]]")));
        assert!(patterns.iter().any(|p| p.is_match("![[map.png|200x100]]")));
        assert!(!patterns.iter().any(|p| p.is_match("![[map]]")));
    }

    #[test]
    fn alias_capture_excludes_the_separator() {
        let file = VaultFile::from_source(&md_source("vault/Note.md", "body text"));
        let pattern = &file.link_patterns()[0];
        let caps = pattern.captures("[[Note|An Alias]]").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "An Alias");
        let caps = pattern.captures("[[Note]]").unwrap();
        assert!(caps.get(1).is_none());
    }

    #[test]
    fn resolved_link_requires_a_page() {
        let store = InMemoryStore::new();
        let mut file = VaultFile::from_source(&md_source("vault/Note.md", "body text"));
        assert!(file.resolved_link("", &store).is_none());

        let page = block_on(async {
            let entry = store.create_entry("Note", None, None).await.unwrap();
            store.create_page("Note", "body", entry).await.unwrap()
        });
        if let VaultFile::Markdown(md) = &mut file {
            md.page = Some(page);
        }
        let link = file.resolved_link("", &store).unwrap();
        assert!(link.contains("{Note}"));
        let aliased = file.resolved_link("alias", &store).unwrap();
        assert!(aliased.contains("{alias}"));
    }

    #[test]
    fn resize_annotation_normalizes_single_dimension() {
        assert_eq!(
            resize_annotation("![[map.png|200x100]]").as_deref(),
            Some("200x100")
        );
        assert_eq!(resize_annotation("![[map.png|200]]").as_deref(), Some("200x*"));
        assert_eq!(resize_annotation("![[map.png|alias]]"), None);
        assert_eq!(resize_annotation("![[map.png]]"), None);
    }
}
