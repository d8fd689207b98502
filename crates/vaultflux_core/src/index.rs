//! Aggregate index page generation.
//!
//! Groups all imported markdown files by their top-level directory and
//! renders one summary page under the run's root folder.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::frontmatter::Metadata;
use crate::permission;
use crate::settings::ImportSettings;
use crate::store::{DocumentStore, FolderId};
use crate::vault::{FileId, VaultFile, VaultPath};

/// Name of the index entry and its page.
const INDEX_NAME: &str = "Index";

/// Bucket for files directly under the vault root.
const UNCATEGORIZED: &str = "Uncategorized";

/// The grouping key: the second path segment when one exists (the first
/// being the vault root), else the fixed uncategorized bucket.
fn top_directory(path: &VaultPath) -> String {
    if path.directories.len() > 1 {
        path.directories[1].clone()
    } else {
        UNCATEGORIZED.to_string()
    }
}

/// Render and persist the index page. An existing `(Index, root)` page
/// has its body replaced; otherwise a new entry/page pair is created
/// with the run's global permission (there is no single source file to
/// resolve from).
pub async fn build_index(
    store: &dyn DocumentStore,
    settings: &ImportSettings,
    files: &[VaultFile],
    markdown_ids: &[FileId],
    root_folder: Option<FolderId>,
) -> Result<()> {
    // BTreeMap keeps directory headings lexicographically sorted; links
    // within a group stay in file-iteration order.
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for &id in markdown_ids {
        let Some(page) = files[id].page() else {
            continue;
        };
        let link = store.page_link(page, &files[id].path().name);
        groups
            .entry(top_directory(files[id].path()))
            .or_default()
            .push(link);
    }

    let mut content = String::new();
    for (directory, links) in &groups {
        content.push_str(&format!("# {directory}\n"));
        for link in links {
            content.push_str(&format!("- {link}\n"));
        }
    }

    let entry = match store.find_entry(INDEX_NAME, root_folder).await? {
        Some(entry) => entry,
        None => {
            let level = permission::resolve(&Metadata::new(), settings);
            store.create_entry(INDEX_NAME, root_folder, level).await?
        }
    };
    match store.find_page(entry, INDEX_NAME).await? {
        Some(page) => store.update_page(page, &content).await?,
        None => {
            store.create_page(INDEX_NAME, &content, entry).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::vault::{SourceContents, VaultSourceFile};
    use futures_lite::future::block_on;

    fn imported(store: &InMemoryStore, path: &str) -> VaultFile {
        let mut file = VaultFile::from_source(&VaultSourceFile {
            path: path.to_string(),
            contents: SourceContents::Text("body text".to_string()),
        });
        let page = block_on(async {
            let name = file.path().name.clone();
            let entry = store.create_entry(&name, None, None).await.unwrap();
            store.create_page(&name, "body text", entry).await.unwrap()
        });
        if let VaultFile::Markdown(md) = &mut file {
            md.page = Some(page);
        }
        file
    }

    fn index_body(store: &InMemoryStore) -> String {
        let entry = block_on(store.find_entry(INDEX_NAME, None)).unwrap().unwrap();
        let page = block_on(store.find_page(entry, INDEX_NAME)).unwrap().unwrap();
        block_on(store.page_body(page)).unwrap()
    }

    #[test]
    fn groups_by_second_segment_with_uncategorized_fallback() {
        let store = InMemoryStore::new();
        let files = vec![
            imported(&store, "root/Guides/x.md"),
            imported(&store, "root/Guides/y.md"),
            imported(&store, "root/z.md"),
        ];
        let settings = ImportSettings::default();
        block_on(build_index(&store, &settings, &files, &[0, 1, 2], None)).unwrap();

        let body = index_body(&store);
        let guides = body.find("# Guides").expect("Guides heading");
        let uncat = body.find("# Uncategorized").expect("Uncategorized heading");
        assert!(guides < uncat);

        let x = store.page_link(files[0].page().unwrap(), "x");
        let y = store.page_link(files[1].page().unwrap(), "y");
        let z = store.page_link(files[2].page().unwrap(), "z");
        assert_eq!(body, format!("# Guides\n- {x}\n- {y}\n# Uncategorized\n- {z}\n"));
    }

    #[test]
    fn existing_index_body_is_replaced() {
        let store = InMemoryStore::new();
        let files = vec![imported(&store, "root/a.md")];
        let settings = ImportSettings::default();
        block_on(build_index(&store, &settings, &files, &[0], None)).unwrap();
        let first = index_body(&store);

        let more = vec![imported(&store, "root/Guides/b.md")];
        let all = [files, more].concat();
        block_on(build_index(&store, &settings, &all, &[0, 1], None)).unwrap();

        let second = index_body(&store);
        assert_ne!(first, second);
        assert!(second.contains("# Guides"));
        // Still exactly one index entry.
        let indexes = store
            .entries()
            .iter()
            .filter(|e| e.name == INDEX_NAME)
            .count();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn index_honors_global_observe_permission() {
        let store = InMemoryStore::new();
        let files = vec![imported(&store, "root/a.md")];
        let settings = ImportSettings {
            player_observe: true,
            ..ImportSettings::default()
        };
        block_on(build_index(&store, &settings, &files, &[0], None)).unwrap();

        let entry = block_on(store.find_entry(INDEX_NAME, None)).unwrap().unwrap();
        let record = store.entry(entry).unwrap();
        assert_eq!(
            record.permission,
            Some(crate::permission::PermissionLevel::Observer)
        );
    }

    #[test]
    fn pageless_files_are_left_out() {
        let store = InMemoryStore::new();
        let with_page = imported(&store, "root/a.md");
        let without = VaultFile::from_source(&VaultSourceFile {
            path: "root/b.md".to_string(),
            contents: SourceContents::Text("body text".to_string()),
        });
        let files = vec![with_page, without];
        let settings = ImportSettings::default();
        block_on(build_index(&store, &settings, &files, &[0, 1], None)).unwrap();

        let body = index_body(&store);
        assert_eq!(body.matches("- ").count(), 1);
    }
}
