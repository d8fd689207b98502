//! Backlink section generation.
//!
//! Runs after the link-rewrite pass: page bodies already carry
//! store-native links, so finding referencing files is a literal
//! substring search for the canonical link string.

use crate::error::Result;
use crate::store::DocumentStore;
use crate::vault::{FileId, VaultFile};

/// Header line introducing an appended backlink section.
const REFERENCES_HEADER: &str = "#References";

/// Append a backlink section to every markdown file's page that other
/// files reference. Files that produced no page are skipped entirely,
/// neither scanned nor eligible as backlink sources.
pub async fn append_backlinks(
    store: &dyn DocumentStore,
    files: &[VaultFile],
    markdown_ids: &[FileId],
) -> Result<()> {
    for &id in markdown_ids {
        let Some(page) = files[id].page() else {
            continue;
        };
        let Some(link) = files[id].canonical_link(store) else {
            continue;
        };

        let mut sources: Vec<FileId> = Vec::new();
        for &other in markdown_ids {
            if other == id {
                continue;
            }
            let Some(other_page) = files[other].page() else {
                continue;
            };
            let body = store.page_body(other_page).await?;
            if body.contains(&link) {
                sources.push(other);
            }
        }
        if sources.is_empty() {
            continue;
        }

        sources.sort_by_key(|&s| files[s].path().name.to_lowercase());
        let bullets: Vec<String> = sources
            .iter()
            .filter_map(|&s| files[s].canonical_link(store))
            .map(|l| format!("- {l}"))
            .collect();

        let body = store.page_body(page).await?;
        let updated = format!("{body}\n{REFERENCES_HEADER}\n{}", bullets.join("\n"));
        store.update_page(page, &updated).await?;
    }
    Ok(())
}
