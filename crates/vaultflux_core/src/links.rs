//! Cross-reference link rewriting.
//!
//! After all entries and pages exist, every imported file's wiki-link
//! patterns are matched against every produced page and each matched
//! token is replaced with the file's store-native link. This needs
//! global knowledge of the whole imported corpus, so it runs as its own
//! pass consuming the page index recorded during import.

use crate::error::Result;
use crate::store::{DocumentStore, PageId};
use crate::vault::{resize_annotation, VaultFile};

/// Rewrite every reference to `file` across `pages`.
///
/// Matching is literal substring replacement of the exact matched
/// token, so duplicate identical tokens in one page are each rewritten
/// as they are enumerated. Files that produced no link target (no page,
/// no upload) contribute no rewrites.
pub async fn rewrite_links(
    store: &dyn DocumentStore,
    file: &VaultFile,
    pages: &[PageId],
) -> Result<()> {
    let patterns = file.link_patterns();
    for &page in pages {
        for pattern in &patterns {
            let mut body = store.page_body(page).await?;
            let occurrences: Vec<(String, String)> = pattern
                .captures_iter(&body)
                .map(|caps| {
                    let token = caps[0].to_string();
                    let alias = caps
                        .get(1)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default();
                    (token, alias)
                })
                .collect();

            for (token, alias) in occurrences {
                let Some(mut link) = file.resolved_link(&alias, store) else {
                    continue;
                };
                if let VaultFile::Other(_) = file {
                    link = apply_resize(&token, link);
                }
                body = body.replacen(&token, &link, 1);
                store.update_page(page, &body).await?;
            }
        }
    }
    Ok(())
}

/// Carry an inline `|W` / `|WxH` annotation from the matched token into
/// the rendered link as an explicit-dimension suffix.
fn apply_resize(token: &str, link: String) -> String {
    let Some(dimensions) = resize_annotation(token) else {
        return link;
    };
    match link.strip_suffix(')') {
        Some(head) => format!("{} ={})", head, dimensions),
        None => link,
    }
}
