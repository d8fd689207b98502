//! Rich-text page conversion.
//!
//! The optional final pass renders every produced page's markdown body
//! to HTML and switches its format. Each conversion touches a disjoint
//! page, so they are dispatched concurrently; the pass completes only
//! once every conversion settles, and a failure in any one fails it.

use comrak::{markdown_to_html, Options};
use futures_util::future::try_join_all;

use crate::error::Result;
use crate::store::{DocumentStore, PageFormat, PageId};

/// Render markdown to HTML with the extensions vault content relies on.
fn render_html(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    markdown_to_html(markdown, &options)
}

/// Convert a single page to HTML.
pub async fn convert_page(store: &dyn DocumentStore, page: PageId) -> Result<()> {
    let body = store.page_body(page).await?;
    let html = render_html(&body);
    store.set_page_format(page, PageFormat::Html, &html).await
}

/// Convert all pages concurrently.
pub async fn convert_all(store: &dyn DocumentStore, pages: &[PageId]) -> Result<()> {
    try_join_all(pages.iter().map(|&page| convert_page(store, page))).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluxError;
    use crate::store::InMemoryStore;
    use futures_lite::future::block_on;

    #[test]
    fn convert_all_switches_every_page() {
        let store = InMemoryStore::new();
        let pages = block_on(async {
            let entry = store.create_entry("E", None, None).await.unwrap();
            let a = store.create_page("a", "# Title", entry).await.unwrap();
            let b = store.create_page("b", "plain", entry).await.unwrap();
            vec![a, b]
        });

        block_on(convert_all(&store, &pages)).unwrap();

        let a = store.page(pages[0]).unwrap();
        assert_eq!(a.format, PageFormat::Html);
        assert!(a.body.contains("<h1>"));
        let b = store.page(pages[1]).unwrap();
        assert_eq!(b.format, PageFormat::Html);
        assert!(b.body.contains("<p>plain</p>"));
    }

    #[test]
    fn one_failure_fails_the_pass() {
        let store = InMemoryStore::new();
        let page = block_on(async {
            let entry = store.create_entry("E", None, None).await.unwrap();
            store.create_page("a", "text", entry).await.unwrap()
        });

        let err = block_on(convert_all(&store, &[page, PageId(999)])).unwrap_err();
        assert!(matches!(err, FluxError::UnknownPage(999)));
    }
}
