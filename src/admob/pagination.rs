//! Page-token pagination

use std::future::Future;

use crate::core::error::McpResult;

/// One page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Fetch pages until the provider stops returning a next-page token and
/// concatenate their items in order.
///
/// `fetch` receives `None` for the first page and the previous page's token
/// afterwards. An absent or empty token ends the loop.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> McpResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = McpResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut page = 0usize;

    loop {
        page += 1;
        let current = fetch(token.take()).await?;
        tracing::debug!(page, items = current.items.len(), "Fetched page");
        items.extend(current.items);

        match current.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    Ok(items)
}
