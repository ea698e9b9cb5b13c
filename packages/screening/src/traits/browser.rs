//! Browser trait - the abstract rendering collaborator.
//!
//! The pipeline never assumes a specific driver; it only needs to point
//! the view at a URL, scroll the result list, read the visible cards,
//! and fetch a page's text. Scrolling is inherently serialized (each
//! scroll depends on the prior render) and the extractor calls it
//! sequentially; page fetches, by contrast, arrive concurrently from
//! the gate pool, so [`Browser::fetch_page`] carries an atomicity
//! requirement.

use async_trait::async_trait;

use crate::error::BrowserResult;
use crate::types::card::RawCard;

/// Browser-automation collaborator.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Point the result view at a URL and wait for it to render.
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Scroll the result list by one step.
    async fn scroll(&self) -> BrowserResult<()>;

    /// Read the card elements currently rendered in the result list.
    ///
    /// May return cards already seen earlier in the run; the extractor
    /// dedups by id.
    async fn current_cards(&self) -> BrowserResult<Vec<RawCard>>;

    /// Fetch a page and return its readable text.
    ///
    /// The gate issues fetches concurrently. An implementation backed by
    /// a single navigation context must keep each call's navigate-and-
    /// read sequence atomic, so the returned text is always the page at
    /// `url` and never a concurrent caller's.
    async fn fetch_page(&self, url: &str) -> BrowserResult<String>;
}
