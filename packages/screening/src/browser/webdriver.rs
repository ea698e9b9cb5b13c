//! WebDriver implementation of the Browser trait.
//!
//! Drives a real Chrome session through a driver endpoint. Owns all the
//! site-specific knowledge: where the card id attribute lives, how the
//! result list scrolls, and how to flatten a posting page to text.
//! Every operation sleeps a short random interval first so the request
//! cadence does not look mechanical.
//!
//! One driver session means one navigation context, so every operation
//! runs under a session lock; a concurrent `fetch_page` cannot slip its
//! navigation between another caller's goto and source read.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use webdriver::{SessionOptions, WebDriverError, WebDriverSession};

use crate::error::{BrowserError, BrowserResult};
use crate::traits::browser::Browser;
use crate::types::card::RawCard;

/// Card elements in the result list carry the posting id here.
const CARD_ID_ATTR: &str = "data-occludable-job-id";
const CARD_SELECTOR: &str = "li[data-occludable-job-id]";

/// Scrolls the result list pane by most of one viewport. The list is
/// its own scroll container, so scrolling the window does nothing.
const SCROLL_SCRIPT: &str = r#"
const pane = document.querySelector('div.scaffold-layout__list > div')
    || document.querySelector('.jobs-search-results-list');
if (pane) { pane.scrollBy(0, pane.clientHeight * 0.8); }
"#;

/// Default pacing bounds between browser operations, in milliseconds.
const PACE_MIN_MS: u64 = 800;
const PACE_MAX_MS: u64 = 2_200;

/// Tuning for the live browser.
#[derive(Debug, Clone)]
pub struct WebDriverBrowserOptions {
    /// Driver endpoint, e.g. `http://localhost:9515`
    pub endpoint: String,

    /// Chrome profile directory; reusing one keeps the platform login
    pub user_data_dir: Option<String>,

    /// Template for a posting page URL; `{id}` is replaced
    pub view_url_template: String,

    /// Pacing jitter bounds in milliseconds
    pub pace_min_ms: u64,
    pub pace_max_ms: u64,
}

impl WebDriverBrowserOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_data_dir: None,
            view_url_template: "https://www.linkedin.com/jobs/view/{id}/".to_string(),
            pace_min_ms: PACE_MIN_MS,
            pace_max_ms: PACE_MAX_MS,
        }
    }

    pub fn with_user_data_dir(mut self, dir: impl Into<String>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Override the pacing jitter bounds.
    pub fn with_pacing(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.pace_min_ms = min_ms;
        self.pace_max_ms = max_ms.max(min_ms);
        self
    }
}

/// A [`Browser`] backed by a live WebDriver session.
pub struct WebDriverBrowser {
    session: WebDriverSession,
    view_url_template: String,
    pace_bounds: (u64, u64),

    // The session has one navigation context; this lock keeps each
    // operation's navigate-then-read sequence whole under concurrent
    // gate fetches.
    session_lock: Mutex<()>,
}

impl WebDriverBrowser {
    /// Start a browser session against the driver endpoint.
    pub async fn start(options: WebDriverBrowserOptions) -> BrowserResult<Self> {
        let mut session_options = SessionOptions::new(&options.endpoint);
        if let Some(dir) = &options.user_data_dir {
            session_options = session_options.with_user_data_dir(dir);
        }

        let session = WebDriverSession::start(session_options)
            .await
            .map_err(|e| BrowserError::Unreachable(Box::new(e)))?;
        session
            .set_window_rect(1400, 900)
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;

        Ok(Self {
            session,
            view_url_template: options.view_url_template,
            pace_bounds: (options.pace_min_ms, options.pace_max_ms),
            session_lock: Mutex::new(()),
        })
    }

    /// End the session and close the browser window.
    pub async fn shutdown(self) -> BrowserResult<()> {
        self.session
            .quit()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))
    }

    async fn pace(&self) {
        let (min, max) = self.pace_bounds;
        let ms = rand::rng().random_range(min..=max);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Parse the result-list cards out of a page snapshot.
fn parse_cards(html: &str, view_url_template: &str) -> Vec<RawCard> {
    let selector = match Selector::parse(CARD_SELECTOR) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|element| {
            let id = element
                .value()
                .attr(CARD_ID_ATTR)
                .map(|s| s.trim().to_string());
            let link = id
                .as_deref()
                .map(|id| view_url_template.replace("{id}", id))
                .unwrap_or_default();

            // Cards duplicate the title in a visually-hidden span for
            // screen readers; drop consecutive repeats.
            let mut lines: Vec<String> = Vec::new();
            for text in element.text() {
                let text = text.trim();
                if text.is_empty() || lines.last().is_some_and(|l| l == text) {
                    continue;
                }
                lines.push(text.to_string());
            }

            RawCard { id, link, lines }
        })
        .collect()
}

/// Flatten a rendered page to its visible text, one node per line.
fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("main")
        .ok()
        .and_then(|s| document.select(&s).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|s| document.select(&s).next())
        });

    match root {
        Some(element) => element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        None => String::new(),
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let _session = self.session_lock.lock().await;
        self.session.goto(url).await.map_err(|e| match e {
            WebDriverError::Connect(e) => BrowserError::Unreachable(Box::new(e)),
            other => BrowserError::Navigation {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;
        // Let the first batch of cards render before anyone reads them.
        self.pace().await;
        Ok(())
    }

    async fn scroll(&self) -> BrowserResult<()> {
        let _session = self.session_lock.lock().await;
        self.pace().await;
        self.session
            .execute(SCROLL_SCRIPT, Vec::new())
            .await
            .map_err(|e| match e {
                WebDriverError::Connect(e) => BrowserError::Unreachable(Box::new(e)),
                other => BrowserError::Interaction(other.to_string()),
            })?;
        Ok(())
    }

    async fn current_cards(&self) -> BrowserResult<Vec<RawCard>> {
        let _session = self.session_lock.lock().await;
        let html = self.session.page_source().await.map_err(|e| match e {
            WebDriverError::Connect(e) => BrowserError::Unreachable(Box::new(e)),
            other => BrowserError::Interaction(other.to_string()),
        })?;

        let cards = parse_cards(&html, &self.view_url_template);
        if cards.is_empty() {
            warn!("result list rendered no card elements");
        } else {
            debug!(count = cards.len(), "cards read from result list");
        }
        Ok(cards)
    }

    async fn fetch_page(&self, url: &str) -> BrowserResult<String> {
        // Held across goto and page_source: the source read must see the
        // page this call navigated to, not a concurrent caller's.
        let _session = self.session_lock.lock().await;
        self.pace().await;
        self.session.goto(url).await.map_err(|e| match e {
            WebDriverError::Connect(e) => BrowserError::Unreachable(Box::new(e)),
            other => BrowserError::Fetch {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;
        self.pace().await;

        let html = self.session.page_source().await.map_err(|e| match e {
            WebDriverError::Connect(e) => BrowserError::Unreachable(Box::new(e)),
            other => BrowserError::Fetch {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;
        Ok(page_text(&html))
    }
}
