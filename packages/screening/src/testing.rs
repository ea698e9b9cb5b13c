//! Mock collaborators for testing the pipeline without a browser or a
//! model service.
//!
//! `MockBrowser` replays scripted scroll frames and page bodies;
//! `MockAi` applies a deterministic title-vs-target-roles heuristic for
//! screening and scripted decisions for gating. Both track calls for
//! assertions.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{AiError, AiResult, BrowserError, BrowserResult};
use crate::traits::{ai::Ai, browser::Browser};
use crate::types::card::{JobCard, RawCard};
use crate::types::decision::{CardProfile, GateDecision, ScreenDecision};
use crate::types::description::JobDescription;
use crate::types::preferences::Preferences;

/// Wrap a body in the markers a rendered posting page carries, so
/// `JobDescription::from_page` crops it the same way it would a real
/// page.
pub fn jd_page(body: &str) -> String {
    format!(
        "Some Co · Full-time\nAbout the job\n{body}\nSee more\nSet alert for similar jobs\nfooter"
    )
}

/// Record of a call made to the mock browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBrowserCall {
    Navigate { url: String },
    Scroll,
    CurrentCards,
    FetchPage { url: String },
}

/// A scripted browser.
///
/// Scroll frames model the result list growing as it scrolls: frame 0
/// is what renders after navigation, each `scroll()` advances one
/// frame, and the last frame repeats once the script runs out.
#[derive(Default)]
pub struct MockBrowser {
    frames: Vec<Vec<RawCard>>,
    frame_idx: Mutex<usize>,
    pages: RwLock<HashMap<String, String>>,
    fail_pages: RwLock<HashSet<String>>,
    unreachable: bool,
    calls: Mutex<Vec<MockBrowserCall>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one scroll frame.
    pub fn with_frame(mut self, cards: Vec<RawCard>) -> Self {
        self.frames.push(cards);
        self
    }

    /// Append many scroll frames.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Vec<RawCard>>) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Script a page body for `fetch_page`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), body.into());
        self
    }

    /// Make `fetch_page` fail for one URL.
    pub fn fail_page(self, url: impl Into<String>) -> Self {
        self.fail_pages.write().unwrap().insert(url.into());
        self
    }

    /// Make every operation fail as collaborator-unreachable.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockBrowserCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> BrowserResult<()> {
        if self.unreachable {
            return Err(BrowserError::Unreachable(
                "mock driver offline".to_string().into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.calls.lock().unwrap().push(MockBrowserCall::Navigate {
            url: url.to_string(),
        });
        self.check_reachable()
    }

    async fn scroll(&self) -> BrowserResult<()> {
        self.calls.lock().unwrap().push(MockBrowserCall::Scroll);
        self.check_reachable()?;
        let mut idx = self.frame_idx.lock().unwrap();
        if *idx + 1 < self.frames.len() {
            *idx += 1;
        }
        Ok(())
    }

    async fn current_cards(&self) -> BrowserResult<Vec<RawCard>> {
        self.calls.lock().unwrap().push(MockBrowserCall::CurrentCards);
        self.check_reachable()?;
        let idx = *self.frame_idx.lock().unwrap();
        Ok(self.frames.get(idx).cloned().unwrap_or_default())
    }

    async fn fetch_page(&self, url: &str) -> BrowserResult<String> {
        self.calls.lock().unwrap().push(MockBrowserCall::FetchPage {
            url: url.to_string(),
        });
        self.check_reachable()?;

        if self.fail_pages.read().unwrap().contains(url) {
            return Err(BrowserError::Fetch {
                url: url.to_string(),
                message: "mock fetch refused".to_string(),
            });
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Fetch {
                url: url.to_string(),
                message: "no scripted page".to_string(),
            })
    }
}

/// A deterministic language-model stand-in.
///
/// Screening shortlists a card when any target role appears in its
/// title (case-insensitive); gating passes unless a decision is
/// scripted. Failure hooks simulate schema violations and an
/// unreachable service.
#[derive(Default)]
pub struct MockAi {
    shortlist_overrides: RwLock<HashMap<String, bool>>,
    gate_decisions: RwLock<HashMap<String, GateDecision>>,
    fail_gate: RwLock<HashSet<String>>,
    fail_screening: bool,
    drop_last_decision: bool,
    unreachable: bool,
    screen_calls: AtomicUsize,
    gate_calls: AtomicUsize,
}

impl MockAi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the screen verdict for one card id.
    pub fn with_shortlist(self, id: impl Into<String>, shortlisted: bool) -> Self {
        self.shortlist_overrides
            .write()
            .unwrap()
            .insert(id.into(), shortlisted);
        self
    }

    /// Script the gate decision for one card id.
    pub fn with_gate_decision(self, id: impl Into<String>, decision: GateDecision) -> Self {
        self.gate_decisions
            .write()
            .unwrap()
            .insert(id.into(), decision);
        self
    }

    /// Every `screen_batch` call returns a schema violation.
    pub fn fail_screening(mut self) -> Self {
        self.fail_screening = true;
        self
    }

    /// `screen_batch` returns one decision too few (cardinality bug).
    pub fn drop_last_screen_decision(mut self) -> Self {
        self.drop_last_decision = true;
        self
    }

    /// `gate_check` returns a schema violation for one card id.
    pub fn fail_gate_for(self, id: impl Into<String>) -> Self {
        self.fail_gate.write().unwrap().insert(id.into());
        self
    }

    /// Every call fails as service-unreachable.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Number of `screen_batch` calls made.
    pub fn screen_calls(&self) -> usize {
        self.screen_calls.load(Ordering::SeqCst)
    }

    /// Number of `gate_check` calls made.
    pub fn gate_calls(&self) -> usize {
        self.gate_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> AiResult<()> {
        if self.unreachable {
            return Err(AiError::Unreachable(
                "mock model service offline".to_string().into(),
            ));
        }
        Ok(())
    }

    fn default_verdict(card: &JobCard, preferences: &Preferences) -> bool {
        let title = card.title.to_lowercase();
        preferences
            .target_roles
            .iter()
            .any(|role| title.contains(&role.to_lowercase()))
    }
}

#[async_trait]
impl Ai for MockAi {
    async fn screen_batch(
        &self,
        cards: &[JobCard],
        preferences: &Preferences,
    ) -> AiResult<Vec<ScreenDecision>> {
        self.screen_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;

        if self.fail_screening {
            return Err(AiError::SchemaViolation {
                reason: "mock screening output malformed".to_string(),
            });
        }

        let overrides = self.shortlist_overrides.read().unwrap();
        let mut decisions: Vec<ScreenDecision> = cards
            .iter()
            .map(|card| {
                let shortlisted = overrides
                    .get(&card.id)
                    .copied()
                    .unwrap_or_else(|| Self::default_verdict(card, preferences));
                let profile = CardProfile {
                    title: card.title.clone(),
                    employer: Some(card.company.clone()),
                    ..Default::default()
                };
                if shortlisted {
                    ScreenDecision::shortlisted(profile)
                } else {
                    ScreenDecision::rejected(profile)
                }
            })
            .collect();

        if self.drop_last_decision {
            decisions.pop();
        }
        Ok(decisions)
    }

    async fn gate_check(
        &self,
        card: &JobCard,
        _description: &JobDescription,
        _preferences: &Preferences,
    ) -> AiResult<GateDecision> {
        self.gate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;

        if self.fail_gate.read().unwrap().contains(&card.id) {
            return Err(AiError::SchemaViolation {
                reason: "mock gate output malformed".to_string(),
            });
        }

        Ok(self
            .gate_decisions
            .read()
            .unwrap()
            .get(&card.id)
            .cloned()
            .unwrap_or_else(|| GateDecision::passed(Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences {
        Preferences {
            target_roles: vec!["Data Scientist".into()],
            preferences: vec!["anything".into()],
            max_experience_years: None,
            requires_sponsorship: false,
            work_mode: None,
        }
    }

    #[tokio::test]
    async fn default_screen_matches_title_against_roles() {
        let ai = MockAi::new();
        let cards = vec![
            JobCard::new("1", "Senior Data Scientist", "A", "https://x/1"),
            JobCard::new("2", "Plumber", "B", "https://x/2"),
        ];
        let decisions = ai.screen_batch(&cards, &prefs()).await.unwrap();
        assert!(decisions[0].is_shortlisted());
        assert!(!decisions[1].is_shortlisted());
        assert_eq!(ai.screen_calls(), 1);
    }

    #[tokio::test]
    async fn browser_replays_frames_and_pages() {
        let browser = MockBrowser::new()
            .with_frame(vec![RawCard::new("1", "https://x/1")])
            .with_frame(vec![RawCard::new("1", "https://x/1"), RawCard::new("2", "https://x/2")])
            .with_page("https://x/1", "body");

        assert_eq!(browser.current_cards().await.unwrap().len(), 1);
        browser.scroll().await.unwrap();
        assert_eq!(browser.current_cards().await.unwrap().len(), 2);
        // Past the script, the last frame repeats.
        browser.scroll().await.unwrap();
        assert_eq!(browser.current_cards().await.unwrap().len(), 2);

        assert_eq!(browser.fetch_page("https://x/1").await.unwrap(), "body");
        assert!(browser.fetch_page("https://x/9").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_mock_is_fatal_everywhere() {
        let ai = MockAi::new().unreachable();
        let err = ai.screen_batch(&[], &prefs()).await.unwrap_err();
        assert!(err.is_fatal());

        let browser = MockBrowser::new().unreachable();
        let err = browser.navigate("https://x").await.unwrap_err();
        assert!(err.is_fatal());
    }
}
