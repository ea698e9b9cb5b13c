//! Card extraction from the scrolling result list.
//!
//! Drives the browser collaborator: navigate, then scroll until the
//! feed stabilizes (no new ids across `stable_rounds` consecutive
//! scrolls) or the attempt bound is hit. Ids are deduplicated within
//! the run before anything downstream sees them - re-rendered cards
//! never appear twice.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::ScrollConfig;
use crate::error::BrowserResult;
use crate::traits::browser::Browser;
use crate::types::card::{JobCard, RawCard};

/// Result of the extraction phase.
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    /// Cards in first-sighting order, one per unique id
    pub cards: Vec<JobCard>,

    /// Elements dropped for missing ids (largest single-read count,
    /// since id-less elements re-render every read)
    pub invalid: usize,

    /// True when the feed never stabilized within the attempt bound
    pub degraded: bool,

    /// Scroll attempts performed
    pub rounds: usize,
}

/// Collect cards from the result list behind `search_url`.
///
/// A feed that never stabilizes is not fatal: whatever was collected is
/// returned and the outcome is flagged degraded.
pub async fn collect_cards<B: Browser>(
    browser: &B,
    search_url: &str,
    config: &ScrollConfig,
) -> BrowserResult<CollectOutcome> {
    browser.navigate(search_url).await?;

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut collected: Vec<RawCard> = Vec::new();
    let mut invalid = 0usize;
    let mut quiet = 0usize;
    let mut rounds = 0usize;
    let mut degraded = false;

    let first = browser.current_cards().await?;
    invalid = invalid.max(absorb(&first, &mut seen_ids, &mut collected));

    loop {
        if quiet >= config.stable_rounds {
            break;
        }
        if rounds >= config.max_rounds {
            warn!(
                rounds,
                collected = collected.len(),
                "result list never stabilized, returning partial card set"
            );
            degraded = true;
            break;
        }

        browser.scroll().await?;
        rounds += 1;

        let batch = browser.current_cards().await?;
        let before = collected.len();
        invalid = invalid.max(absorb(&batch, &mut seen_ids, &mut collected));
        if collected.len() == before {
            quiet += 1;
        } else {
            quiet = 0;
        }
    }

    let cards: Vec<JobCard> = collected.iter().filter_map(JobCard::from_raw).collect();
    info!(
        cards = cards.len(),
        invalid, rounds, degraded, "card extraction finished"
    );

    Ok(CollectOutcome {
        cards,
        invalid,
        degraded,
        rounds,
    })
}

/// Fold one read into the collected set; returns the read's id-less
/// element count.
fn absorb(batch: &[RawCard], seen_ids: &mut HashSet<String>, collected: &mut Vec<RawCard>) -> usize {
    let mut missing = 0usize;
    for raw in batch {
        match raw.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if seen_ids.insert(id.to_string()) {
                    collected.push(raw.clone());
                }
            }
            _ => missing += 1,
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBrowser;

    fn raw(id: &str, title: &str) -> RawCard {
        RawCard::new(id, format!("https://jobs.example.com/view/{id}/"))
            .with_lines([title, "Some Co"])
    }

    #[tokio::test]
    async fn stops_after_stable_rounds_and_dedups_rerendered_cards() {
        // Frame 0 shows job-1; later frames re-render job-1 alongside
        // job-2, then nothing new.
        let browser = MockBrowser::new()
            .with_frame(vec![raw("job-1", "Engineer")])
            .with_frame(vec![raw("job-1", "Engineer"), raw("job-2", "Analyst")])
            .with_frame(vec![raw("job-1", "Engineer"), raw("job-2", "Analyst")])
            .with_frame(vec![raw("job-1", "Engineer"), raw("job-2", "Analyst")]);

        let config = ScrollConfig::new().with_stable_rounds(2).with_max_rounds(10);
        let outcome = collect_cards(&browser, "https://jobs.example.com/search", &config)
            .await
            .unwrap();

        assert!(!outcome.degraded);
        let ids: Vec<&str> = outcome.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["job-1", "job-2"]);
        // First-sighting order preserved, no duplicates.
        assert_eq!(outcome.rounds, 3);
    }

    #[tokio::test]
    async fn never_stabilizing_feed_hits_bound_and_degrades() {
        // Every frame introduces a fresh id.
        let frames: Vec<Vec<RawCard>> = (0..50)
            .map(|i| vec![raw(&format!("job-{i}"), "Engineer")])
            .collect();
        let browser = MockBrowser::new().with_frames(frames);

        let config = ScrollConfig::new().with_stable_rounds(2).with_max_rounds(5);
        let outcome = collect_cards(&browser, "https://jobs.example.com/search", &config)
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.rounds, 5);
        // Initial read plus five scrolled reads.
        assert_eq!(outcome.cards.len(), 6);
    }

    #[tokio::test]
    async fn idless_elements_are_counted_not_collected() {
        let mut orphan = RawCard::default();
        orphan.lines = vec!["Promoted".into()];

        let browser = MockBrowser::new()
            .with_frame(vec![orphan.clone(), raw("job-1", "Engineer")])
            .with_frame(vec![orphan, raw("job-1", "Engineer")]);

        let config = ScrollConfig::new().with_stable_rounds(1).with_max_rounds(10);
        let outcome = collect_cards(&browser, "https://jobs.example.com/search", &config)
            .await
            .unwrap();

        assert_eq!(outcome.cards.len(), 1);
        assert_eq!(outcome.invalid, 1);
    }
}
