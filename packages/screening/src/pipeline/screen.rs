//! Stage-1 screener: cheap bulk pre-screen over card-level fields.
//!
//! Cards are grouped under a per-call size budget without splitting a
//! card; each card's decision is independent of batch placement. On
//! malformed model output the whole batch fails closed - every card in
//! it is rejected - and the run continues.

use tracing::{info, warn};

use crate::config::ScreenConfig;
use crate::error::AiError;
use crate::traits::ai::Ai;
use crate::types::card::JobCard;
use crate::types::decision::{CardProfile, SkipReason};
use crate::types::preferences::Preferences;

/// A card the screener shortlisted, with its normalized fields.
#[derive(Debug, Clone)]
pub struct ScreenedCard {
    pub card: JobCard,
    pub profile: CardProfile,
}

/// A card the screener dropped.
#[derive(Debug, Clone)]
pub struct ScreenReject {
    pub card: JobCard,
    pub profile: CardProfile,
    pub reason: SkipReason,
}

/// Result of the Stage-1 pass.
#[derive(Debug, Clone, Default)]
pub struct ScreenOutcome {
    /// Shortlisted candidates, in input order
    pub shortlisted: Vec<ScreenedCard>,

    /// Rejected cards, in input order
    pub rejected: Vec<ScreenReject>,

    /// Batches that failed closed on malformed output
    pub failed_batches: usize,
}

/// Group cards into batches under the character budget.
///
/// A batch never splits a card; a single card over budget still goes
/// out alone. Order within and across batches is input order, so
/// reassembly is concatenation.
pub fn batch_cards(cards: Vec<JobCard>, config: &ScreenConfig) -> Vec<Vec<JobCard>> {
    let mut batches: Vec<Vec<JobCard>> = Vec::new();
    let mut current: Vec<JobCard> = Vec::new();
    let mut current_size = 0usize;

    for card in cards {
        let size = card.prompt_text().len();
        let over_budget = current_size + size > config.batch_budget_chars;
        let over_count = current.len() >= config.max_batch_cards;
        if !current.is_empty() && (over_budget || over_count) {
            batches.push(std::mem::take(&mut current));
            current_size = 0;
        }
        current_size += size;
        current.push(card);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Screen cards batch by batch.
///
/// Only a fatal (service-unreachable) error propagates; schema
/// violations and per-call API errors convert the affected batch into
/// conservative rejections.
pub async fn screen_cards<A: Ai>(
    ai: &A,
    cards: Vec<JobCard>,
    preferences: &Preferences,
    config: &ScreenConfig,
) -> Result<ScreenOutcome, AiError> {
    let mut outcome = ScreenOutcome::default();
    let batches = batch_cards(cards, config);
    info!(batches = batches.len(), "screening cards");

    for batch in batches {
        match ai.screen_batch(&batch, preferences).await {
            Ok(decisions) if decisions.len() == batch.len() => {
                for (card, decision) in batch.into_iter().zip(decisions) {
                    if decision.is_shortlisted() {
                        outcome.shortlisted.push(ScreenedCard {
                            card,
                            profile: decision.profile,
                        });
                    } else {
                        outcome.rejected.push(ScreenReject {
                            card,
                            profile: decision.profile,
                            reason: SkipReason::PreScreenRejected,
                        });
                    }
                }
            }
            Ok(decisions) => {
                warn!(
                    expected = batch.len(),
                    got = decisions.len(),
                    "screen batch returned wrong cardinality, failing closed"
                );
                fail_batch_closed(&mut outcome, batch);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "screen batch failed, failing closed");
                fail_batch_closed(&mut outcome, batch);
            }
        }
    }

    info!(
        shortlisted = outcome.shortlisted.len(),
        rejected = outcome.rejected.len(),
        failed_batches = outcome.failed_batches,
        "screening finished"
    );
    Ok(outcome)
}

fn fail_batch_closed(outcome: &mut ScreenOutcome, batch: Vec<JobCard>) {
    outcome.failed_batches += 1;
    for card in batch {
        outcome.rejected.push(ScreenReject {
            card,
            profile: CardProfile::default(),
            reason: SkipReason::ScreenFailedClosed,
        });
    }
}
