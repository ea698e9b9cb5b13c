//! Dedup & block filter.
//!
//! Pure function over (cards, ledger, blocklist). A card survives iff
//! its id is not in the ledger and its company is not on the blocklist
//! (case-insensitive). Order-preserving, no side effects.

use crate::state::ledger::SeenLedger;
use crate::types::card::JobCard;
use crate::types::decision::SkipReason;
use crate::types::preferences::Blocklist;

/// A card that left the pipeline before Stage-1.
#[derive(Debug, Clone)]
pub struct FilteredCard {
    pub card: JobCard,
    pub reason: SkipReason,
}

/// Result of the dedup & block filter.
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Cards forwarded to Stage-1, in input order
    pub survivors: Vec<JobCard>,

    /// Cards dropped here, with why
    pub filtered: Vec<FilteredCard>,
}

/// Apply the filter. The ledger check runs first so a seen card from a
/// blocklisted company reports as seen, matching how it was originally
/// adjudicated.
pub fn filter_cards(
    cards: Vec<JobCard>,
    ledger: &SeenLedger,
    blocklist: &Blocklist,
) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();

    for card in cards {
        if ledger.contains(&card.id) {
            outcome.filtered.push(FilteredCard {
                card,
                reason: SkipReason::SeenJob,
            });
        } else if blocklist.contains(&card.company) {
            outcome.filtered.push(FilteredCard {
                card,
                reason: SkipReason::BlockedEmployer,
            });
        } else {
            outcome.survivors.push(card);
        }
    }

    outcome
}
