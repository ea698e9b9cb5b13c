//! The job-processing pipeline.
//!
//! Control flow per run: collect cards → dedup & block filter →
//! Stage-1 screen → Stage-2 gate → accumulate. Every card that reaches
//! the accumulator has passed dedup, Stage-1, and Stage-2 in that
//! strict order.

pub mod collect;
pub mod dedup;
pub mod gate;
pub mod screen;

pub use collect::{collect_cards, CollectOutcome};
pub use dedup::{filter_cards, DedupOutcome, FilteredCard};
pub use gate::{gate_candidates, GateRecord};
pub use screen::{batch_cards, screen_cards, ScreenOutcome, ScreenReject, ScreenedCard};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::state::ledger::SeenLedger;
use crate::traits::{ai::Ai, browser::Browser};
use crate::types::preferences::{Blocklist, Preferences};
use crate::types::report::ReportRow;

/// The result set of one run, handed to the report emitter.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every row the report carries: passed jobs plus adjudicated and
    /// skipped cards with their reason codes
    pub rows: Vec<ReportRow>,

    /// Gate-passed jobs this run
    pub passed: usize,

    /// Cards that reached a terminal decision this run (exactly how
    /// much the ledger grew)
    pub decided: usize,

    /// Unique cards extracted from the result list
    pub cards_extracted: usize,

    /// True when extraction hit the scroll bound before stabilizing
    pub degraded: bool,

    /// Estimated model spend for the run, in USD
    pub estimated_cost: f64,

    /// When the run started
    pub started_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Rows for jobs that passed the gate.
    pub fn passed_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.fit, crate::types::report::FitLabel::Yes))
    }
}

/// One search session end to end.
///
/// Collaborators and shared read-only context are injected, never
/// ambient, so every stage is testable with fakes.
pub struct Pipeline<B: Browser, A: Ai> {
    browser: B,
    ai: A,
    preferences: Preferences,
    config: RunConfig,
}

impl<B: Browser, A: Ai> Pipeline<B, A> {
    /// Create a pipeline with default tuning.
    pub fn new(browser: B, ai: A, preferences: Preferences) -> Self {
        Self {
            browser,
            ai,
            preferences,
            config: RunConfig::default(),
        }
    }

    /// Create with custom tuning.
    pub fn with_config(browser: B, ai: A, preferences: Preferences, config: RunConfig) -> Self {
        Self {
            browser,
            ai,
            preferences,
            config,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Take the collaborators back, e.g. to shut a live browser down
    /// after the run.
    pub fn into_collaborators(self) -> (B, A) {
        (self.browser, self.ai)
    }

    /// Execute one run.
    ///
    /// Mutates the ledger in memory only; the caller commits it to disk
    /// before emitting any report, so a report can never outrun the
    /// ledger.
    pub async fn run(
        &self,
        search_url: &str,
        ledger: &mut SeenLedger,
        blocklist: &Blocklist,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();

        // 1. Extract cards from the scrolling result list.
        let collected = collect_cards(&self.browser, search_url, &self.config.scroll).await?;
        let cards_extracted = collected.cards.len();

        // 2. Drop seen and blocklisted cards before any model spend.
        let deduped = filter_cards(collected.cards, ledger, blocklist);
        info!(
            survivors = deduped.survivors.len(),
            filtered = deduped.filtered.len(),
            "dedup & block filter applied"
        );

        // 3. Cheap bulk pre-screen.
        let screened = screen_cards(
            &self.ai,
            deduped.survivors,
            &self.preferences,
            &self.config.screen,
        )
        .await?;

        // 4. Expensive per-candidate gate.
        let gated = gate_candidates(
            &self.browser,
            &self.ai,
            screened.shortlisted,
            &self.preferences,
            &self.config.gate,
        )
        .await?;

        // 5. Accumulate: report rows plus the ledger delta. Only fully
        // adjudicated cards are marked seen; anything that failed
        // closed is retried next run.
        let now = Utc::now();
        let mut rows = Vec::new();
        let mut terminal_ids: Vec<String> = Vec::new();
        let mut passed = 0usize;

        for filtered in &deduped.filtered {
            rows.push(ReportRow::skipped(&filtered.card, filtered.reason, now));
        }

        for reject in &screened.rejected {
            rows.push(ReportRow::skipped_with_profile(
                &reject.card,
                &reject.profile,
                reject.reason,
                now,
            ));
            if reject.reason.is_terminal() {
                terminal_ids.push(reject.card.id.clone());
            }
        }

        for record in &gated {
            if record.is_terminal() {
                terminal_ids.push(record.card().id.clone());
            }
            match record {
                GateRecord::Passed {
                    card,
                    profile,
                    skills,
                } => {
                    passed += 1;
                    rows.push(ReportRow::passed(card, profile, skills, now));
                }
                GateRecord::GatedOut {
                    card,
                    profile,
                    reason,
                } => rows.push(ReportRow::gated_out(card, profile, reason.clone(), now)),
                GateRecord::Skipped {
                    card,
                    profile,
                    reason,
                } => rows.push(ReportRow::skipped_with_profile(card, profile, *reason, now)),
            }
        }

        let decided = terminal_ids.len();
        ledger.extend(terminal_ids);

        let outcome = RunOutcome {
            rows,
            passed,
            decided,
            cards_extracted,
            degraded: collected.degraded,
            estimated_cost: self.ai.estimated_cost(),
            started_at,
        };

        info!(
            cards = outcome.cards_extracted,
            passed = outcome.passed,
            decided = outcome.decided,
            degraded = outcome.degraded,
            cost_usd = outcome.estimated_cost,
            "run complete"
        );
        Ok(outcome)
    }
}
