//! Stage-2 gate: strict pass/fail check against the hard requirements.
//!
//! Each shortlisted candidate gets its full description fetched, a
//! repost check, and a gate call. Gate checks are independent per card
//! and run under a bounded concurrency limit; the caller's ledger
//! commit waits for every check to reach a terminal state.
//!
//! The gate is precision-critical and fails conservatively: a fetch
//! failure, model failure, or ambiguous output gates the single card
//! out and never aborts the run.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::GateConfig;
use crate::error::{Result, ScoutError};
use crate::pipeline::screen::ScreenedCard;
use crate::traits::{ai::Ai, browser::Browser};
use crate::types::card::JobCard;
use crate::types::decision::{CardProfile, SkipReason};
use crate::types::description::JobDescription;
use crate::types::preferences::Preferences;

/// Terminal state of one gate check.
#[derive(Debug, Clone)]
pub enum GateRecord {
    /// Clears every hard requirement; goes in the report
    Passed {
        card: JobCard,
        profile: CardProfile,
        skills: Vec<String>,
    },

    /// Violates a hard requirement
    GatedOut {
        card: JobCard,
        profile: CardProfile,
        reason: String,
    },

    /// Left the gate without a model verdict (repost, fetch failure,
    /// model failure)
    Skipped {
        card: JobCard,
        profile: CardProfile,
        reason: SkipReason,
    },
}

impl GateRecord {
    pub fn card(&self) -> &JobCard {
        match self {
            GateRecord::Passed { card, .. }
            | GateRecord::GatedOut { card, .. }
            | GateRecord::Skipped { card, .. } => card,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, GateRecord::Passed { .. })
    }

    /// Whether this record counts as fully adjudicated for the ledger.
    pub fn is_terminal(&self) -> bool {
        match self {
            GateRecord::Passed { .. } | GateRecord::GatedOut { .. } => true,
            GateRecord::Skipped { reason, .. } => reason.is_terminal(),
        }
    }
}

/// Run the gate over all shortlisted candidates.
///
/// Returns records in candidate order. Only collaborator-unreachable
/// errors propagate; they abort before the caller commits the ledger.
pub async fn gate_candidates<B: Browser, A: Ai>(
    browser: &B,
    ai: &A,
    candidates: Vec<ScreenedCard>,
    preferences: &Preferences,
    config: &GateConfig,
) -> Result<Vec<GateRecord>> {
    info!(
        candidates = candidates.len(),
        concurrency = config.concurrency,
        "gating shortlisted candidates"
    );

    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let checks = candidates.into_iter().map(|candidate| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.unwrap();
            gate_one(browser, ai, candidate, preferences).await
        }
    });

    // Single synchronization barrier: every check reaches a terminal
    // state (or a fatal error) before anything downstream runs.
    let results = join_all(checks).await;

    let mut records = Vec::with_capacity(results.len());
    for result in results {
        records.push(result?);
    }
    Ok(records)
}

async fn gate_one<B: Browser, A: Ai>(
    browser: &B,
    ai: &A,
    candidate: ScreenedCard,
    preferences: &Preferences,
) -> Result<GateRecord> {
    let ScreenedCard { card, profile } = candidate;

    let page_text = match browser.fetch_page(&card.link).await {
        Ok(text) => text,
        Err(e) if e.is_fatal() => return Err(ScoutError::Browser(e)),
        Err(e) => {
            warn!(id = %card.id, error = %e, "description fetch failed, gating out");
            return Ok(GateRecord::Skipped {
                card,
                profile,
                reason: SkipReason::FetchFailed,
            });
        }
    };

    let description = JobDescription::from_page(&card.link, &page_text);

    if description.reposted {
        debug!(id = %card.id, "repost detected, skipping without a gate call");
        return Ok(GateRecord::Skipped {
            card,
            profile,
            reason: SkipReason::Reposted,
        });
    }

    match ai.gate_check(&card, &description, preferences).await {
        Ok(decision) if decision.is_passed() => Ok(GateRecord::Passed {
            card,
            profile,
            skills: decision.skills,
        }),
        Ok(decision) => Ok(GateRecord::GatedOut {
            card,
            profile,
            reason: decision
                .reason
                .unwrap_or_else(|| SkipReason::GatedOut.code().to_string()),
        }),
        Err(e) if e.is_fatal() => Err(ScoutError::Ai(e)),
        Err(e) => {
            warn!(id = %card.id, error = %e, "gate call failed, gating out");
            Ok(GateRecord::Skipped {
                card,
                profile,
                reason: SkipReason::GateFailed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jd_page, MockAi, MockBrowser};
    use crate::types::decision::GateDecision;

    fn candidate(id: &str, title: &str) -> ScreenedCard {
        ScreenedCard {
            card: JobCard::new(
                id,
                title,
                "Some Co",
                format!("https://jobs.example.com/view/{id}/"),
            ),
            profile: CardProfile {
                title: title.to_string(),
                ..Default::default()
            },
        }
    }

    fn prefs() -> Preferences {
        Preferences {
            target_roles: vec!["Data Scientist".into()],
            preferences: vec!["full-time only".into()],
            max_experience_years: Some(4),
            requires_sponsorship: false,
            work_mode: None,
        }
    }

    #[tokio::test]
    async fn schema_error_never_passes() {
        let link = "https://jobs.example.com/view/job-1/";
        let browser = MockBrowser::new().with_page(link, jd_page("A fine role"));
        let ai = MockAi::new().fail_gate_for("job-1");

        let records = gate_candidates(
            &browser,
            &ai,
            vec![candidate("job-1", "Data Scientist")],
            &prefs(),
            &GateConfig::new(),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert!(!records[0].is_passed());
        assert!(matches!(
            records[0],
            GateRecord::Skipped {
                reason: SkipReason::GateFailed,
                ..
            }
        ));
        // Still a terminal decision - billed once, never retried.
        assert!(records[0].is_terminal());
    }

    #[tokio::test]
    async fn fetch_failure_gates_out_single_card() {
        let good = "https://jobs.example.com/view/job-2/";
        let browser = MockBrowser::new()
            .with_page(good, jd_page("Great role"))
            .fail_page("https://jobs.example.com/view/job-1/");
        let ai = MockAi::new();

        let records = gate_candidates(
            &browser,
            &ai,
            vec![candidate("job-1", "Data Scientist"), candidate("job-2", "Data Scientist")],
            &prefs(),
            &GateConfig::new(),
        )
        .await
        .unwrap();

        let failed = records.iter().find(|r| r.card().id == "job-1").unwrap();
        assert!(matches!(
            failed,
            GateRecord::Skipped {
                reason: SkipReason::FetchFailed,
                ..
            }
        ));
        let ok = records.iter().find(|r| r.card().id == "job-2").unwrap();
        assert!(ok.is_passed());
    }

    #[tokio::test]
    async fn repost_skips_without_billing() {
        let link = "https://jobs.example.com/view/job-1/";
        let page = format!("Reposted 3 days ago\n{}", jd_page("Same role again"));
        let browser = MockBrowser::new().with_page(link, page);
        let ai = MockAi::new();

        let records = gate_candidates(
            &browser,
            &ai,
            vec![candidate("job-1", "Data Scientist")],
            &prefs(),
            &GateConfig::new(),
        )
        .await
        .unwrap();

        assert!(matches!(
            records[0],
            GateRecord::Skipped {
                reason: SkipReason::Reposted,
                ..
            }
        ));
        assert_eq!(ai.gate_calls(), 0);
    }

    #[tokio::test]
    async fn gated_out_keeps_model_reason() {
        let link = "https://jobs.example.com/view/job-1/";
        let browser = MockBrowser::new().with_page(link, jd_page("5+ years required"));
        let ai = MockAi::new().with_gate_decision(
            "job-1",
            GateDecision::gated_out("YEAR_EXCEED_MIN - asks for 5 years"),
        );

        let records = gate_candidates(
            &browser,
            &ai,
            vec![candidate("job-1", "Data Scientist")],
            &prefs(),
            &GateConfig::new(),
        )
        .await
        .unwrap();

        match &records[0] {
            GateRecord::GatedOut { reason, .. } => {
                assert!(reason.starts_with("YEAR_EXCEED_MIN"));
            }
            other => panic!("expected GatedOut, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_model_aborts_the_gate() {
        let link = "https://jobs.example.com/view/job-1/";
        let browser = MockBrowser::new().with_page(link, jd_page("A role"));
        let ai = MockAi::new().unreachable();

        let result = gate_candidates(
            &browser,
            &ai,
            vec![candidate("job-1", "Data Scientist")],
            &prefs(),
            &GateConfig::new(),
        )
        .await;

        assert!(matches!(result, Err(ScoutError::Ai(e)) if e.is_fatal()));
    }
}
