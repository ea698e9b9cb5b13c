//! Filter decisions produced by the two screening stages.

use serde::{Deserialize, Serialize};

/// Work-mode requirement or extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkMode {
    #[serde(rename = "Remote")]
    Remote,
    #[serde(rename = "Hybrid")]
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

impl WorkMode {
    /// Human-readable label, matching the report column values.
    pub fn label(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::OnSite => "On-site",
        }
    }
}

/// Card-level fields normalized by Stage-1 from the raw card text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardProfile {
    /// Official position title
    pub title: String,

    /// Employer name as written
    pub employer: Option<String>,

    /// Geographic location, stripped of work-mode phrases
    pub location: Option<String>,

    /// Salary text if explicitly stated
    pub salary: Option<String>,

    /// Work mode if the card stated one
    pub work_mode: Option<WorkMode>,
}

/// Stage-1 verdict for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenVerdict {
    /// Relevant to the target roles; forwarded to the gate
    Shortlisted,
    /// Obviously unrelated; dropped
    Rejected,
}

/// Stage-1 decision: verdict plus the normalized card fields.
#[derive(Debug, Clone)]
pub struct ScreenDecision {
    pub verdict: ScreenVerdict,
    pub profile: CardProfile,
}

impl ScreenDecision {
    /// Shortlist with a profile.
    pub fn shortlisted(profile: CardProfile) -> Self {
        Self {
            verdict: ScreenVerdict::Shortlisted,
            profile,
        }
    }

    /// Reject with a profile.
    pub fn rejected(profile: CardProfile) -> Self {
        Self {
            verdict: ScreenVerdict::Rejected,
            profile,
        }
    }

    pub fn is_shortlisted(&self) -> bool {
        self.verdict == ScreenVerdict::Shortlisted
    }
}

/// Stage-2 verdict for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Clears every hard requirement
    Passed,
    /// Violates a hard requirement, or the check could not be completed
    GatedOut,
}

/// Stage-2 decision against the hard requirements.
#[derive(Debug, Clone)]
pub struct GateDecision {
    pub verdict: GateVerdict,

    /// Reason code plus brief detail (`YEAR_EXCEED_MIN - asks for 6y`),
    /// absent for a clean pass
    pub reason: Option<String>,

    /// Concrete hard skills named in the description
    pub skills: Vec<String>,
}

impl GateDecision {
    /// A clean pass.
    pub fn passed(skills: Vec<String>) -> Self {
        Self {
            verdict: GateVerdict::Passed,
            reason: None,
            skills,
        }
    }

    /// Gated out with a reason code.
    pub fn gated_out(reason: impl Into<String>) -> Self {
        Self {
            verdict: GateVerdict::GatedOut,
            reason: Some(reason.into()),
            skills: Vec::new(),
        }
    }

    /// Attach extracted skills.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn is_passed(&self) -> bool {
        self.verdict == GateVerdict::Passed
    }
}

/// Why a card left the pipeline before or instead of passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Identifier already in the ledger from a prior run
    SeenJob,
    /// Employer is on the blocklist
    BlockedEmployer,
    /// Stage-1 judged the card unrelated to the target roles
    PreScreenRejected,
    /// Stage-1 batch output was malformed; batch failed closed
    ScreenFailedClosed,
    /// The listing is a repost of one already adjudicated
    Reposted,
    /// Stage-2 gated the candidate out on a hard requirement
    GatedOut,
    /// The description fetch failed; gated out conservatively
    FetchFailed,
    /// The gate model call failed; gated out conservatively
    GateFailed,
}

impl SkipReason {
    /// Stable reason code for report rows.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::SeenJob => "SEEN_JOB",
            SkipReason::BlockedEmployer => "BLOCKLISTED_EMPLOYER",
            SkipReason::PreScreenRejected => "PRE_SCREEN_FILTERED_OUT",
            SkipReason::ScreenFailedClosed => "PRE_SCREEN_FAILED_CLOSED",
            SkipReason::Reposted => "REPOSTED_JOB",
            SkipReason::GatedOut => "GATED_OUT",
            SkipReason::FetchFailed => "JD_FETCH_FAILED",
            SkipReason::GateFailed => "GATE_CALL_FAILED",
        }
    }

    /// Whether this outcome counts as a terminal decision for the ledger.
    ///
    /// Blocklist skips are re-derived for free every run (and must react
    /// to blocklist edits), and fail-closed screen batches are meant to
    /// be retried next run, so neither is marked seen. Seen jobs are in
    /// the ledger already.
    pub fn is_terminal(&self) -> bool {
        match self {
            SkipReason::PreScreenRejected
            | SkipReason::Reposted
            | SkipReason::GatedOut
            | SkipReason::FetchFailed
            | SkipReason::GateFailed => true,
            SkipReason::SeenJob | SkipReason::BlockedEmployer | SkipReason::ScreenFailedClosed => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_reasons_match_retry_policy() {
        assert!(SkipReason::PreScreenRejected.is_terminal());
        assert!(SkipReason::GatedOut.is_terminal());
        assert!(SkipReason::Reposted.is_terminal());
        // Retried next run.
        assert!(!SkipReason::ScreenFailedClosed.is_terminal());
        // Re-derived for free every run.
        assert!(!SkipReason::BlockedEmployer.is_terminal());
        assert!(!SkipReason::SeenJob.is_terminal());
    }

    #[test]
    fn gate_decision_builders() {
        let pass = GateDecision::passed(vec!["Python".into(), "SQL".into()]);
        assert!(pass.is_passed());
        assert!(pass.reason.is_none());

        let out = GateDecision::gated_out("NO_SPONSORSHIP");
        assert!(!out.is_passed());
        assert_eq!(out.reason.as_deref(), Some("NO_SPONSORSHIP"));
    }
}
