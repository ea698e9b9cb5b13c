//! The run's finished record set, handed to the report emitter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::card::JobCard;
use crate::types::decision::{CardProfile, SkipReason};

/// Fit label for a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitLabel {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "skip")]
    Skip,
}

/// One row of the run report. Serializes straight into the CSV emitter.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    #[serde(rename = "addDate")]
    pub added_at: String,

    #[serde(rename = "jobId")]
    pub job_id: String,

    #[serde(rename = "employerName")]
    pub employer: String,

    #[serde(rename = "positionTitle")]
    pub title: String,

    #[serde(rename = "location")]
    pub location: String,

    #[serde(rename = "salary")]
    pub salary: String,

    #[serde(rename = "remote")]
    pub work_mode: String,

    #[serde(rename = "skills")]
    pub skills: String,

    #[serde(rename = "descriptionURL")]
    pub url: String,

    #[serde(rename = "isFit")]
    pub fit: FitLabel,

    #[serde(rename = "reason")]
    pub reason: String,
}

impl ReportRow {
    fn base(card: &JobCard, fit: FitLabel, at: DateTime<Utc>) -> Self {
        Self {
            added_at: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            job_id: card.id.clone(),
            employer: card.company.clone(),
            title: card.title.clone(),
            location: String::new(),
            salary: String::new(),
            work_mode: String::new(),
            skills: String::new(),
            url: card.link.clone(),
            fit,
            reason: String::new(),
        }
    }

    /// Overlay the fields Stage-1 normalized onto the row.
    fn apply_profile(mut self, profile: &CardProfile) -> Self {
        if !profile.title.trim().is_empty() {
            self.title = profile.title.clone();
        }
        if let Some(employer) = &profile.employer {
            self.employer = employer.clone();
        }
        self.location = profile.location.clone().unwrap_or_default();
        self.salary = profile.salary.clone().unwrap_or_default();
        self.work_mode = profile
            .work_mode
            .map(|m| m.label().to_string())
            .unwrap_or_default();
        self
    }

    /// Row for a gate-passed job.
    pub fn passed(
        card: &JobCard,
        profile: &CardProfile,
        skills: &[String],
        at: DateTime<Utc>,
    ) -> Self {
        let mut row = Self::base(card, FitLabel::Yes, at).apply_profile(profile);
        row.skills = skills.join(", ");
        row
    }

    /// Row for a gate-rejected candidate.
    pub fn gated_out(
        card: &JobCard,
        profile: &CardProfile,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let mut row = Self::base(card, FitLabel::No, at).apply_profile(profile);
        row.reason = reason.into();
        row
    }

    /// Row for a card that left the pipeline without a gate check.
    pub fn skipped(card: &JobCard, reason: SkipReason, at: DateTime<Utc>) -> Self {
        let mut row = Self::base(card, FitLabel::Skip, at);
        row.reason = reason.code().to_string();
        row
    }

    /// Same, but with the Stage-1 profile already available.
    pub fn skipped_with_profile(
        card: &JobCard,
        profile: &CardProfile,
        reason: SkipReason,
        at: DateTime<Utc>,
    ) -> Self {
        let mut row = Self::base(card, FitLabel::Skip, at).apply_profile(profile);
        row.reason = reason.code().to_string();
        row
    }
}
