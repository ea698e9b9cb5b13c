//! Ai trait - the language-model collaborator.
//!
//! Two operations, one per stage. Both must return structured,
//! schema-validated output; a violation surfaces as
//! [`AiError::SchemaViolation`](crate::error::AiError::SchemaViolation)
//! rather than a crash, and the calling stage fails closed.

use async_trait::async_trait;

use crate::error::AiResult;
use crate::types::card::JobCard;
use crate::types::decision::{GateDecision, ScreenDecision};
use crate::types::description::JobDescription;
use crate::types::preferences::Preferences;

/// Language-model collaborator.
#[async_trait]
pub trait Ai: Send + Sync {
    /// Stage-1: shortlist a batch of cards against the target roles.
    ///
    /// Operates on card-level fields only - this is the cost-control
    /// boundary. Must return exactly one decision per input card, in
    /// input order. Decisions must not depend on batch placement.
    async fn screen_batch(
        &self,
        cards: &[JobCard],
        preferences: &Preferences,
    ) -> AiResult<Vec<ScreenDecision>>;

    /// Stage-2: strict pass/fail gate for one candidate against the
    /// hard requirements, using the full description text.
    async fn gate_check(
        &self,
        card: &JobCard,
        description: &JobDescription,
        preferences: &Preferences,
    ) -> AiResult<GateDecision>;

    /// Estimated spend accumulated across this run's calls, in USD.
    fn estimated_cost(&self) -> f64 {
        0.0
    }
}
