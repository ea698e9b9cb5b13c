//! Two-Stage Job Screening Pipeline
//!
//! Automates discovery of job postings on a web platform, filters them
//! against a user's stated preferences with a two-stage language-model
//! pipeline, and produces a deduplicated result set for a dated report.
//!
//! # Design Philosophy
//!
//! - Cheap before expensive: Stage-1 shortlists from card-level fields
//!   only; Stage-2 reads full descriptions for survivors
//! - Fail closed: malformed model output rejects, never passes
//! - State is explicit: the ledger and preferences are passed in, so
//!   every stage runs against injected fakes
//! - Single actor, single run: durability is a flat seen-job ledger,
//!   committed once, after every gate check reaches a terminal state
//!
//! # Usage
//!
//! ```rust,ignore
//! use screening::{Blocklist, Pipeline, Preferences, SeenLedger};
//! use screening::testing::{MockAi, MockBrowser};
//!
//! let preferences = Preferences::load("config.yaml")?;
//! let mut ledger = SeenLedger::load("seen.json")?;
//! let blocklist = Blocklist::load("blocklist.json")?;
//!
//! let pipeline = Pipeline::new(MockBrowser::new(), MockAi::new(), preferences);
//! let outcome = pipeline.run(search_url, &mut ledger, &blocklist).await?;
//!
//! ledger.commit("seen.json")?;   // always before emitting the report
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions ([`Browser`], [`Ai`])
//! - [`types`] - Cards, decisions, preferences, report rows
//! - [`pipeline`] - The four stages and the run orchestrator
//! - [`state`] - The persisted seen-job ledger
//! - [`testing`] - Scripted mocks for both collaborators

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

#[cfg(feature = "browser-webdriver")]
pub mod browser;

// Re-export core types at crate root
pub use config::{GateConfig, RunConfig, ScreenConfig, ScrollConfig};
pub use error::{AiError, BrowserError, Result, ScoutError, StateError};
pub use pipeline::{Pipeline, RunOutcome};
pub use state::SeenLedger;
pub use traits::{Ai, Browser};
pub use types::{
    Blocklist, CardProfile, FitLabel, GateDecision, GateVerdict, JobCard, JobDescription,
    Preferences, RawCard, ReportRow, ScreenDecision, ScreenVerdict, SkipReason, WorkMode,
};

#[cfg(feature = "openai")]
pub use ai::OpenAiClient;

#[cfg(feature = "browser-webdriver")]
pub use browser::WebDriverBrowser;
