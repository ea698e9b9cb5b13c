//! Typed errors for the screening pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on error kinds. The distinction that matters at the run boundary is
//! fatal vs. absorbable: collaborator-unreachable and state-integrity
//! failures abort the run, everything else is converted into a
//! conservative decision by the stage that saw it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a pipeline run.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Browser collaborator failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Language-model collaborator failed
    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    /// Persisted state (ledger, blocklist) could not be read or written
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Invalid configuration
    #[error("config error: {reason}")]
    Config { reason: String },
}

/// Errors from the browser-automation collaborator.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The driver endpoint is not reachable at all.
    ///
    /// Fatal for the run; a retry wrapper can be layered on top by
    /// matching this variant.
    #[error("browser unreachable: {0}")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Navigation to a URL failed
    #[error("navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    /// A page fetch failed (single-card scope, absorbed by the gate)
    #[error("page fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Script execution or element lookup failed
    #[error("page interaction failed: {0}")]
    Interaction(String),
}

/// Errors from the language-model collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    /// The model service is not reachable at all. Fatal for the run.
    #[error("AI service unreachable: {0}")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The API returned a non-success status
    #[error("AI API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Structured output did not match the expected schema.
    ///
    /// The stage that sees this fails closed rather than guessing.
    #[error("schema violation: {reason}")]
    SchemaViolation { reason: String },

    /// A single call timed out (treated as that call's failure, not a
    /// run-level abort)
    #[error("AI call timed out")]
    Timeout,
}

impl AiError {
    /// Whether this error should abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AiError::Unreachable(_))
    }
}

impl BrowserError {
    /// Whether this error should abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BrowserError::Unreachable(_))
    }
}

/// Errors reading or writing persisted state.
///
/// Always fatal: continuing without ledger correctness risks duplicate
/// billing and duplicate reports.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem I/O failed
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not parse
    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The preferences file does not parse
    #[error("invalid preferences file {path}: {source}")]
    InvalidPreferences {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for browser operations.
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Result type alias for AI operations.
pub type AiResult<T> = std::result::Result<T, AiError>;

/// Result type alias for state operations.
pub type StateResult<T> = std::result::Result<T, StateError>;
