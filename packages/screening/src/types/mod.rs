//! Data types for the screening pipeline.

pub mod card;
pub mod decision;
pub mod description;
pub mod preferences;
pub mod report;

pub use card::{JobCard, RawCard};
pub use decision::{CardProfile, GateDecision, GateVerdict, ScreenDecision, ScreenVerdict, SkipReason, WorkMode};
pub use description::JobDescription;
pub use preferences::{Blocklist, Preferences};
pub use report::{FitLabel, ReportRow};
