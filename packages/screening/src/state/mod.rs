//! Persisted state that survives across runs.

pub mod ledger;

pub use ledger::SeenLedger;
