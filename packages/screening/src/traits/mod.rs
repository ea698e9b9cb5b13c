//! Trait abstractions for the external collaborators.

pub mod ai;
pub mod browser;

pub use ai::Ai;
pub use browser::Browser;
