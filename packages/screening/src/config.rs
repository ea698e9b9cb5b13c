//! Tunable configuration for a pipeline run.
//!
//! The scroll-stability bound is deliberately a parameter, not a
//! constant: what counts as a "stable" feed varies by site and network.

use serde::{Deserialize, Serialize};

/// Configuration for the card extractor's scroll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Consecutive scrolls with no new card ids before the feed counts
    /// as stable
    pub stable_rounds: usize,

    /// Upper bound on scroll attempts; hitting it ends extraction with
    /// a degraded (partial) card set
    pub max_rounds: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            stable_rounds: 2,
            max_rounds: 40,
        }
    }
}

impl ScrollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stable_rounds(mut self, rounds: usize) -> Self {
        self.stable_rounds = rounds.max(1);
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }
}

/// Configuration for Stage-1 batching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Per-call character budget for the rendered card text. A batch
    /// never splits a card; one oversized card still goes out alone.
    pub batch_budget_chars: usize,

    /// Hard cap on cards per batch regardless of budget
    pub max_batch_cards: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            batch_budget_chars: 6_000,
            max_batch_cards: 25,
        }
    }
}

impl ScreenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_budget_chars(mut self, budget: usize) -> Self {
        self.batch_budget_chars = budget;
        self
    }

    pub fn with_max_batch_cards(mut self, max: usize) -> Self {
        self.max_batch_cards = max.max(1);
        self
    }
}

/// Configuration for the Stage-2 gate pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Concurrent gate checks in flight; keep small to respect model
    /// rate limits
    pub concurrency: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { concurrency: 2 }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub scroll: ScrollConfig,
    pub screen: ScreenConfig,
    pub gate: GateConfig,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_screen(mut self, screen: ScreenConfig) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_degenerate_values() {
        assert_eq!(ScrollConfig::new().with_stable_rounds(0).stable_rounds, 1);
        assert_eq!(ScreenConfig::new().with_max_batch_cards(0).max_batch_cards, 1);
        assert_eq!(GateConfig::new().with_concurrency(0).concurrency, 1);
    }
}
