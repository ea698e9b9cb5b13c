//! Runtime configuration from the environment.
//!
//! Secrets and paths come from env vars (loaded from `.env` by the
//! entry point). State files live together under one directory so a
//! single volume mount covers them.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Everything a run needs from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub resend_api_key: String,
    pub sender_email: String,
    pub recipient_email: String,

    /// Driver endpoint, e.g. `http://localhost:9515`
    pub webdriver_url: String,

    /// Captured search URL; absent until `jobscout capture` has run
    pub search_url: Option<String>,

    /// Chrome profile directory, so the platform login persists
    pub chrome_profile_dir: Option<String>,

    /// Preferences YAML
    pub config_path: PathBuf,

    /// Directory holding the ledger, blocklist, and reports
    pub state_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            resend_api_key: required("RESEND_API_KEY")?,
            sender_email: required("SENDER_EMAIL")?,
            recipient_email: required("RECIPIENT_EMAIL")?,
            webdriver_url: env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            search_url: env::var("SEARCH_URL").ok().filter(|v| !v.trim().is_empty()),
            chrome_profile_dir: env::var("CHROME_PROFILE_DIR").ok(),
            config_path: env::var("SCOUT_CONFIG")
                .unwrap_or_else(|_| "config.yaml".to_string())
                .into(),
            state_dir: env::var("SCOUT_STATE_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
        })
    }

    pub fn seen_path(&self) -> PathBuf {
        self.state_dir.join("seen.json")
    }

    pub fn blocklist_path(&self) -> PathBuf {
        self.state_dir.join("blocklist.json")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.state_dir.join("results")
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set (via environment or .env)"))
}
