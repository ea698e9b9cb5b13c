//! User preference model: target roles, qualitative preferences, and the
//! hard constraints the gate enforces.
//!
//! Pure data, shared read-only across both filtering stages. The YAML
//! file uses the recognized top-level sections `TargetRoles` and
//! `Preferences`; the hard-constraint keys are optional.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScoutError, StateError, StateResult};
use crate::types::decision::WorkMode;

/// Parsed user configuration. Immutable for the run's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Role strings steering Stage-1 relevance
    #[serde(rename = "TargetRoles")]
    pub target_roles: Vec<String>,

    /// Free-text qualitative constraints applied by the gate
    #[serde(rename = "Preferences")]
    pub preferences: Vec<String>,

    /// Reject roles demanding more than this many years of experience
    #[serde(rename = "MaxExperienceYears", default)]
    pub max_experience_years: Option<u8>,

    /// Reject roles that state no visa sponsorship is available
    #[serde(rename = "RequiresSponsorship", default)]
    pub requires_sponsorship: bool,

    /// Reject roles whose stated work mode differs from this one
    #[serde(rename = "WorkMode", default)]
    pub work_mode: Option<WorkMode>,
}

impl Preferences {
    /// Load and validate preferences from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoutError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let prefs: Preferences =
            serde_yaml::from_str(&text).map_err(|source| StateError::InvalidPreferences {
                path: path.to_path_buf(),
                source,
            })?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Reject empty role or preference lists; a run without either would
    /// shortlist everything or gate on nothing.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.target_roles.iter().all(|r| r.trim().is_empty()) {
            return Err(ScoutError::Config {
                reason: "TargetRoles must list at least one role".to_string(),
            });
        }
        if self.preferences.iter().all(|p| p.trim().is_empty()) {
            return Err(ScoutError::Config {
                reason: "Preferences must list at least one constraint".to_string(),
            });
        }
        Ok(())
    }

    /// Target roles joined for prompt interpolation.
    pub fn roles_text(&self) -> String {
        self.target_roles.join(", ")
    }

    /// Qualitative preferences as a bulleted block for prompts.
    pub fn preferences_text(&self) -> String {
        self.preferences
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Employer names excluded unconditionally. Read-only during the run;
/// the user edits the file between runs.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    names: HashSet<String>,
}

impl Blocklist {
    /// Build from an iterator of company names.
    pub fn from_names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|n| n.into().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Load from a JSON array file. A missing file is an empty blocklist;
    /// an unreadable or corrupt file is fatal.
    pub fn load(path: impl AsRef<Path>) -> StateResult<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let names: Vec<String> = serde_json::from_str(text.trim().trim_start_matches('\u{feff}'))
            .map_err(|source| StateError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_names(names))
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, company: &str) -> bool {
        self.names.contains(&company.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
