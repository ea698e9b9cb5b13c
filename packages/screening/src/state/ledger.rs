//! Seen-job ledger: the append-only set of identifiers already fully
//! adjudicated in any prior run.
//!
//! Loaded fully at run start, rewritten once at end-of-run commit. The
//! in-memory set only grows; a crash before commit loses this run's
//! additions, which is safe - undecided jobs are simply retried.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StateError, StateResult};

/// Persisted set of previously processed job identifiers.
#[derive(Debug, Default)]
pub struct SeenLedger {
    ids: HashSet<String>,
    loaded: usize,
}

impl SeenLedger {
    /// Create an empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator of ids (for tests and fakes).
    pub fn from_ids(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let ids: HashSet<String> = ids.into_iter().map(|i| i.into()).collect();
        let loaded = ids.len();
        Self { ids, loaded }
    }

    /// Load the ledger file. A missing file is a first run (empty
    /// ledger); anything else unreadable is fatal.
    pub fn load(path: impl AsRef<Path>) -> StateResult<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ledger file, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }

        let ids: Vec<String> =
            serde_json::from_str(trimmed).map_err(|source| StateError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_ids(ids))
    }

    /// Membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Append ids adjudicated this run. The set never shrinks.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = impl Into<String>>) {
        self.ids.extend(ids.into_iter().map(|i| i.into()));
    }

    /// Number of ids currently held.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// How many ids were added since load.
    pub fn added_this_run(&self) -> usize {
        self.ids.len() - self.loaded
    }

    /// Rewrite the ledger file with the updated set.
    ///
    /// Writes to a sibling temp file first so a crash mid-write cannot
    /// truncate the existing ledger.
    pub fn commit(&self, path: impl AsRef<Path>) -> StateResult<()> {
        let path = path.as_ref();
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();

        let body = serde_json::to_string(&ids).map_err(|source| StateError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = tmp_path(path);
        std::fs::write(&tmp, body).map_err(|source| StateError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), count = self.ids.len(), "ledger committed");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SeenLedger::load(dir.path().join("seen.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn load_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "{{{").unwrap();
        assert!(matches!(
            SeenLedger::load(&path),
            Err(StateError::Corrupt { .. })
        ));
    }

    #[test]
    fn commit_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");

        let mut ledger = SeenLedger::from_ids(["job-1"]);
        ledger.extend(["job-2", "job-3"]);
        ledger.commit(&path).unwrap();

        let reloaded = SeenLedger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains("job-1"));
        assert!(reloaded.contains("job-3"));
    }

    #[test]
    fn ledger_is_monotonic() {
        let mut ledger = SeenLedger::from_ids(["a", "b"]);
        ledger.extend(["b", "c"]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.added_this_run(), 1);
        assert!(ledger.contains("a"));
    }

    #[test]
    fn empty_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(SeenLedger::load(&path).unwrap().is_empty());
    }
}
