//! Card history, persisted as append-only JSON lines.
//!
//! The store has an explicit lifecycle: it is unavailable until
//! [`HistoryStore::initialize`] succeeds. Before that, reads return an
//! empty history and writes are rejected.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::card::{CitationFields, EvidenceCard};

/// One saved card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Argument the card was cut for
    pub argument: String,
    /// Article URL, when the card was cut from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub card: EvidenceCard,
    /// Citation details entered by the user
    #[serde(default)]
    pub citation: CitationFields,
    /// Hash of the raw generated text
    pub raw_sha256: String,
}

impl HistoryEntry {
    pub fn new(
        argument: impl Into<String>,
        source_url: Option<String>,
        card: EvidenceCard,
        citation: CitationFields,
        raw_sha256: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            argument: argument.into(),
            source_url,
            card,
            citation,
            raw_sha256: raw_sha256.into(),
        }
    }

    /// Citation to display for this entry
    pub fn citation_line(&self) -> String {
        self.citation.resolve(&self.card.citation)
    }
}

/// History store errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History store at {} is not initialized", .path.display())]
    NotInitialized { path: PathBuf },

    #[error("History I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize history entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSONL-backed card history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    ready: bool,
}

impl HistoryStore {
    /// Create an uninitialized store for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ready: false,
        }
    }

    /// Open and initialize the store at the configured history path
    pub fn open_default() -> anyhow::Result<Self> {
        let mut store = Self::new(crate::config::history_path()?);
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Make the store available, creating its parent directory
    pub fn initialize(&mut self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.ready = true;
        debug!(path = %self.path.display(), "History store initialized");
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), HistoryError> {
        if self.ready {
            Ok(())
        } else {
            Err(HistoryError::NotInitialized {
                path: self.path.clone(),
            })
        }
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append an entry under an exclusive file lock
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        self.ensure_ready()?;

        let json = serde_json::to_string(entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.lock_exclusive().map_err(|e| self.io_error(e))?;
        writeln!(file, "{}", json).map_err(|e| self.io_error(e))?;
        file.flush().map_err(|e| self.io_error(e))?;

        // Lock is released when file is dropped
        Ok(())
    }

    /// Entries newest-first, at most `limit` when given
    ///
    /// An uninitialized store or a missing file reads as empty.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !self.ready || !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping unreadable history line");
                }
            }
        }

        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Find the newest entry whose ID starts with `id_prefix`
    pub fn find(&self, id_prefix: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        let prefix = id_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        Ok(self
            .list(None)?
            .into_iter()
            .find(|entry| entry.id.to_string().starts_with(&prefix)))
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.ensure_ready()?;

        // Truncate only once the lock is held
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.lock_exclusive().map_err(|e| self.io_error(e))?;
        file.set_len(0).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Compute SHA256 hash of a byte slice, returning hex string with prefix
///
/// Returns a string in format "sha256:abc123...".
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("sha256:{}", hex::encode(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Dialect;
    use tempfile::TempDir;

    fn entry(argument: &str) -> HistoryEntry {
        let card = EvidenceCard {
            claim: "Claim".to_string(),
            citation: "Cite".to_string(),
            quote: "Quote".to_string(),
            dialect: Dialect::CitationBlock,
        };
        HistoryEntry::new(argument, None, card, CitationFields::default(), compute_hash(b"raw"))
    }

    #[test]
    fn test_uninitialized_store() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::new(temp.path().join("history.jsonl"));

        assert!(!store.is_ready());
        assert!(store.list(None).unwrap().is_empty());
        assert!(matches!(
            store.append(&entry("a")),
            Err(HistoryError::NotInitialized { .. })
        ));
        assert!(matches!(store.clear(), Err(HistoryError::NotInitialized { .. })));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_list_newest_first() {
        let temp = TempDir::new().unwrap();
        let mut store = HistoryStore::new(temp.path().join("nested/history.jsonl"));
        store.initialize().unwrap();

        for argument in ["first", "second", "third"] {
            store.append(&entry(argument)).unwrap();
        }

        let all = store.list(None).unwrap();
        let arguments: Vec<&str> = all.iter().map(|e| e.argument.as_str()).collect();
        assert_eq!(arguments, vec!["third", "second", "first"]);

        let limited = store.list(Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].argument, "third");
    }

    #[test]
    fn test_find_by_prefix_and_clear() {
        let temp = TempDir::new().unwrap();
        let mut store = HistoryStore::new(temp.path().join("history.jsonl"));
        store.initialize().unwrap();

        let saved = entry("findable");
        store.append(&saved).unwrap();

        let prefix = &saved.id.to_string()[..8];
        assert_eq!(store.find(prefix).unwrap(), Some(saved));
        assert_eq!(store.find("").unwrap(), None);

        store.clear().unwrap();
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_clear_then_append() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.jsonl");
        let mut store = HistoryStore::new(&path);
        store.initialize().unwrap();

        store.append(&entry("old")).unwrap();
        store.append(&entry("older")).unwrap();
        store.clear().unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        store.append(&entry("new")).unwrap();
        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].argument, "new");
    }

    #[test]
    fn test_clear_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.jsonl");
        let mut store = HistoryStore::new(&path);
        store.initialize().unwrap();

        store.clear().unwrap();
        assert!(path.exists());
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_lines_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.jsonl");
        let mut store = HistoryStore::new(&path);
        store.initialize().unwrap();

        store.append(&entry("good")).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        let entries = store.list(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].argument, "good");
    }

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash(b"hello");
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64); // "sha256:" + 64 hex chars
    }
}
