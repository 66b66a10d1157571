//! Append-only conversation memory persisted as a JSON log.
//!
//! The whole log is rewritten after every append as a pretty-printed JSON
//! array. Writes go to a `.tmp` sibling which is then renamed over the
//! log, so a crash mid-write leaves the previous version intact.
//!
//! All access goes through one `tokio::sync::Mutex`; concurrent runs on the
//! HTTP server append one at a time.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use research_harness_core::memory::rank_entries;
use research_harness_core::MemoryEntry;

pub struct MemoryStore {
    path: PathBuf,
    entries: Mutex<Vec<MemoryEntry>>,
}

impl MemoryStore {
    /// Load the log at `path`. A missing or unreadable file yields an empty
    /// store. An unparseable file is renamed to a `.corrupt` sibling first so
    /// the next append does not overwrite it.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Vec<MemoryEntry>>(&content) {
                Ok(entries) => {
                    tracing::debug!(path = %path.display(), count = entries.len(), "loaded memory");
                    entries
                }
                Err(e) => {
                    let moved = quarantine(&path).await;
                    tracing::warn!(
                        path = %path.display(),
                        moved_to = ?moved,
                        error = %e,
                        "memory log is not valid JSON; starting empty"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read memory log; starting empty");
                Vec::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped entry and rewrite the log.
    ///
    /// A failed write is logged and does not roll back the in-memory entry.
    pub async fn add_entry(&self, question: &str, answer: &str, citations: Vec<String>) -> MemoryEntry {
        let entry = MemoryEntry::new(question, answer, citations);
        let mut entries = self.entries.lock().await;
        entries.push(entry.clone());

        if let Err(e) = persist(&self.path, &entries).await {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write memory log");
        }
        entry
    }

    /// Entries most relevant to `query`, best first, at most `limit`.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<MemoryEntry> {
        let entries = self.entries.lock().await;
        rank_entries(query, &entries, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of every entry in insertion order.
    pub async fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Move an unparseable log out of the way, returning where it went.
async fn quarantine(path: &Path) -> Option<PathBuf> {
    let target = sibling(path, ".corrupt");
    match tokio::fs::rename(path, &target).await {
        Ok(()) => Some(target),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not move aside unreadable memory log");
            None
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

async fn persist(path: &Path, entries: &[MemoryEntry]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(entries)?;
    let tmp = sibling(path, ".tmp");

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::load(tmp.path().join("none.json")).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("memory.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = MemoryStore::load(&path).await;
        assert!(store.is_empty().await);
        assert!(!path.exists());
        let kept = std::fs::read_to_string(tmp.path().join("memory.json.corrupt")).unwrap();
        assert_eq!(kept, "{not json");
    }

    #[tokio::test]
    async fn test_log_is_pretty_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("memory.json");
        let store = MemoryStore::load(&path).await;
        store.add_entry("q", "a", vec!["https://x".to_string()]).await;

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["question"], "q");
        assert_eq!(parsed[0]["citations"][0], "https://x");
        assert!(parsed[0]["timestamp"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_entry() {
        let tmp = TempDir::new().unwrap();
        // a directory where the file should be makes the rename fail
        let path = tmp.path().join("memory.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let store = MemoryStore::load(&path).await;
        store.add_entry("q", "a", Vec::new()).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_search_uses_overlap() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::load(tmp.path().join("m.json")).await;
        store
            .add_entry("python error handling", "check the traceback", Vec::new())
            .await;
        store.add_entry("rust traits", "use generics", Vec::new()).await;

        let hits = store.search("python errors", 3).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].question, "python error handling");
    }
}
