//! Last-ticket persistence.
//!
//! A single durable key: the ticket id of the most recent successful
//! booking, stored as one JSON file under the client's data directory.
//! Read once at startup, written on booking, cleared when the
//! pointed-to ticket is cancelled. Never polled.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const POINTER_FILE: &str = "last_ticket.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointerDoc {
    last_ticket: String,
    updated_at: DateTime<Utc>,
}

/// Durable pointer to the most recent successful booking.
pub struct TicketStore {
    root: PathBuf,
}

impl TicketStore {
    /// Creates a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE)
    }

    /// The persisted ticket id, or `None` when absent.
    ///
    /// An unreadable or corrupt pointer file degrades to "absent" with a
    /// warning; the startup path never fails on it.
    pub fn get(&self) -> Option<String> {
        let path = self.pointer_path();
        if !path.exists() {
            return None;
        }
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_str::<PointerDoc>(&contents) {
            Ok(doc) => Some(doc.last_ticket),
            Err(err) => {
                warn!("ignoring corrupt pointer file {}: {err}", path.display());
                None
            }
        }
    }

    /// Records a new last ticket, replacing any previous pointer.
    pub fn set(&self, ticket_id: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let doc = PointerDoc {
            last_ticket: ticket_id.to_string(),
            updated_at: Utc::now(),
        };
        let serialized =
            serde_json::to_string_pretty(&doc).context("failed to serialize ticket pointer")?;
        let path = self.pointer_path();
        fs::write(&path, serialized).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Forgets the last ticket.
    pub fn clear(&self) -> Result<()> {
        let path = self.pointer_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    /// Clears the pointer only when it equals `ticket_id`; returns
    /// whether a clear happened. Cancelling an unrelated ticket leaves
    /// the pointer alone, and a second matching call is a no-op.
    pub fn clear_if_matches(&self, ticket_id: &str) -> Result<bool> {
        match self.get() {
            Some(current) if current.eq_ignore_ascii_case(ticket_id.trim()) => {
                self.clear()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_pointer_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = TicketStore::new(dir.path());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn set_get_clear_round_trip() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = TicketStore::new(dir.path());

        store.set("AB12CD34")?;
        assert_eq!(store.get().as_deref(), Some("AB12CD34"));

        store.set("FEEDBEEF")?;
        assert_eq!(store.get().as_deref(), Some("FEEDBEEF"));

        store.clear()?;
        assert_eq!(store.get(), None);
        store.clear()?;
        Ok(())
    }

    #[test]
    fn clear_if_matches_only_clears_its_own_ticket() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = TicketStore::new(dir.path());
        store.set("AB12CD34")?;

        assert!(!store.clear_if_matches("OTHER001")?);
        assert_eq!(store.get().as_deref(), Some("AB12CD34"));

        assert!(store.clear_if_matches("ab12cd34")?, "ids match case-insensitively");
        assert_eq!(store.get(), None);

        // The pointer is already gone; a repeat cancellation must not
        // report a second clear.
        assert!(!store.clear_if_matches("AB12CD34")?);
        Ok(())
    }

    #[test]
    fn corrupt_pointer_files_degrade_to_absent() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = TicketStore::new(dir.path());
        fs::create_dir_all(dir.path())?;
        fs::write(dir.path().join(POINTER_FILE), "{not json")?;
        assert_eq!(store.get(), None);
        Ok(())
    }
}
