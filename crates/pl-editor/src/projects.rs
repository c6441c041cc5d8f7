//! Named project persistence.
//!
//! The whole collection lives as one JSON array under a single storage key:
//!
//! ```json
//! [{ "id": "1718000000000", "name": "Poster", "timestamp": 1718000000000, "snapshot": { ... } }]
//! ```
//!
//! Every write re-serializes and replaces the entire array, so the stored
//! value is always either the previous collection or the new one. Reads are
//! forgiving: a missing or unparseable value reads as an empty collection,
//! and a single entry that fails to decode is skipped without hiding the
//! rest. Writes keep such entries in place.
//! This is convenience state for the user, not an authoritative record.

use chrono::{DateTime, Utc};
use pl_core::clock::Clock;
use pl_core::storage::{Storage, StorageError};
use pl_core::Snapshot;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A named, persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord<S> {
    pub id: String,
    pub name: String,
    /// Last write, in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Earlier web builds stored this field as `canvasData`.
    #[serde(alias = "canvasData")]
    pub snapshot: S,
}

impl<S> ProjectRecord<S> {
    /// Calendar date of the last write (`YYYY-MM-DD`, UTC), as shown next
    /// to the project name in the project list.
    pub fn saved_on(&self) -> String {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize project collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// CRUD over the project collection in a `Storage` backend.
pub struct ProjectStore<S, B, C> {
    backend: B,
    clock: C,
    key: String,
    _snapshot: PhantomData<fn() -> S>,
}

impl<S: Snapshot, B: Storage, C: Clock> ProjectStore<S, B, C> {
    pub fn new(backend: B, clock: C, key: impl Into<String>) -> Self {
        Self {
            backend,
            clock,
            key: key.into(),
            _snapshot: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// All projects in insertion order. Never fails: an absent or corrupt
    /// stored value is logged and read as empty, and entries that do not
    /// decode as a project are logged and skipped.
    pub fn list(&self) -> Vec<ProjectRecord<S>> {
        self.load_raw()
            .iter()
            .filter_map(|entry| self.decode(entry))
            .collect()
    }

    /// Save `snapshot` as a new project and return the created record.
    pub fn save(&mut self, name: &str, snapshot: S) -> Result<ProjectRecord<S>, StoreError> {
        let mut entries = self.load_raw();
        let now = self.clock.now_ms();
        let record = ProjectRecord {
            id: fresh_id(&entries, now),
            name: name.to_string(),
            timestamp: now,
            snapshot,
        };
        entries.push(serde_json::to_value(&record)?);
        self.persist(&entries)?;
        log::debug!("saved project {:?} as {}", record.name, record.id);
        Ok(record)
    }

    /// Look up a project by id.
    pub fn get(&self, id: &str) -> Option<ProjectRecord<S>> {
        self.load_raw()
            .iter()
            .filter(|entry| entry_id(entry) == Some(id))
            .find_map(|entry| self.decode(entry))
    }

    /// Replace a project's snapshot and refresh its timestamp. Unknown ids
    /// are ignored.
    pub fn update(&mut self, id: &str, snapshot: S) -> Result<(), StoreError> {
        let mut entries = self.load_raw();
        let Some(entry) = entries.iter_mut().find(|e| entry_id(e) == Some(id)) else {
            log::debug!("update of unknown project {id} ignored");
            return Ok(());
        };
        let name = entry
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let record = ProjectRecord {
            id: id.to_string(),
            name,
            timestamp: self.clock.now_ms(),
            snapshot,
        };
        *entry = serde_json::to_value(&record)?;
        self.persist(&entries)
    }

    /// Remove a project. Unknown ids leave storage untouched.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.load_raw();
        let before = entries.len();
        entries.retain(|e| entry_id(e) != Some(id));
        if entries.len() == before {
            log::debug!("delete of unknown project {id} ignored");
            return Ok(());
        }
        self.persist(&entries)
    }

    /// The stored array with each entry left undecoded, so writes carry
    /// entries this build cannot read back out unchanged.
    fn load_raw(&self) -> Vec<serde_json::Value> {
        let Some(raw) = self.backend.get_item(&self.key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                log::warn!("Failed to load projects from `{}`: not an array", self.key);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to load projects from `{}`: {e}", self.key);
                Vec::new()
            }
        }
    }

    fn decode(&self, entry: &serde_json::Value) -> Option<ProjectRecord<S>> {
        match ProjectRecord::deserialize(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!(
                    "skipping unreadable project {:?} in `{}`: {e}",
                    entry_id(entry).unwrap_or("?"),
                    self.key
                );
                None
            }
        }
    }

    fn persist(&mut self, entries: &[serde_json::Value]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        self.backend.set_item(&self.key, &json)?;
        Ok(())
    }
}

fn entry_id(entry: &serde_json::Value) -> Option<&str> {
    entry.get("id").and_then(serde_json::Value::as_str)
}

/// Time-based id, bumped past any id already in the collection so two
/// saves within the same millisecond stay distinct.
fn fresh_id(entries: &[serde_json::Value], now_ms: u64) -> String {
    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !entries.iter().any(|e| entry_id(e) == Some(id.as_str())) {
            return id;
        }
        candidate += 1;
    }
}
