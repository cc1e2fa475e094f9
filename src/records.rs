//! Alert episode records.
//!
//! One record per detection episode: opened Pending when the alert fires,
//! marked Completed when detection ceases. The store has a single owner
//! (the pipeline) and the file-backed implementation rewrites its whole
//! document on every mutation — the record set is tiny and the simple
//! contract is easy to inspect by hand.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub camera: String,
    /// Epoch seconds when the alert fired.
    pub detected_at: u64,
    pub status: AlertStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_at: Option<u64>,
}

/// Episode identifier, derived from the camera and the alert timestamp.
pub fn episode_id(camera: &str, detected_at: u64) -> String {
    format!("{}:{}", camera, detected_at)
}

pub trait AlertStore: Send {
    /// Open a Pending record for a camera.
    ///
    /// At most one Pending record may exist per camera; a second insert
    /// while one is open is an error.
    fn insert_pending(&mut self, camera: &str, detected_at: u64) -> Result<String>;

    /// Mark the camera's Pending record Completed, if one exists.
    fn complete_pending(&mut self, camera: &str, cleared_at: u64) -> Result<Option<AlertRecord>>;

    /// The camera's open Pending record, if any.
    fn pending_for(&self, camera: &str) -> Option<AlertRecord>;

    /// All records, keyed by episode id.
    fn records(&self) -> BTreeMap<String, AlertRecord>;
}

/// In-memory record set shared by both store implementations.
#[derive(Clone, Debug, Default)]
struct RecordSet {
    records: BTreeMap<String, AlertRecord>,
}

impl RecordSet {
    fn insert_pending(&mut self, camera: &str, detected_at: u64) -> Result<String> {
        if self.pending_key(camera).is_some() {
            return Err(anyhow!(
                "camera '{}' already has a pending alert record",
                camera
            ));
        }
        let id = episode_id(camera, detected_at);
        self.records.insert(
            id.clone(),
            AlertRecord {
                camera: camera.to_string(),
                detected_at,
                status: AlertStatus::Pending,
                cleared_at: None,
            },
        );
        Ok(id)
    }

    fn complete_pending(&mut self, camera: &str, cleared_at: u64) -> Option<AlertRecord> {
        let key = self.pending_key(camera)?;
        let record = self.records.get_mut(&key)?;
        record.status = AlertStatus::Completed;
        record.cleared_at = Some(cleared_at);
        Some(record.clone())
    }

    fn pending_key(&self, camera: &str) -> Option<String> {
        self.records
            .iter()
            .find(|(_, rec)| rec.camera == camera && rec.status == AlertStatus::Pending)
            .map(|(key, _)| key.clone())
    }

    fn pending_for(&self, camera: &str) -> Option<AlertRecord> {
        let key = self.pending_key(camera)?;
        self.records.get(&key).cloned()
    }
}

/// Volatile store for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    set: RecordSet,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for InMemoryStore {
    fn insert_pending(&mut self, camera: &str, detected_at: u64) -> Result<String> {
        self.set.insert_pending(camera, detected_at)
    }

    fn complete_pending(&mut self, camera: &str, cleared_at: u64) -> Result<Option<AlertRecord>> {
        Ok(self.set.complete_pending(camera, cleared_at))
    }

    fn pending_for(&self, camera: &str) -> Option<AlertRecord> {
        self.set.pending_for(camera)
    }

    fn records(&self) -> BTreeMap<String, AlertRecord> {
        self.set.records.clone()
    }
}

/// Flat-file store: one JSON document, rewritten in full after every
/// mutation. A missing file opens as an empty record set.
pub struct JsonFileStore {
    path: PathBuf,
    set: RecordSet,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("invalid alert record file {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read alert record file {}", path.display())
                })
            }
        };
        Ok(Self {
            path,
            set: RecordSet { records },
        })
    }

    fn persist(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.set.records).context("serialize alert records")?;
        std::fs::write(&self.path, json).with_context(|| {
            format!("failed to write alert record file {}", self.path.display())
        })?;
        Ok(())
    }
}

impl AlertStore for JsonFileStore {
    fn insert_pending(&mut self, camera: &str, detected_at: u64) -> Result<String> {
        let id = self.set.insert_pending(camera, detected_at)?;
        self.persist()?;
        Ok(id)
    }

    fn complete_pending(&mut self, camera: &str, cleared_at: u64) -> Result<Option<AlertRecord>> {
        let completed = self.set.complete_pending(camera, cleared_at);
        if completed.is_some() {
            self.persist()?;
        }
        Ok(completed)
    }

    fn pending_for(&self, camera: &str) -> Option<AlertRecord> {
        self.set.pending_for(camera)
    }

    fn records(&self) -> BTreeMap<String, AlertRecord> {
        self.set.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_pending_record_per_camera() {
        let mut store = InMemoryStore::new();
        store.insert_pending("camera-1", 100).expect("first insert");
        assert!(store.insert_pending("camera-1", 200).is_err());
        // A different camera is unaffected.
        store.insert_pending("camera-2", 200).expect("other camera");
    }

    #[test]
    fn completing_closes_the_episode() {
        let mut store = InMemoryStore::new();
        store.insert_pending("camera-1", 100).expect("insert");
        let completed = store
            .complete_pending("camera-1", 160)
            .expect("complete")
            .expect("had a pending record");
        assert_eq!(completed.status, AlertStatus::Completed);
        assert_eq!(completed.cleared_at, Some(160));
        assert!(store.pending_for("camera-1").is_none());
        // A new episode may open afterwards.
        store.insert_pending("camera-1", 300).expect("reopen");
    }

    #[test]
    fn completing_without_pending_is_a_no_op() {
        let mut store = InMemoryStore::new();
        assert!(store.complete_pending("camera-1", 50).unwrap().is_none());
    }

    #[test]
    fn file_store_persists_each_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");

        let mut store = JsonFileStore::open(&path).expect("open");
        store.insert_pending("camera-1", 100).expect("insert");
        store.complete_pending("camera-1", 130).expect("complete");

        // Reopen from disk: the full state round-trips.
        let reopened = JsonFileStore::open(&path).expect("reopen");
        let records = reopened.records();
        assert_eq!(records.len(), 1);
        let record = &records[&episode_id("camera-1", 100)];
        assert_eq!(record.status, AlertStatus::Completed);
        assert_eq!(record.cleared_at, Some(130));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path().join("absent.json")).expect("open");
        assert!(store.records().is_empty());
    }
}
