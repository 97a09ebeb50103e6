//! Persistent signature library: named data-URI payloads saved as a
//! versioned JSON file under the platform data directory.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SIGNATURES_SCHEMA_VERSION: u32 = 1;

/// Upload cap for a single signature payload.
pub const MAX_SIGNATURE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("signature payload is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One saved signature. `data` is the image as a base64 data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub id: String,
    pub name: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignaturesEnvelope {
    version: u32,
    signatures: Vec<SignatureRecord>,
}

#[derive(Debug, Clone)]
pub struct SignatureStore {
    root: PathBuf,
}

impl SignatureStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PdfOverlay", "PdfOverlay")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All saved signatures, oldest first. A missing file is an empty list.
    pub fn list(&self) -> Result<Vec<SignatureRecord>, StorageError> {
        let path = self.signatures_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(path)?;
        let envelope: SignaturesEnvelope = serde_json::from_slice(&bytes)?;
        Ok(envelope.signatures)
    }

    /// Save a new signature and return its record.
    pub fn append(&self, name: &str, data: &str) -> Result<SignatureRecord, StorageError> {
        if data.len() > MAX_SIGNATURE_BYTES {
            return Err(StorageError::TooLarge {
                size: data.len(),
                limit: MAX_SIGNATURE_BYTES,
            });
        }

        let record = SignatureRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            data: data.to_owned(),
            created_at: Utc::now(),
        };

        let mut signatures = self.list()?;
        signatures.push(record.clone());
        self.write(signatures)?;
        Ok(record)
    }

    /// Remove a signature by id; returns whether anything was removed.
    pub fn remove_by_id(&self, id: &str) -> Result<bool, StorageError> {
        let mut signatures = self.list()?;
        let before = signatures.len();
        signatures.retain(|signature| signature.id != id);

        if signatures.len() == before {
            return Ok(false);
        }
        self.write(signatures)?;
        Ok(true)
    }

    fn write(&self, signatures: Vec<SignatureRecord>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = SignaturesEnvelope { version: SIGNATURES_SCHEMA_VERSION, signatures };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.signatures_path(), bytes)?;
        Ok(())
    }

    fn signatures_path(&self) -> PathBuf {
        self.root.join("signatures.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_list_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        let saved = store
            .append("mario", "data:image/png;base64,AAAA")
            .expect("append should succeed");

        let listed = store.list().expect("list should succeed");
        assert_eq!(listed, vec![saved]);
    }

    #[test]
    fn list_is_empty_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        assert!(store.list().expect("list should succeed").is_empty());
    }

    #[test]
    fn append_preserves_existing_entries_in_order() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        store.append("first", "data:image/png;base64,AAAA").expect("append");
        store.append("second", "data:image/png;base64,BBBB").expect("append");

        let names: Vec<_> =
            store.list().expect("list").into_iter().map(|record| record.name).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn remove_by_id_deletes_only_the_target() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        let keep = store.append("keep", "data:image/png;base64,AAAA").expect("append");
        let gone = store.append("gone", "data:image/png;base64,BBBB").expect("append");

        assert!(store.remove_by_id(&gone.id).expect("remove should succeed"));
        assert_eq!(store.list().expect("list"), vec![keep]);

        assert!(!store.remove_by_id("no-such-id").expect("remove should succeed"));
    }

    #[test]
    fn oversized_payloads_are_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        let huge = "x".repeat(MAX_SIGNATURE_BYTES + 1);
        let err = store.append("huge", &huge).expect_err("oversized payload must fail");
        assert!(matches!(err, StorageError::TooLarge { .. }));
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = SignatureStore::with_root(temp.path());

        let a = store.append("a", "data:image/png;base64,AAAA").expect("append");
        let b = store.append("b", "data:image/png;base64,BBBB").expect("append");
        assert_ne!(a.id, b.id);
    }
}
