//! Artifact storage seam

use crate::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Blob storage for rendered artifacts.
///
/// Paths are forward-slash keys (`documents/CHANGE-20260829-101500.pdf`).
/// The audit area under `documents/audit/` is append-only by convention;
/// this core never overwrites or deletes what it stored there.
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` at `path`, returning the stored path.
    fn put(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Fetch previously stored bytes, if present.
    fn get(&self, path: &str) -> Option<Vec<u8>>;
}

/// In-memory artifact store for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| StoreError::new("artifact store lock poisoned"))?;
        blobs.insert(path.to_string(), bytes.to_vec());
        Ok(path.to_string())
    }

    fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let store = MemoryArtifactStore::new();
        let path = store.put("documents/x.pdf", b"bytes").unwrap();
        assert_eq!(path, "documents/x.pdf");
        assert_eq!(store.get(&path).unwrap(), b"bytes");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_is_none() {
        assert!(MemoryArtifactStore::new().get("documents/none.pdf").is_none());
    }
}
