//! Flat append store: a JSON array of strings kept in one file.
//!
//! Every append rewrites the whole file. Writes are not atomic, a crash
//! mid-write can leave a truncated file behind. Writers inside this
//! process are serialized; separate processes sharing the file are not.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use nova_common::RelayError;

pub struct FlatStore {
    path: PathBuf,
    /// Serializes file access within the process
    lock: Mutex<()>,
}

impl FlatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order
    pub async fn read(&self) -> Result<Vec<String>, RelayError> {
        let _guard = self.lock.lock().await;

        self.ensure_exists().await?;
        self.load().await
    }

    /// Append one record and return the new record count
    pub async fn append(&self, text: String) -> Result<usize, RelayError> {
        let _guard = self.lock.lock().await;

        self.ensure_exists().await?;
        let mut records = self.load().await?;
        records.push(text);
        self.save(&records).await?;

        Ok(records.len())
    }

    /// Replace the contents with an empty sequence
    pub async fn clear(&self) -> Result<(), RelayError> {
        let _guard = self.lock.lock().await;

        tokio::fs::write(&self.path, "[]")
            .await
            .map_err(|e| storage_error("clear", &self.path, e))
    }

    async fn ensure_exists(&self) -> Result<(), RelayError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| storage_error("stat", &self.path, e))?;

        if !exists {
            tracing::info!(path = %self.path.display(), "Initializing empty data file");
            tokio::fs::write(&self.path, "[]")
                .await
                .map_err(|e| storage_error("initialize", &self.path, e))?;
        }

        Ok(())
    }

    async fn load(&self) -> Result<Vec<String>, RelayError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| storage_error("read", &self.path, e))?;

        serde_json::from_slice(&data).map_err(|e| storage_error("parse", &self.path, e))
    }

    async fn save(&self, records: &[String]) -> Result<(), RelayError> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| storage_error("encode", &self.path, e))?;

        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| storage_error("write", &self.path, e))
    }
}

fn storage_error(op: &str, path: &Path, err: impl std::fmt::Display) -> RelayError {
    RelayError::Storage(format!("{} {}: {}", op, path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn temp_store() -> (tempfile::TempDir, FlatStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatStore::new(dir.path().join("data.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_read_initializes_missing_file() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        let records = assert_ok!(store.read().await);
        assert!(records.is_empty());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_append_then_read() {
        let (_dir, store) = temp_store();

        assert_eq!(assert_ok!(store.append("first".into()).await), 1);
        assert_eq!(assert_ok!(store.append("x".into()).await), 2);

        let records = assert_ok!(store.read().await);
        assert_eq!(records, vec!["first".to_string(), "x".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let (_dir, store) = temp_store();
        assert_ok!(store.append("x".into()).await);

        assert_ok!(store.clear().await);
        assert!(assert_ok!(store.read().await).is_empty());
    }

    #[tokio::test]
    async fn test_file_is_pretty_json_array() {
        let (_dir, store) = temp_store();
        assert_ok!(store.append("hello".into()).await);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[\n  \"hello\"\n]");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "[\"trunc").unwrap();

        let err = store.read().await.unwrap_err();
        assert!(matches!(err, RelayError::Storage(_)));
        assert!(store.append("x".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let (_dir, store) = temp_store();
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.append(format!("r{}", i)).await }));
        }
        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }

        assert_eq!(assert_ok!(store.read().await).len(), 10);
    }
}
