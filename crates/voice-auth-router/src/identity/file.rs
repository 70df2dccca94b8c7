//! JSON-file identity store.

use super::{IdentityRecord, IdentityStore, RecordUpdate};
use crate::error::{RouterError, RouterResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

type Table = BTreeMap<String, IdentityRecord>;

/// Identity store persisted as a single JSON document.
///
/// Single-process only: every write reloads and rewrites the whole table
/// through one temp file, so two processes sharing the path can drop each
/// other's writes. Within a process the mutex serializes file access; it does
/// not make a caller's get-then-update sequence atomic.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RouterResult<Table> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = ?self.path, "Identity file not found, treating as empty");
            return Ok(Table::new());
        }

        let data = fs::read(&self.path).await?;
        if data.is_empty() {
            return Ok(Table::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    async fn save(&self, table: &Table) -> RouterResult<()> {
        let data = serde_json::to_vec_pretty(table)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(
            "Saved {} identity records ({} bytes) to {:?}",
            table.len(),
            data.len(),
            self.path
        );
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FileStore {
    #[instrument(skip(self))]
    async fn get(&self, phone_number: &str) -> RouterResult<Option<IdentityRecord>> {
        let _guard = self.io.lock().await;
        let mut table = self.load().await?;
        Ok(table.remove(phone_number))
    }

    #[instrument(skip(self, record), fields(phone_number = %record.phone_number))]
    async fn create(&self, record: IdentityRecord) -> RouterResult<()> {
        let _guard = self.io.lock().await;
        let mut table = self.load().await?;
        if table.contains_key(&record.phone_number) {
            info!("Replacing existing identity record");
        }
        table.insert(record.phone_number.clone(), record);
        self.save(&table).await
    }

    #[instrument(skip(self))]
    async fn update(&self, phone_number: &str, update: RecordUpdate) -> RouterResult<()> {
        let _guard = self.io.lock().await;
        let mut table = self.load().await?;
        let record = table
            .get_mut(phone_number)
            .ok_or_else(|| RouterError::NotFound(phone_number.to_string()))?;
        if update.is_empty() {
            return Ok(());
        }
        update.apply(&mut record.info);
        self.save(&table).await
    }

    async fn count(&self) -> RouterResult<usize> {
        let _guard = self.io.lock().await;
        Ok(self.load().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("data").join("identities.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.get("+14155551234").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_create_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let record = IdentityRecord::new_enrollment("+14155551234", "usr_1", Utc::now());

        store_in(&dir).create(record.clone()).await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get("+14155551234").await.unwrap(), Some(record));
        assert!(!reopened.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .create(IdentityRecord::new_enrollment("+1", "usr_1", Utc::now()))
            .await
            .unwrap();

        store
            .update("+1", RecordUpdate::new().verifying(true).enrolling(false))
            .await
            .unwrap();

        let record = store.get("+1").await.unwrap().unwrap();
        assert!(record.info.verifying);
        assert!(!record.info.enrolling);
        assert_eq!(record.info.user_id, "usr_1");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let result = store.update("+1", RecordUpdate::new().verified(false)).await;
        assert!(matches!(result, Err(RouterError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_update_skips_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identities.json");
        let record = IdentityRecord::new_enrollment("+1", "usr_1", Utc::now());
        let compact = serde_json::to_string(&Table::from([("+1".to_string(), record)])).unwrap();
        std::fs::write(&path, &compact).unwrap();

        let store = FileStore::new(&path);
        store.update("+1", RecordUpdate::new()).await.unwrap();

        // A save would have rewritten the file pretty-printed.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), compact);
        assert!(matches!(
            store.update("+2", RecordUpdate::new()).await,
            Err(RouterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_for_different_numbers() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(store_in(&dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let record =
                        IdentityRecord::new_enrollment(format!("+1555000{}", i), "usr", Utc::now());
                    store.create(record).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identities.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("+1").await,
            Err(RouterError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_file_layout_keyed_by_phone_number() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .create(IdentityRecord::new_enrollment("+1", "usr_1", Utc::now()))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["+1"]["info"]["userId"], "usr_1");
    }
}
