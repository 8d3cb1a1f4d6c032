//! In-memory storage provider
//!
//! Keeps records in a map keyed by full store key. Listing is immediately
//! consistent.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{
    backup_key, validate_backup_name, validate_base_path, BackupRecord, StorageProvider,
    BACKUPS_DIR,
};
use crate::error::{KeystashError, KeystashResult};

#[derive(Debug, Default)]
struct Inner {
    backups: BTreeMap<String, BackupRecord>,
    metadata: BTreeMap<String, Value>,
}

/// Storage provider holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    inner: Mutex<Inner>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of backup records across all base paths
    #[cfg(test)]
    pub(crate) fn backup_count(&self) -> usize {
        self.lock().map(|inner| inner.backups.len()).unwrap_or(0)
    }

    fn lock(&self) -> KeystashResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| KeystashError::Storage("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    async fn test_connection(&self) -> KeystashResult<()> {
        self.lock().map(|_| ())
    }

    async fn list_backups(&self, base_path: &str) -> KeystashResult<Vec<String>> {
        validate_base_path(base_path)?;
        let prefix = format!("{}/{}/", base_path, BACKUPS_DIR);
        let inner = self.lock()?;

        Ok(inner
            .backups
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }

    async fn get_backup(&self, base_path: &str, name: &str) -> KeystashResult<BackupRecord> {
        validate_base_path(base_path)?;
        validate_backup_name(name)?;
        let inner = self.lock()?;

        inner
            .backups
            .get(&backup_key(base_path, name))
            .cloned()
            .ok_or_else(|| KeystashError::backup_not_found(backup_key(base_path, name)))
    }

    async fn store_backup(
        &self,
        base_path: &str,
        name: &str,
        record: &BackupRecord,
    ) -> KeystashResult<()> {
        validate_base_path(base_path)?;
        validate_backup_name(name)?;
        let mut inner = self.lock()?;
        inner
            .backups
            .insert(backup_key(base_path, name), record.clone());
        Ok(())
    }

    async fn delete_backup(&self, base_path: &str, name: &str) -> KeystashResult<()> {
        validate_base_path(base_path)?;
        validate_backup_name(name)?;
        let mut inner = self.lock()?;
        let key = backup_key(base_path, name);

        match inner.backups.remove(&key) {
            Some(_) => Ok(()),
            None => Err(KeystashError::backup_not_found(key)),
        }
    }

    async fn get_metadata(&self, base_path: &str) -> KeystashResult<Option<Value>> {
        validate_base_path(base_path)?;
        Ok(self.lock()?.metadata.get(base_path).cloned())
    }

    async fn store_metadata(&self, base_path: &str, data: &Value) -> KeystashResult<()> {
        validate_base_path(base_path)?;
        self.lock()?
            .metadata
            .insert(base_path.to_string(), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_store_and_get() {
        let store = MemoryStorageProvider::new();
        let record = BackupRecord::new(json!("ciphertext"));

        store.store_backup("shared", "daily", &record).await.unwrap();
        assert_eq!(store.get_backup("shared", "daily").await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStorageProvider::new();
        let err = store.get_backup("shared", "daily").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_base_path() {
        let store = MemoryStorageProvider::new();
        let record = BackupRecord::default();
        store.store_backup("shared", "daily", &record).await.unwrap();
        store.store_backup("shared/personal", "weekly", &record).await.unwrap();
        store.store_backup("users/alice", "laptop", &record).await.unwrap();

        assert_eq!(store.list_backups("shared").await.unwrap(), vec!["daily"]);
        assert_eq!(
            store.list_backups("shared/personal").await.unwrap(),
            vec!["weekly"]
        );
        assert!(store.list_backups("users/bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let store = MemoryStorageProvider::new();
        store
            .store_backup("shared", "daily", &BackupRecord::new(json!(1)))
            .await
            .unwrap();
        store
            .store_backup("shared", "daily", &BackupRecord::new(json!(2)))
            .await
            .unwrap();

        assert_eq!(store.backup_count(), 1);
        assert_eq!(
            store.get_backup("shared", "daily").await.unwrap().payload,
            json!(2)
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStorageProvider::new();
        store
            .store_backup("shared", "daily", &BackupRecord::default())
            .await
            .unwrap();

        store.delete_backup("shared", "daily").await.unwrap();
        assert!(store.list_backups("shared").await.unwrap().is_empty());
        assert!(store.delete_backup("shared", "daily").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_metadata() {
        let store = MemoryStorageProvider::new();
        assert!(store.get_metadata("shared").await.unwrap().is_none());

        store
            .store_metadata("shared", &json!({ "backups": {} }))
            .await
            .unwrap();
        assert_eq!(
            store.get_metadata("shared").await.unwrap(),
            Some(json!({ "backups": {} }))
        );
    }
}
