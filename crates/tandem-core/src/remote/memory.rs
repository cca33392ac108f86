//! In-memory remote record store
//!
//! Backs tests and offline experiments. Holds records in a map behind a
//! mutex and supports a simulated-outage switch: while offline, every
//! operation fails with `RemoteError::Unavailable` and no state changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Fields, Record, RecordId, RecordType, RemoteError, RemoteStore};

/// In-process implementation of [`RemoteStore`]
#[derive(Default)]
pub struct MemoryRemote {
    records: Mutex<HashMap<RecordId, (RecordType, Fields)>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryRemote {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the simulated outage
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of records of a kind currently stored
    pub async fn count(&self, record_type: RecordType) -> usize {
        self.records
            .lock()
            .await
            .values()
            .filter(|(t, _)| *t == record_type)
            .count()
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn create(
        &self,
        record_type: RecordType,
        fields: Fields,
    ) -> Result<RecordId, RemoteError> {
        self.check_online()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = RecordId::new(format!("rec-{:04}", n));
        self.records
            .lock()
            .await
            .insert(id.clone(), (record_type, fields));
        Ok(id)
    }

    async fn update(&self, id: &RecordId, fields: Fields) -> Result<(), RemoteError> {
        self.check_online()?;
        let mut records = self.records.lock().await;
        let Some((_, existing)) = records.get_mut(id) else {
            return Err(RemoteError::NotFound(id.clone()));
        };
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.check_online()?;
        let mut records = self.records.lock().await;
        if records.remove(id).is_none() {
            return Err(RemoteError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn query(
        &self,
        record_type: RecordType,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<Record>, RemoteError> {
        self.check_online()?;
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|(_, (t, fields))| *t == record_type && fields.get(field) == Some(value))
            .map(|(id, (_, fields))| Record {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, serde_json::Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_and_query() {
        let remote = MemoryRemote::new();

        let id = remote
            .create(
                RecordType::SharedList,
                fields(&[("inviteCode", json!("XJ7K2M"))]),
            )
            .await
            .unwrap();

        let found = remote
            .query(RecordType::SharedList, "inviteCode", &json!("XJ7K2M"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);

        let missing = remote
            .query(RecordType::SharedList, "inviteCode", &json!("AAAAAA"))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_query_filters_by_record_type() {
        let remote = MemoryRemote::new();

        remote
            .create(RecordType::SharedList, fields(&[("code", json!("X"))]))
            .await
            .unwrap();
        remote
            .create(RecordType::Invitation, fields(&[("code", json!("X"))]))
            .await
            .unwrap();

        let invites = remote
            .query(RecordType::Invitation, "code", &json!("X"))
            .await
            .unwrap();
        assert_eq!(invites.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let remote = MemoryRemote::new();

        let id = remote
            .create(
                RecordType::SharedTask,
                fields(&[("text", json!("Milk")), ("isCompleted", json!(0))]),
            )
            .await
            .unwrap();

        remote
            .update(&id, fields(&[("isCompleted", json!(1))]))
            .await
            .unwrap();

        let found = remote
            .query(RecordType::SharedTask, "text", &json!("Milk"))
            .await
            .unwrap();
        assert_eq!(found[0].fields.get("isCompleted"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let remote = MemoryRemote::new();
        let err = remote
            .update(&RecordId::from("rec-404"), Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let remote = MemoryRemote::new();
        let id = remote
            .create(RecordType::SharedTask, Fields::new())
            .await
            .unwrap();

        remote.delete(&id).await.unwrap();
        assert_eq!(remote.count(RecordType::SharedTask).await, 0);
    }

    #[tokio::test]
    async fn test_offline_fails_without_mutation() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);

        let err = remote
            .create(RecordType::SharedList, Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));

        remote.set_offline(false);
        assert_eq!(remote.count(RecordType::SharedList).await, 0);
    }
}
