use crate::models::UserMatchRecord;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors that can occur when saving match records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Rejected record for {user_id}: {reason}")]
    Rejected { user_id: String, reason: String },
}

/// Destination for computed match lists
///
/// `replace` overwrites whatever was stored for the user before; match
/// lists from different runs are never merged.
pub trait MatchStore: Send + Sync {
    fn replace(&self, record: UserMatchRecord) -> Result<(), StoreError>;
    fn get(&self, user_id: &str) -> Result<Option<UserMatchRecord>, StoreError>;
}

/// Match store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    records: RwLock<HashMap<String, UserMatchRecord>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records ordered by user id
    pub fn records(&self) -> Vec<UserMatchRecord> {
        let guard = match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut records: Vec<UserMatchRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchStore for InMemoryMatchStore {
    fn replace(&self, record: UserMatchRecord) -> Result<(), StoreError> {
        if record.user_id.is_empty() {
            return Err(StoreError::Rejected {
                user_id: record.user_id,
                reason: "record has no user id".to_string(),
            });
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("match store lock poisoned".into()))?;

        tracing::trace!("Replacing {} matches for {}", record.total_matches, record.user_id);
        records.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn get(&self, user_id: &str) -> Result<Option<UserMatchRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Unavailable("match store lock poisoned".into()))?;

        Ok(records.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchResult, Profile};
    use chrono::Utc;

    fn record(user_id: &str, candidates: &[&str]) -> UserMatchRecord {
        let matches = candidates
            .iter()
            .map(|id| MatchResult::snapshot(&Profile::new(*id), 0.5, vec![]))
            .collect();
        UserMatchRecord::new(&Profile::new(user_id), matches, Utc::now())
    }

    #[test]
    fn test_replace_overwrites_previous_matches() {
        let store = InMemoryMatchStore::new();

        store.replace(record("u1", &["a", "b", "c"])).unwrap();
        store.replace(record("u1", &["d"])).unwrap();

        let stored = store.get("u1").unwrap().unwrap();
        assert_eq!(stored.total_matches, 1);
        assert_eq!(stored.matches[0].candidate_id, "d");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_records_sorted_by_user() {
        let store = InMemoryMatchStore::new();
        store.replace(record("zed", &["a"])).unwrap();
        store.replace(record("amy", &["b"])).unwrap();

        let ids: Vec<String> = store.records().into_iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec!["amy", "zed"]);
        assert!(store.get("nobody").unwrap().is_none());
    }

    #[test]
    fn test_record_without_user_id_rejected() {
        let store = InMemoryMatchStore::new();

        let result = store.replace(record("", &["a"]));

        assert!(matches!(result, Err(StoreError::Rejected { .. })));
        assert!(store.is_empty());
    }
}
