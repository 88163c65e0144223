use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::RecordRepository;
use crate::error::AppResult;
use crate::models::record::Record;

/// Records kept per user in process memory. Lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordRepository {
    records: Arc<Mutex<HashMap<Uuid, Vec<Record>>>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordRepository {
    async fn fetch_records(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<Vec<Record>> {
        let records = self.records.lock().await;
        Ok(records
            .get(&user_id)
            .map(|rs| rs.iter().filter(|r| r.created_at >= since).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_record(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Record>> {
        let records = self.records.lock().await;
        Ok(records
            .get(&user_id)
            .and_then(|rs| rs.iter().find(|r| r.id == id).cloned()))
    }

    async fn insert_record(&self, record: Record) -> AppResult<Record> {
        let mut records = self.records.lock().await;
        records
            .entry(record.user_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_record(&self, record: &Record) -> AppResult<bool> {
        let mut records = self.records.lock().await;
        let slot = records
            .get_mut(&record.user_id)
            .and_then(|rs| rs.iter_mut().find(|r| r.id == record.id));
        Ok(match slot {
            Some(existing) => {
                *existing = record.clone();
                true
            }
            None => false,
        })
    }

    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut records = self.records.lock().await;
        let Some(user_records) = records.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = user_records.len();
        user_records.retain(|r| r.id != id);
        Ok(user_records.len() < before)
    }

    async fn ping(&self) -> bool {
        true
    }
}
