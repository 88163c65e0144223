//! Record storage behind a trait, so handlers run unchanged against Postgres
//! or the in-process store.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::record::Record;

pub use memory::MemoryRecordRepository;
pub use postgres::PgRecordRepository;

#[async_trait]
pub trait RecordRepository: Send + Sync + 'static {
    /// All of a user's records created at or after `since`, in no particular
    /// order.
    async fn fetch_records(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<Vec<Record>>;

    async fn get_record(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Record>>;

    async fn insert_record(&self, record: Record) -> AppResult<Record>;

    /// Replace a stored record owned by `record.user_id`. Returns `false` when
    /// no such record exists.
    async fn update_record(&self, record: &Record) -> AppResult<bool>;

    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> AppResult<bool>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> bool;
}
