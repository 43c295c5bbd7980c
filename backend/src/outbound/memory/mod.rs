//! In-process record store and user profile source.
//!
//! Keeps complaint records in insertion order behind a mutex. Timestamps
//! come from the injected clock, standing in for the server clock of a real
//! document store. Useful for local runs and end-to-end tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{ComplaintScope, RecordStore, RecordStoreError};
use crate::domain::{Complaint, ComplaintId, ComplaintInsert, ComplaintRecord, ComplaintUpdate};

mod profile_source;

pub use profile_source::InMemoryUserProfileSource;

/// Record store holding every complaint in memory.
pub struct InMemoryRecordStore {
    records: Mutex<Vec<ComplaintRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRecordStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<ComplaintRecord>>, RecordStoreError> {
        self.records
            .lock()
            .map_err(|_| RecordStoreError::connection("in-memory record store lock poisoned"))
    }
}

fn in_scope(record: &ComplaintRecord, scope: &ComplaintScope) -> bool {
    match scope {
        ComplaintScope::All => true,
        ComplaintScope::Owner(user_id) => &record.user_id == user_id,
        ComplaintScope::Status(status) => record.status == *status,
        ComplaintScope::Category(category) => record.category == *category,
    }
}

fn to_complaint(record: ComplaintRecord) -> Result<Complaint, RecordStoreError> {
    let id = record.id.clone();
    Complaint::try_from(record)
        .map_err(|error| RecordStoreError::decode(format!("complaint {id}: {error}")))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, complaint: &ComplaintInsert) -> Result<ComplaintId, RecordStoreError> {
        let id = ComplaintId::new(Uuid::new_v4().simple().to_string())
            .map_err(|error| RecordStoreError::query(error.to_string()))?;
        let now = self.clock.utc();
        let record = complaint.clone().into_record(id.clone(), now, now);
        self.records()?.push(record);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RecordStoreError> {
        let record = self
            .records()?
            .iter()
            .find(|record| &record.id == id)
            .cloned();
        record.map(to_complaint).transpose()
    }

    async fn list(&self, scope: &ComplaintScope) -> Result<Vec<Complaint>, RecordStoreError> {
        // Reverse first so the stable sort leaves later inserts ahead on ties.
        let mut matching: Vec<ComplaintRecord> = self
            .records()?
            .iter()
            .rev()
            .filter(|record| in_scope(record, scope))
            .cloned()
            .collect();
        matching.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        matching.into_iter().map(to_complaint).collect()
    }

    async fn update(
        &self,
        id: &ComplaintId,
        update: &ComplaintUpdate,
    ) -> Result<(), RecordStoreError> {
        let now = self.clock.utc();
        let mut records = self.records()?;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| RecordStoreError::not_found(id.as_ref()))?;
        record.apply(update, now);
        Ok(())
    }
}
