//! Port for complaint persistence.
//!
//! The store owns ids and the record-level `createdAt`/`updatedAt`
//! timestamps. Listings are ordered by `createdAt`, newest first.

use async_trait::async_trait;

use crate::domain::{
    Category, Complaint, ComplaintId, ComplaintInsert, ComplaintStatus, ComplaintUpdate, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// No complaint exists with the given id; nothing was written.
        NotFound { id: String } =>
            "complaint {id} not found",
        /// The store could not be reached or timed out.
        Connection { message: String } =>
            "record store connection failed: {message}",
        /// The store rejected a query or mutation.
        Query { message: String } =>
            "record store query failed: {message}",
        /// A stored document could not be decoded into a complaint.
        Decode { message: String } =>
            "record store returned an undecodable complaint: {message}",
    }
}

/// Which complaints a listing returns. Every scope is ordered by
/// `createdAt` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintScope {
    /// Every complaint in the store.
    All,
    /// Complaints filed by one user.
    Owner(UserId),
    /// Complaints currently in one status.
    Status(ComplaintStatus),
    /// Complaints filed under one category.
    Category(Category),
}

/// Port for creating, reading, and updating complaint documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new complaint, assigning its id and timestamps.
    async fn insert(&self, complaint: &ComplaintInsert) -> Result<ComplaintId, RecordStoreError>;

    /// Find a complaint by id.
    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RecordStoreError>;

    /// List complaints in `scope`, newest first.
    async fn list(&self, scope: &ComplaintScope) -> Result<Vec<Complaint>, RecordStoreError>;

    /// Apply one update and refresh `updatedAt`.
    ///
    /// Fails with [`RecordStoreError::NotFound`] without writing anything
    /// when the complaint does not exist.
    async fn update(
        &self,
        id: &ComplaintId,
        update: &ComplaintUpdate,
    ) -> Result<(), RecordStoreError>;
}
