//! Driving port for complaint reads. Every list is newest first and re-read
//! from the store on each call.

use async_trait::async_trait;

use crate::domain::{Category, Complaint, ComplaintId, ComplaintStatus, Error, UserId};

/// Driving port for fetching complaints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintQuery: Send + Sync {
    /// Fetch one complaint.
    async fn get(&self, complaint_id: &ComplaintId) -> Result<Complaint, Error>;

    /// Complaints filed by `user_id`.
    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Complaint>, Error>;

    /// Every complaint. Callers decide who may see this.
    async fn list_all(&self) -> Result<Vec<Complaint>, Error>;

    /// Complaints currently in `status`.
    async fn list_by_status(&self, status: ComplaintStatus) -> Result<Vec<Complaint>, Error>;

    /// Complaints filed under `category`.
    async fn list_by_category(&self, category: Category) -> Result<Vec<Complaint>, Error>;
}
