//! Driving port for complaint mutations.
//!
//! Status and priority are written by separate calls. A caller changing both
//! may see the first succeed and the second fail; nothing is rolled back.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ComplaintId, ComplaintStatus, Error, NewComplaint, Priority};

/// Request to relabel a complaint's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStatusRequest {
    /// Complaint to relabel.
    pub complaint_id: ComplaintId,
    /// New status; may equal the current one.
    pub status: ComplaintStatus,
    /// Optional explanation; blank notes get the default text.
    pub note: Option<String>,
    /// Display name of the acting administrator.
    pub updated_by: String,
}

/// An administrator's combined status/priority update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Complaint under review.
    pub complaint_id: ComplaintId,
    /// Selected status.
    pub status: ComplaintStatus,
    /// Optional note. A non-blank note records an event even when the
    /// status is unchanged.
    pub note: Option<String>,
    /// Selected priority.
    pub priority: Priority,
    /// Display name of the reviewer.
    pub reviewer: String,
}

/// Which writes a review performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// A status event was appended.
    pub status_recorded: bool,
    /// The priority field was changed.
    pub priority_changed: bool,
}

/// Driving port for creating and relabelling complaints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintCommand: Send + Sync {
    /// Create a pending, medium-priority complaint and return its id.
    async fn create(&self, request: NewComplaint) -> Result<ComplaintId, Error>;

    /// Set the status and append the matching audit event.
    async fn transition_status(&self, request: TransitionStatusRequest) -> Result<(), Error>;

    /// Set the priority. The audit trail is untouched.
    async fn set_priority(&self, complaint_id: &ComplaintId, priority: Priority)
    -> Result<(), Error>;

    /// Apply a review as up to two independent writes.
    async fn review(&self, request: ReviewRequest) -> Result<ReviewOutcome, Error>;
}
