//! Complaint workflow service.
//!
//! Implements the complaint driving ports over a [`RecordStore`]. The
//! service holds no state of its own: every read goes to the store, and
//! every mutation is a single store write. Status relabelling is
//! unrestricted, so there is no transition table to consult.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ComplaintCommand, ComplaintQuery, ComplaintScope, RecordStore, RecordStoreError,
    ReviewOutcome, ReviewRequest, TransitionStatusRequest,
};
use crate::domain::{
    Category, Complaint, ComplaintId, ComplaintInsert, ComplaintStatus, ComplaintUpdate, Error,
    MAX_IMAGES, NewComplaint, Priority, StatusEvent, UserId,
};

fn map_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::NotFound { id } => Error::not_found(format!("complaint {id} not found")),
        RecordStoreError::Connection { message } => {
            Error::service_unavailable(format!("record store unavailable: {message}"))
        }
        RecordStoreError::Query { message } => {
            Error::service_unavailable(format!("record store request failed: {message}"))
        }
        RecordStoreError::Decode { message } => {
            Error::internal(format!("stored complaint is malformed: {message}"))
        }
    }
}

/// Complaint service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ComplaintWorkflow<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ComplaintWorkflow<S> {
    /// Create a workflow over `store`. `clock` stamps audit events.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> ComplaintWorkflow<S>
where
    S: RecordStore,
{
    async fn list(&self, scope: ComplaintScope) -> Result<Vec<Complaint>, Error> {
        let complaints = self.store.list(&scope).await.map_err(map_store_error)?;
        debug!(?scope, count = complaints.len(), "listed complaints");
        Ok(complaints)
    }
}

#[async_trait]
impl<S> ComplaintCommand for ComplaintWorkflow<S>
where
    S: RecordStore,
{
    async fn create(&self, request: NewComplaint) -> Result<ComplaintId, Error> {
        if request.images.len() > MAX_IMAGES {
            return Err(Error::invalid_request(format!(
                "a complaint may carry at most {MAX_IMAGES} images (got {})",
                request.images.len()
            ))
            .with_details(json!({ "field": "images" })));
        }

        let user_id = request.user_id.clone();
        let insert = ComplaintInsert::seeded(request, self.clock.utc());
        let complaint_id = self
            .store
            .insert(&insert)
            .await
            .map_err(map_store_error)?;

        info!(
            complaint_id = %complaint_id,
            user_id = %user_id,
            category = %insert.category,
            images = insert.images.len(),
            "complaint created"
        );
        Ok(complaint_id)
    }

    async fn transition_status(&self, request: TransitionStatusRequest) -> Result<(), Error> {
        let TransitionStatusRequest {
            complaint_id,
            status,
            note,
            updated_by,
        } = request;
        let event = StatusEvent::new(status, note, updated_by, self.clock.utc());

        self.store
            .update(&complaint_id, &ComplaintUpdate::Status(event.clone()))
            .await
            .map_err(map_store_error)?;

        info!(
            complaint_id = %complaint_id,
            status = %status,
            updated_by = event.updated_by(),
            "complaint status changed"
        );
        Ok(())
    }

    async fn set_priority(
        &self,
        complaint_id: &ComplaintId,
        priority: Priority,
    ) -> Result<(), Error> {
        self.store
            .update(complaint_id, &ComplaintUpdate::Priority(priority))
            .await
            .map_err(map_store_error)?;

        info!(complaint_id = %complaint_id, priority = %priority, "complaint priority changed");
        Ok(())
    }

    async fn review(&self, request: ReviewRequest) -> Result<ReviewOutcome, Error> {
        let current = self.get(&request.complaint_id).await?;
        let has_note = request
            .note
            .as_deref()
            .is_some_and(|note| !note.trim().is_empty());
        let mut outcome = ReviewOutcome::default();

        if request.status != current.status() || has_note {
            self.transition_status(TransitionStatusRequest {
                complaint_id: request.complaint_id.clone(),
                status: request.status,
                note: request.note.clone(),
                updated_by: request.reviewer.clone(),
            })
            .await?;
            outcome.status_recorded = true;
        }

        if request.priority != current.priority() {
            if let Err(error) = self
                .set_priority(&request.complaint_id, request.priority)
                .await
            {
                warn!(
                    complaint_id = %request.complaint_id,
                    status_recorded = outcome.status_recorded,
                    error = %error,
                    "priority update failed after review"
                );
                let status_recorded = outcome.status_recorded;
                return Err(error.with_details(json!({ "statusRecorded": status_recorded })));
            }
            outcome.priority_changed = true;
        }

        Ok(outcome)
    }
}

#[async_trait]
impl<S> ComplaintQuery for ComplaintWorkflow<S>
where
    S: RecordStore,
{
    async fn get(&self, complaint_id: &ComplaintId) -> Result<Complaint, Error> {
        self.store
            .find_by_id(complaint_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("complaint {complaint_id} not found")))
    }

    async fn list_by_owner(&self, user_id: &UserId) -> Result<Vec<Complaint>, Error> {
        self.list(ComplaintScope::Owner(user_id.clone())).await
    }

    async fn list_all(&self) -> Result<Vec<Complaint>, Error> {
        self.list(ComplaintScope::All).await
    }

    async fn list_by_status(&self, status: ComplaintStatus) -> Result<Vec<Complaint>, Error> {
        self.list(ComplaintScope::Status(status)).await
    }

    async fn list_by_category(&self, category: Category) -> Result<Vec<Complaint>, Error> {
        self.list(ComplaintScope::Category(category)).await
    }
}

#[cfg(test)]
#[path = "complaint_workflow_tests.rs"]
mod tests;
