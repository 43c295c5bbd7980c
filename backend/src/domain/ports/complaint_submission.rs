//! Driving port for citizen submissions: validate, upload, then create.

use async_trait::async_trait;

use super::LocalImage;
use crate::domain::{Category, ComplaintId, Error, Location, Session};

/// Raw form input collected from the submitter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintSubmission {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Selected category, if any.
    pub category: Option<Category>,
    /// Images still on the device.
    pub images: Vec<LocalImage>,
    /// Optional location.
    pub location: Option<Location>,
}

/// Driving port for submitting complaints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitComplaint: Send + Sync {
    /// Submit on behalf of `session`, returning the new complaint id.
    async fn submit(
        &self,
        session: &Session,
        submission: ComplaintSubmission,
    ) -> Result<ComplaintId, Error>;
}
