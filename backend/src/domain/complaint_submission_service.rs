//! Citizen complaint submission.
//!
//! [`ComplaintSubmissionService`] validates form input, uploads any attached
//! images, and only then creates the complaint. A failed upload aborts the
//! submission before anything is written to the record store; images that
//! were already uploaded stay orphaned on the media host.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::ports::{
    ComplaintCommand, ComplaintSubmission, MediaUploader, SubmitComplaint, UploadError,
    upload_all,
};
use super::{Category, ComplaintId, Error, MAX_IMAGES, NewComplaint, Session};

/// Default number of uploads in flight at once.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 1;

fn map_upload_error(error: UploadError) -> Error {
    Error::upload_failed(format!("image upload failed: {error}"))
}

fn missing_field(field: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

fn validate(submission: &ComplaintSubmission) -> Result<Category, Error> {
    if submission.title.trim().is_empty() {
        return Err(missing_field(
            "title",
            "please enter a title for the complaint",
        ));
    }
    if submission.description.trim().is_empty() {
        return Err(missing_field(
            "description",
            "please describe the issue in detail",
        ));
    }
    let Some(category) = submission.category else {
        return Err(missing_field("category", "please select a category"));
    };
    if submission.images.len() > MAX_IMAGES {
        return Err(Error::invalid_request(format!(
            "at most {MAX_IMAGES} images may be attached (got {})",
            submission.images.len()
        ))
        .with_details(json!({ "field": "images" })));
    }
    Ok(category)
}

/// Submission service composing the complaint command port with a media
/// uploader.
pub struct ComplaintSubmissionService<C, U> {
    command: Arc<C>,
    uploader: Arc<U>,
    upload_concurrency: usize,
}

impl<C, U> ComplaintSubmissionService<C, U> {
    /// Create a service that uploads images one at a time.
    pub fn new(command: Arc<C>, uploader: Arc<U>) -> Self {
        Self {
            command,
            uploader,
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    /// Allow up to `concurrency` uploads in flight. URL order still follows
    /// the order the images were attached in.
    #[must_use]
    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.upload_concurrency = concurrency.max(1);
        self
    }
}

#[async_trait]
impl<C, U> SubmitComplaint for ComplaintSubmissionService<C, U>
where
    C: ComplaintCommand,
    U: MediaUploader,
{
    async fn submit(
        &self,
        session: &Session,
        submission: ComplaintSubmission,
    ) -> Result<ComplaintId, Error> {
        let category = validate(&submission)?;
        let ComplaintSubmission {
            title,
            description,
            images,
            location,
            ..
        } = submission;

        let image_urls = upload_all(self.uploader.as_ref(), &images, self.upload_concurrency)
            .await
            .map_err(|error| {
                warn!(
                    user_id = %session.user_id(),
                    images = images.len(),
                    error = %error,
                    "submission aborted by failed upload"
                );
                map_upload_error(error)
            })?;

        let complaint_id = self
            .command
            .create(NewComplaint {
                title: title.trim().to_owned(),
                description: description.trim().to_owned(),
                category,
                images: image_urls,
                location,
                user_id: session.user_id().clone(),
                user_name: session.submitter_name().to_owned(),
            })
            .await?;

        info!(
            complaint_id = %complaint_id,
            user_id = %session.user_id(),
            "complaint submitted"
        );
        Ok(complaint_id)
    }
}
