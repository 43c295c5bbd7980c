//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports ([`ComplaintCommand`], [`ComplaintQuery`],
//! [`SubmitComplaint`]) are what calling contexts invoke. Driven ports
//! ([`RecordStore`], [`MediaUploader`], [`UserProfileSource`]) are what
//! outbound adapters implement. Driven ports expose strongly typed errors
//! so adapters map their failures into predictable variants.

mod complaint_command;
mod complaint_query;
mod complaint_submission;
mod macros;
mod media_uploader;
mod record_store;
mod user_profile_source;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use complaint_command::MockComplaintCommand;
pub use complaint_command::{
    ComplaintCommand, ReviewOutcome, ReviewRequest, TransitionStatusRequest,
};
#[cfg(test)]
pub use complaint_query::MockComplaintQuery;
pub use complaint_query::ComplaintQuery;
#[cfg(test)]
pub use complaint_submission::MockSubmitComplaint;
pub use complaint_submission::{ComplaintSubmission, SubmitComplaint};
#[cfg(test)]
pub use media_uploader::MockMediaUploader;
pub use media_uploader::{LocalImage, MediaUploader, UploadError, upload_all};
#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{ComplaintScope, RecordStore, RecordStoreError};
#[cfg(test)]
pub use user_profile_source::MockUserProfileSource;
pub use user_profile_source::{UserProfileSource, UserProfileSourceError};
