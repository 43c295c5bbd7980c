//! Domain primitives, services, and ports.
//!
//! Purpose: Define the complaint aggregate, its audit trail, and the
//! services that drive it. Outbound adapters live in `crate::outbound` and
//! plug in through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): error payload returned by services.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Complaint and friends (from `complaints`): the aggregate, status,
//!   priority, category, and the pure filter/summary helpers.
//! - Session (alias to `session::Session`): the acting user, resolved from
//!   the stored profile by SessionResolver.
//! - ComplaintWorkflow: command and query service over a record store.
//! - ComplaintSubmissionService: validate, upload, then create.

pub mod complaints;
pub mod error;
pub mod ports;
pub mod session;
pub mod user;

mod complaint_submission_service;
mod complaint_workflow;
mod session_resolver;

pub use self::complaint_submission_service::{
    ComplaintSubmissionService, DEFAULT_UPLOAD_CONCURRENCY,
};
pub use self::complaint_workflow::ComplaintWorkflow;
pub use self::complaints::{
    Category, CategoryCount, Complaint, ComplaintFilter, ComplaintId, ComplaintInsert,
    ComplaintRecord, ComplaintStatus, ComplaintSummary, ComplaintUpdate,
    ComplaintValidationError, Location, MAX_IMAGES, NewComplaint, ParseCategoryError,
    ParseComplaintStatusError, ParsePriorityError, Priority, RECENT_COMPLAINTS, SUBMITTED_NOTE,
    SYSTEM_ACTOR, StatusEvent, filter_complaints, recent, summarize,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::session::{ParseRoleError, Role, Session, UserProfile};
pub use self::session_resolver::SessionResolver;
pub use self::user::{UserId, UserValidationError};

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use cleantrack::domain::{Error, ServiceResult};
///
/// fn lookup() -> ServiceResult<()> {
///     Err(Error::not_found("complaint c-1 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ServiceResult<T> = Result<T, Error>;
