//! Complaint entities, audit trail, and the pure list helpers used by
//! dashboards.
//!
//! A complaint's status is a free relabelling: any status may follow any
//! other, and every relabelling appends one [`StatusEvent`]. Priority is a
//! separate field whose changes leave no audit entry.

use std::fmt;

mod category;
mod complaint;
mod filter;
mod status;
mod summary;

pub use category::{Category, ParseCategoryError};
pub use complaint::{
    Complaint, ComplaintId, ComplaintInsert, ComplaintRecord, ComplaintUpdate, Location,
    MAX_IMAGES, NewComplaint, SUBMITTED_NOTE, SYSTEM_ACTOR, StatusEvent,
};
pub use filter::{ComplaintFilter, filter_complaints};
pub use status::{ComplaintStatus, ParseComplaintStatusError, ParsePriorityError, Priority};
pub use summary::{CategoryCount, ComplaintSummary, RECENT_COMPLAINTS, recent, summarize};

/// Invariant violations detected when building complaint values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintValidationError {
    /// The id was blank.
    EmptyId,
    /// More than [`MAX_IMAGES`] images were attached.
    TooManyImages {
        /// Number of images supplied.
        count: usize,
    },
    /// The audit trail had no entries.
    EmptyHistory,
    /// The status field disagreed with the last audit entry.
    StatusHistoryMismatch {
        /// Stored status field.
        status: ComplaintStatus,
        /// Status of the last history entry.
        latest: ComplaintStatus,
    },
}

impl fmt::Display for ComplaintValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "complaint id must not be empty"),
            Self::TooManyImages { count } => write!(
                f,
                "complaint may carry at most {MAX_IMAGES} images (got {count})"
            ),
            Self::EmptyHistory => write!(f, "complaint status history must not be empty"),
            Self::StatusHistoryMismatch { status, latest } => write!(
                f,
                "complaint status {status} does not match latest history entry {latest}"
            ),
        }
    }
}

impl std::error::Error for ComplaintValidationError {}
