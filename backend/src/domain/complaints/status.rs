//! Complaint status and priority values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Position of a complaint in the review workflow.
///
/// Any status may follow any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Submitted and awaiting triage.
    Pending,
    /// Being worked on.
    InProgress,
    /// Fixed.
    Resolved,
    /// Declined by an administrator.
    Rejected,
}

impl ComplaintStatus {
    /// Every status in display order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Rejected,
    ];

    /// Stable identifier stored on complaint documents.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Error returned when parsing a [`ComplaintStatus`] from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseComplaintStatusError(String);

impl fmt::Display for ParseComplaintStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown complaint status: {}", self.0)
    }
}

impl std::error::Error for ParseComplaintStatusError {}

impl FromStr for ComplaintStatus {
    type Err = ParseComplaintStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.id() == value)
            .ok_or_else(|| ParseComplaintStatusError(value.to_owned()))
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Administrator-assigned urgency, independent of status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default for new complaints.
    #[default]
    Medium,
    /// Needs prompt attention.
    High,
}

impl Priority {
    /// Stable identifier stored on complaint documents.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Error returned when parsing a [`Priority`] from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError(String);

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown complaint priority: {}", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParsePriorityError(other.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
