//! Complaint entity, its audit trail, and the store-facing write shapes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, ComplaintStatus, ComplaintValidationError, Priority};
use crate::domain::UserId;

/// Upper bound on images attached to one complaint.
pub const MAX_IMAGES: usize = 5;

/// Actor recorded on the event seeded at submission.
pub const SYSTEM_ACTOR: &str = "system";

/// Note recorded on the event seeded at submission.
pub const SUBMITTED_NOTE: &str = "Complaint submitted";

/// Opaque identifier assigned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintId(String);

impl ComplaintId {
    /// Wrap a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ComplaintValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ComplaintValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ComplaintId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ComplaintId> for String {
    fn from(value: ComplaintId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ComplaintId {
    type Error = ComplaintValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Where the issue was observed. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// WGS84 latitude.
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    pub longitude: Option<f64>,
    /// Reverse-geocoded or typed address.
    pub address: Option<String>,
}

/// One immutable entry in a complaint's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    status: ComplaintStatus,
    note: String,
    updated_by: String,
    updated_at: DateTime<Utc>,
}

impl StatusEvent {
    /// Record a status change. A missing or blank note is replaced by
    /// `"Status changed to <status>"`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use cleantrack::domain::{ComplaintStatus, StatusEvent};
    ///
    /// let event = StatusEvent::new(ComplaintStatus::Resolved, None, "Ward 4", Utc::now());
    /// assert_eq!(event.note(), "Status changed to resolved");
    /// ```
    pub fn new(
        status: ComplaintStatus,
        note: Option<String>,
        updated_by: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let note = note
            .map(|raw| raw.trim().to_owned())
            .filter(|trimmed| !trimmed.is_empty())
            .unwrap_or_else(|| format!("Status changed to {status}"));
        Self {
            status,
            note,
            updated_by: updated_by.into(),
            updated_at,
        }
    }

    /// The automatic event every complaint starts with.
    pub fn submitted(at: DateTime<Utc>) -> Self {
        Self {
            status: ComplaintStatus::Pending,
            note: SUBMITTED_NOTE.to_owned(),
            updated_by: SYSTEM_ACTOR.to_owned(),
            updated_at: at,
        }
    }

    /// Rebuild an event exactly as stored, without synthesising a note.
    pub fn from_stored(
        status: ComplaintStatus,
        note: String,
        updated_by: String,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            note,
            updated_by,
            updated_at,
        }
    }

    /// Status this event records.
    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    /// Explanation attached to the event.
    pub fn note(&self) -> &str {
        self.note.as_str()
    }

    /// Display name of the actor, or `"system"`.
    pub fn updated_by(&self) -> &str {
        self.updated_by.as_str()
    }

    /// Client clock reading when the event was captured.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Input to the create operation.
///
/// Text fields are taken as given; emptiness checks belong to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Issue category.
    pub category: Category,
    /// Already-uploaded image URLs, at most [`MAX_IMAGES`].
    pub images: Vec<String>,
    /// Optional location.
    pub location: Option<Location>,
    /// Submitter id.
    pub user_id: UserId,
    /// Submitter display name.
    pub user_name: String,
}

/// Document written by the store when a complaint is created.
///
/// Store-assigned values (id, timestamps) are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintInsert {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Issue category.
    pub category: Category,
    /// Image URLs.
    pub images: Vec<String>,
    /// Optional location.
    pub location: Option<Location>,
    /// Always [`ComplaintStatus::Pending`] for seeded inserts.
    pub status: ComplaintStatus,
    /// Always [`Priority::Medium`] for seeded inserts.
    pub priority: Priority,
    /// Exactly one submission event for seeded inserts.
    pub status_history: Vec<StatusEvent>,
    /// Submitter id.
    pub user_id: UserId,
    /// Submitter display name.
    pub user_name: String,
}

impl ComplaintInsert {
    /// Seed a new complaint as pending, medium priority, with one
    /// `"system"` submission event.
    pub fn seeded(request: NewComplaint, submitted_at: DateTime<Utc>) -> Self {
        Self {
            title: request.title,
            description: request.description,
            category: request.category,
            images: request.images,
            location: request.location,
            status: ComplaintStatus::Pending,
            priority: Priority::Medium,
            status_history: vec![StatusEvent::submitted(submitted_at)],
            user_id: request.user_id,
            user_name: request.user_name,
        }
    }

    /// Attach store-assigned values, producing the raw record.
    pub fn into_record(
        self,
        id: ComplaintId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> ComplaintRecord {
        ComplaintRecord {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            images: self.images,
            location: self.location,
            status: self.status,
            priority: self.priority,
            status_history: self.status_history,
            user_id: self.user_id,
            user_name: self.user_name,
            created_at,
            updated_at,
        }
    }
}

/// A field update applied by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplaintUpdate {
    /// Set `status` to the event's status and append the event to the
    /// history, as one write.
    Status(StatusEvent),
    /// Set `priority`; the history is untouched.
    Priority(Priority),
}

/// Raw complaint document as read from, or kept by, a store.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintRecord {
    /// Store-assigned id.
    pub id: ComplaintId,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Issue category.
    pub category: Category,
    /// Image URLs.
    pub images: Vec<String>,
    /// Optional location.
    pub location: Option<Location>,
    /// Current status.
    pub status: ComplaintStatus,
    /// Current priority.
    pub priority: Priority,
    /// Append-only audit trail.
    pub status_history: Vec<StatusEvent>,
    /// Submitter id.
    pub user_id: UserId,
    /// Submitter display name.
    pub user_name: String,
    /// Store clock at creation.
    pub created_at: DateTime<Utc>,
    /// Store clock at the latest mutation.
    pub updated_at: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Apply an update in place and stamp `updated_at`.
    pub fn apply(&mut self, update: &ComplaintUpdate, at: DateTime<Utc>) {
        match update {
            ComplaintUpdate::Status(event) => {
                self.status = event.status();
                self.status_history.push(event.clone());
            }
            ComplaintUpdate::Priority(priority) => self.priority = *priority,
        }
        self.updated_at = at;
    }
}

/// A citizen-submitted issue tracked through resolution.
///
/// ## Invariants
/// - `status_history` is never empty.
/// - `status` equals the status of the last history entry.
/// - At most [`MAX_IMAGES`] images.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    id: ComplaintId,
    title: String,
    description: String,
    category: Category,
    images: Vec<String>,
    location: Option<Location>,
    status: ComplaintStatus,
    priority: Priority,
    status_history: Vec<StatusEvent>,
    user_id: UserId,
    user_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRecord> for Complaint {
    type Error = ComplaintValidationError;

    fn try_from(record: ComplaintRecord) -> Result<Self, Self::Error> {
        if record.images.len() > MAX_IMAGES {
            return Err(ComplaintValidationError::TooManyImages {
                count: record.images.len(),
            });
        }
        let latest = record
            .status_history
            .last()
            .ok_or(ComplaintValidationError::EmptyHistory)?;
        if latest.status() != record.status {
            return Err(ComplaintValidationError::StatusHistoryMismatch {
                status: record.status,
                latest: latest.status(),
            });
        }

        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            category: record.category,
            images: record.images,
            location: record.location,
            status: record.status,
            priority: record.priority,
            status_history: record.status_history,
            user_id: record.user_id,
            user_name: record.user_name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Complaint {
    /// Store-assigned id.
    pub fn id(&self) -> &ComplaintId {
        &self.id
    }

    /// Short summary.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Full description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Issue category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Image URLs in submission order.
    pub fn images(&self) -> &[String] {
        self.images.as_slice()
    }

    /// Optional location.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Current status.
    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    /// Current priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Audit trail in storage (append) order.
    pub fn status_history(&self) -> &[StatusEvent] {
        self.status_history.as_slice()
    }

    /// Audit trail newest first, for display. Events with equal timestamps
    /// keep their storage order.
    pub fn timeline(&self) -> Vec<&StatusEvent> {
        let mut events: Vec<&StatusEvent> = self.status_history.iter().collect();
        events.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        events
    }

    /// Submitter id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Submitter display name.
    pub fn user_name(&self) -> &str {
        self.user_name.as_str()
    }

    /// Store clock at creation.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Store clock at the latest mutation.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
