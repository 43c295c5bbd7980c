//! Command-line adapter.
//!
//! Parses `cleantrack` sub-commands and drives the complaint ports on
//! behalf of the configured [`Session`]. The adapter is the calling
//! context: it decides who may run which command, while the domain
//! services stay permission-free.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::domain::ports::{
    ComplaintCommand, ComplaintQuery, ComplaintSubmission, LocalImage, ReviewOutcome,
    ReviewRequest, SubmitComplaint,
};
use crate::domain::{
    Category, Complaint, ComplaintFilter, ComplaintId, ComplaintStatus, ComplaintSummary, Error,
    Location, Priority, RECENT_COMPLAINTS, ServiceResult, Session, StatusEvent,
    filter_complaints, recent, summarize,
};

/// `cleantrack` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cleantrack",
    about = "Submit and manage civic complaints",
    version
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Sub-commands. Those marked admin require an administrator session.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// File a new complaint, uploading any attached images first.
    Submit(SubmitArgs),
    /// List your own complaints, newest first.
    Mine(FilterArgs),
    /// Show one complaint with its timeline, newest event first.
    Show {
        /// Complaint id.
        id: String,
    },
    /// List every complaint (admin).
    List(FilterArgs),
    /// Update a complaint's status, note, or priority (admin).
    Review(ReviewArgs),
    /// Status counts, per-category counts, and recent complaints (admin).
    Dashboard,
    /// List the category catalogue.
    Categories,
}

/// Form fields for a new complaint.
#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    /// Short summary.
    #[arg(long)]
    pub title: String,
    /// Full description.
    #[arg(long)]
    pub description: String,
    /// Category id, e.g. `road_damage`.
    #[arg(long)]
    pub category: Option<Category>,
    /// Local image path; repeat for several images (at most five).
    #[arg(long = "image", value_name = "path")]
    pub images: Vec<PathBuf>,
    /// Latitude of the issue.
    #[arg(long, requires = "longitude")]
    pub latitude: Option<f64>,
    /// Longitude of the issue.
    #[arg(long, requires = "latitude")]
    pub longitude: Option<f64>,
    /// Street address or landmark.
    #[arg(long)]
    pub address: Option<String>,
}

/// List filters, applied after fetching.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Keep only this status.
    #[arg(long)]
    pub status: Option<ComplaintStatus>,
    /// Keep only this category.
    #[arg(long)]
    pub category: Option<Category>,
    /// Case-insensitive title search.
    #[arg(long)]
    pub search: Option<String>,
}

/// Administrator review of one complaint.
#[derive(Debug, Clone, Args)]
pub struct ReviewArgs {
    /// Complaint id.
    pub id: String,
    /// New status; defaults to the current one.
    #[arg(long)]
    pub status: Option<ComplaintStatus>,
    /// New priority; defaults to the current one.
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Note recorded with the status event.
    #[arg(long)]
    pub note: Option<String>,
}

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    /// Stable id.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Counts over every complaint.
    pub summary: ComplaintSummary,
    /// Newest complaints.
    pub recent: Vec<Complaint>,
}

/// Complaint detail payload.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetail {
    /// The complaint as stored.
    pub complaint: Complaint,
    /// Audit events, newest first.
    pub timeline: Vec<StatusEvent>,
}

/// Result of a command, printed as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    /// A complaint was created.
    Created {
        /// Store-assigned id.
        #[serde(rename = "complaintId")]
        complaint_id: ComplaintId,
    },
    /// A list of complaints.
    Complaints(Vec<Complaint>),
    /// One complaint and its timeline.
    Detail(Box<ComplaintDetail>),
    /// What a review wrote.
    Reviewed(ReviewOutcome),
    /// Dashboard counts.
    Dashboard(Box<Dashboard>),
    /// Category catalogue.
    Categories(Vec<CategoryEntry>),
}

/// Ports the CLI drives.
#[derive(Clone)]
pub struct CliState {
    /// Complaint mutations.
    pub command: Arc<dyn ComplaintCommand>,
    /// Complaint reads.
    pub query: Arc<dyn ComplaintQuery>,
    /// Citizen submissions; absent when image uploads are not configured.
    pub submissions: Option<Arc<dyn SubmitComplaint>>,
}

fn parse_id(raw: &str) -> ServiceResult<ComplaintId> {
    ComplaintId::new(raw).map_err(|error| Error::invalid_request(error.to_string()))
}

fn filtered(complaints: &[Complaint], args: FilterArgs) -> Vec<Complaint> {
    let filter = ComplaintFilter {
        status: args.status,
        category: args.category,
        search_text: args.search,
    };
    filter_complaints(complaints, &filter)
        .into_iter()
        .cloned()
        .collect()
}

fn location(args: &SubmitArgs) -> Option<Location> {
    let location = Location {
        latitude: args.latitude,
        longitude: args.longitude,
        address: args
            .address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_owned),
    };
    (location != Location::default()).then_some(location)
}

impl CliState {
    /// Run `command` for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::Forbidden`] when a non-admin
    /// session runs an admin command or views someone else's complaint,
    /// and propagates service errors otherwise.
    pub async fn run(&self, session: &Session, command: Command) -> ServiceResult<CommandOutput> {
        debug!(user_id = %session.user_id(), role = %session.role(), ?command, "running command");
        match command {
            Command::Submit(args) => self.submit(session, args).await,
            Command::Mine(filter) => {
                let complaints = self.query.list_by_owner(session.user_id()).await?;
                Ok(CommandOutput::Complaints(filtered(&complaints, filter)))
            }
            Command::Show { id } => self.show(session, &parse_id(&id)?).await,
            Command::List(filter) => {
                session.require_admin()?;
                let complaints = match filter.status {
                    Some(status) => self.query.list_by_status(status).await?,
                    None => self.query.list_all().await?,
                };
                Ok(CommandOutput::Complaints(filtered(&complaints, filter)))
            }
            Command::Review(args) => {
                session.require_admin()?;
                self.review(session, args).await
            }
            Command::Dashboard => {
                session.require_admin()?;
                let complaints = self.query.list_all().await?;
                Ok(CommandOutput::Dashboard(Box::new(Dashboard {
                    summary: summarize(&complaints),
                    recent: recent(&complaints, RECENT_COMPLAINTS).to_vec(),
                })))
            }
            Command::Categories => Ok(CommandOutput::Categories(
                Category::ALL
                    .iter()
                    .map(|category| CategoryEntry {
                        id: category.id(),
                        label: category.label(),
                    })
                    .collect(),
            )),
        }
    }

    async fn submit(&self, session: &Session, args: SubmitArgs) -> ServiceResult<CommandOutput> {
        let submissions = self.submissions.as_ref().ok_or_else(|| {
            Error::service_unavailable(
                "image uploads are not configured; set CLEANTRACK_CLOUDINARY_CLOUD_NAME",
            )
        })?;
        let location = location(&args);
        let submission = ComplaintSubmission {
            title: args.title,
            description: args.description,
            category: args.category,
            images: args
                .images
                .iter()
                .map(|path| LocalImage::new(path.to_string_lossy()))
                .collect(),
            location,
        };
        let complaint_id = submissions.submit(session, submission).await?;
        Ok(CommandOutput::Created { complaint_id })
    }

    async fn show(&self, session: &Session, id: &ComplaintId) -> ServiceResult<CommandOutput> {
        let complaint = self.query.get(id).await?;
        if !session.is_admin() && complaint.user_id() != session.user_id() {
            return Err(Error::forbidden(format!(
                "complaint {id} belongs to another user"
            )));
        }
        let timeline = complaint.timeline().into_iter().cloned().collect();
        Ok(CommandOutput::Detail(Box::new(ComplaintDetail {
            complaint,
            timeline,
        })))
    }

    async fn review(&self, session: &Session, args: ReviewArgs) -> ServiceResult<CommandOutput> {
        let complaint_id = parse_id(&args.id)?;
        let (status, priority) = match (args.status, args.priority) {
            (Some(status), Some(priority)) => (status, priority),
            (status, priority) => {
                let current = self.query.get(&complaint_id).await?;
                (
                    status.unwrap_or(current.status()),
                    priority.unwrap_or(current.priority()),
                )
            }
        };
        let outcome = self
            .command
            .review(ReviewRequest {
                complaint_id,
                status,
                note: args.note,
                priority,
                reviewer: session.actor_name().to_owned(),
            })
            .await?;
        Ok(CommandOutput::Reviewed(outcome))
    }
}

#[cfg(test)]
mod tests;
