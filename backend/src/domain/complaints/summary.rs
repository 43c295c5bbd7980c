//! Dashboard aggregation.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Category, Complaint, ComplaintStatus};

/// Number of complaints shown in the dashboard's recent list.
pub const RECENT_COMPLAINTS: usize = 5;

/// Count of complaints in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: Category,
    /// Complaints filed under it; never zero in a summary.
    pub count: usize,
}

/// Totals shown on the administrator dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSummary {
    /// All complaints scanned.
    pub total: usize,
    /// Complaints currently pending.
    pub pending: usize,
    /// Complaints currently in progress.
    pub in_progress: usize,
    /// Complaints currently resolved.
    pub resolved: usize,
    /// Complaints currently rejected.
    pub rejected: usize,
    /// Non-empty categories in catalogue order.
    pub by_category: Vec<CategoryCount>,
}

/// Count complaints by status and by category in one pass.
pub fn summarize(complaints: &[Complaint]) -> ComplaintSummary {
    let mut summary = ComplaintSummary {
        total: complaints.len(),
        ..ComplaintSummary::default()
    };
    let mut per_category: BTreeMap<Category, usize> = BTreeMap::new();

    for complaint in complaints {
        match complaint.status() {
            ComplaintStatus::Pending => summary.pending += 1,
            ComplaintStatus::InProgress => summary.in_progress += 1,
            ComplaintStatus::Resolved => summary.resolved += 1,
            ComplaintStatus::Rejected => summary.rejected += 1,
        }
        *per_category.entry(complaint.category()).or_default() += 1;
    }

    // Category derives Ord in catalogue order, so the map iterates that way.
    summary.by_category = per_category
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    summary
}

/// The first `limit` complaints of an already ordered list.
pub fn recent(complaints: &[Complaint], limit: usize) -> &[Complaint] {
    &complaints[..complaints.len().min(limit)]
}
