//! In-memory filtering over already-fetched complaints.

use super::{Category, Complaint, ComplaintStatus};

/// Optional predicates, ANDed together. An absent predicate matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Keep only this status.
    pub status: Option<ComplaintStatus>,
    /// Keep only this category.
    pub category: Option<Category>,
    /// Case-insensitive substring of the title. Blank text matches all.
    pub search_text: Option<String>,
}

impl ComplaintFilter {
    /// Whether `complaint` passes every present predicate.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        let status_ok = self
            .status
            .is_none_or(|status| complaint.status() == status);
        let category_ok = self
            .category
            .is_none_or(|category| complaint.category() == category);
        let search_ok = match self.search_text.as_deref() {
            Some(text) if !text.trim().is_empty() => complaint
                .title()
                .to_lowercase()
                .contains(&text.to_lowercase()),
            _ => true,
        };
        status_ok && category_ok && search_ok
    }
}

/// Keep the complaints matching `filter`, preserving input order.
///
/// # Examples
/// ```rust,ignore
/// let pending = filter_complaints(&all, &ComplaintFilter {
///     status: Some(ComplaintStatus::Pending),
///     ..ComplaintFilter::default()
/// });
/// ```
pub fn filter_complaints<'a>(
    complaints: &'a [Complaint],
    filter: &ComplaintFilter,
) -> Vec<&'a Complaint> {
    complaints
        .iter()
        .filter(|complaint| filter.matches(complaint))
        .collect()
}
