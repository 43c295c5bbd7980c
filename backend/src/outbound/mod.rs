//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **memory**: in-process record store and profile source for local runs
//!   and tests
//! - **firestore**: Firestore REST record store and user profile source
//! - **cloudinary**: Cloudinary unsigned image uploads
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cloudinary;
pub mod firestore;
pub mod memory;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Describe a non-success HTTP response as `status <code>: <body preview>`.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn empty_bodies_report_only_the_status() {
        assert_eq!(status_message(StatusCode::BAD_GATEWAY, b"  \n"), "status 502");
    }

    #[rstest]
    fn bodies_are_compacted_onto_one_line() {
        let body = b"{\n  \"error\": {\n    \"status\": \"PERMISSION_DENIED\"\n  }\n}";
        assert_eq!(
            status_message(StatusCode::FORBIDDEN, body),
            "status 403: { \"error\": { \"status\": \"PERMISSION_DENIED\" } }"
        );
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 40);
        let message = status_message(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
        assert!(message.ends_with("..."), "{message}");
        assert_eq!(message.len(), "status 500: ".len() + PREVIEW_CHAR_LIMIT + 3);
    }
}
