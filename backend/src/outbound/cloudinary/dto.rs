//! Cloudinary upload response payloads.

use serde::Deserialize;

/// Response body of an unsigned image upload.
///
/// Cloudinary reports failures as `{"error": {"message": "..."}}`, usually
/// with a 4xx status but not always.
#[derive(Debug, Default, Deserialize)]
pub(super) struct UploadResponseDto {
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub error: Option<UploadErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadErrorDto {
    #[serde(default)]
    pub message: String,
}

impl UploadResponseDto {
    /// The hosted URL, when one was returned and is non-empty.
    pub(super) fn secure_url(self) -> Option<String> {
        self.secure_url.filter(|url| !url.trim().is_empty())
    }
}
