//! Reqwest-backed Cloudinary uploader.
//!
//! Performs unsigned multipart uploads against one cloud. Each image is
//! read from disk, named `cleantrack_<millis>.<ext>`, and posted with the
//! configured preset and folder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::UploadResponseDto;
use crate::outbound::status_message;
use crate::domain::ports::{LocalImage, MediaUploader, UploadError};

/// Default Cloudinary API root.
pub const DEFAULT_CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";
const FILE_NAME_PREFIX: &str = "cleantrack";

/// Account and preset settings for uploads.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// API root; [`DEFAULT_CLOUDINARY_API`] outside tests.
    pub api_base: Url,
    /// Cloud name identifying the account.
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Destination folder.
    pub folder: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Media uploader adapter posting images to Cloudinary.
pub struct CloudinaryUploader {
    client: Client,
    endpoint: String,
    upload_preset: String,
    folder: String,
    clock: Arc<dyn Clock>,
}

impl CloudinaryUploader {
    /// Build an uploader using a reqwest client with an explicit request
    /// timeout. `clock` names the uploaded files.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: CloudinaryConfig, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: upload_endpoint(&config.api_base, &config.cloud_name),
            upload_preset: config.upload_preset,
            folder: config.folder,
            clock,
        })
    }

    fn file_name(&self, image: &LocalImage) -> String {
        format!(
            "{FILE_NAME_PREFIX}_{}.{}",
            self.clock.utc().timestamp_millis(),
            image.extension()
        )
    }
}

fn upload_endpoint(api_base: &Url, cloud_name: &str) -> String {
    format!(
        "{}/{cloud_name}/image/upload",
        api_base.as_str().trim_end_matches('/')
    )
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, image: &LocalImage) -> Result<String, UploadError> {
        let bytes = tokio::fs::read(image.path())
            .await
            .map_err(|error| UploadError::read(format!("{image}: {error}")))?;
        let part = Part::bytes(bytes)
            .file_name(self.file_name(image))
            .mime_str(image.mime_type())
            .map_err(|error| UploadError::read(format!("{image}: {error}")))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        let url = parse_upload_response(status, body.as_ref())?;
        debug!(image = %image, url = %url, "image uploaded");
        Ok(url)
    }
}

fn parse_upload_response(status: StatusCode, body: &[u8]) -> Result<String, UploadError> {
    let decoded = serde_json::from_slice::<UploadResponseDto>(body);
    if let Ok(UploadResponseDto {
        error: Some(error), ..
    }) = &decoded
    {
        return Err(UploadError::rejected(error.message.as_str()));
    }
    if !status.is_success() {
        return Err(map_status_error(status, body));
    }
    decoded
        .map_err(|error| UploadError::transport(format!("invalid upload response: {error}")))?
        .secure_url()
        .ok_or_else(UploadError::missing_url)
}

fn map_transport_error(error: reqwest::Error) -> UploadError {
    if error.is_timeout() {
        UploadError::timeout(error.to_string())
    } else {
        UploadError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UploadError {
    let message = status_message(status, body);

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => UploadError::timeout(message),
        _ if status.is_client_error() => UploadError::rejected(message),
        _ => UploadError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Cloudinary helpers.

    use std::io::Write;

    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(1_767_225_600_123)
                .single()
                .expect("valid timestamp")
        }
    }

    fn uploader() -> CloudinaryUploader {
        CloudinaryUploader::new(
            CloudinaryConfig {
                api_base: Url::parse(DEFAULT_CLOUDINARY_API).expect("valid url"),
                cloud_name: "demo-cloud".to_owned(),
                upload_preset: "cleantrack_uploads".to_owned(),
                folder: "cleantrack".to_owned(),
                timeout: Duration::from_secs(5),
            },
            Arc::new(FixtureClock),
        )
        .expect("client should build")
    }

    #[test]
    fn targets_the_cloud_image_upload_endpoint() {
        assert_eq!(
            uploader().endpoint,
            "https://api.cloudinary.com/v1_1/demo-cloud/image/upload"
        );
    }

    #[rstest]
    #[case("file:///tmp/photo.PNG", "cleantrack_1767225600123.png")]
    #[case("/tmp/photo.jpeg", "cleantrack_1767225600123.jpeg")]
    #[case("/tmp/photo", "cleantrack_1767225600123.jpg")]
    fn names_files_by_clock_and_extension(#[case] reference: &str, #[case] expected: &str) {
        assert_eq!(uploader().file_name(&LocalImage::new(reference)), expected);
    }

    #[test]
    fn returns_secure_url_on_success() {
        let url = parse_upload_response(
            StatusCode::OK,
            br#"{"secure_url": "https://res.cloudinary.com/demo/image/upload/a.jpg"}"#,
        )
        .expect("url present");

        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/a.jpg");
    }

    #[rstest]
    #[case::error_with_ok_status(StatusCode::OK)]
    #[case::error_with_bad_request(StatusCode::BAD_REQUEST)]
    fn error_object_is_rejection(#[case] status: StatusCode) {
        let error = parse_upload_response(
            status,
            br#"{"error": {"message": "Upload preset not found"}}"#,
        )
        .expect_err("error reported");

        assert_eq!(error, UploadError::rejected("Upload preset not found"));
    }

    #[rstest]
    #[case::absent(br#"{"public_id": "a"}"#.as_slice())]
    #[case::empty(br#"{"secure_url": ""}"#.as_slice())]
    fn success_without_url_is_missing_url(#[case] body: &[u8]) {
        let error = parse_upload_response(StatusCode::OK, body).expect_err("no url");

        assert_eq!(error, UploadError::missing_url());
    }

    #[rstest]
    #[case::timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "Rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_non_json_failures_by_status(#[case] status: StatusCode, #[case] expected: &str) {
        let error = parse_upload_response(status, b"<html>upstream error</html>")
            .expect_err("failure status");

        let actual = match error {
            UploadError::Timeout { .. } => "Timeout",
            UploadError::Rejected { .. } => "Rejected",
            UploadError::Transport { .. } => "Transport",
            _ => "other",
        };
        assert_eq!(actual, expected, "{error}");
    }

    #[tokio::test]
    async fn unreadable_file_fails_before_any_request() {
        let error = uploader()
            .upload(&LocalImage::new("/definitely/not/here.jpg"))
            .await
            .expect_err("missing file");

        assert!(matches!(error, UploadError::Read { .. }), "{error}");
    }

    #[test]
    fn local_image_can_point_at_a_real_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("temp file");
        file.write_all(b"\x89PNG").expect("write");

        let image = LocalImage::new(file.path().to_string_lossy());

        assert_eq!(image.mime_type(), "image/png");
        assert!(image.path().exists());
    }
}
