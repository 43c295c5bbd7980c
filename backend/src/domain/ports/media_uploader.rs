//! Port for turning local image references into durable URLs.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};

use super::define_port_error;

define_port_error! {
    /// Errors raised by media upload adapters.
    pub enum UploadError {
        /// The local image could not be read.
        Read { message: String } =>
            "failed to read local image: {message}",
        /// The upload service could not be reached.
        Transport { message: String } =>
            "image upload transport failed: {message}",
        /// The upload timed out.
        Timeout { message: String } =>
            "image upload timed out: {message}",
        /// The upload service refused the image.
        Rejected { message: String } =>
            "image upload rejected: {message}",
        /// The upload service reported success without a URL.
        MissingUrl =>
            "upload succeeded but no URL was returned",
    }
}

/// Reference to an image on the submitting device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalImage(PathBuf);

impl LocalImage {
    /// Reference an image by path. A `file://` prefix is accepted.
    ///
    /// # Examples
    /// ```
    /// use cleantrack::domain::ports::LocalImage;
    ///
    /// let image = LocalImage::new("file:///sdcard/DCIM/pothole.png");
    /// assert_eq!(image.extension(), "png");
    /// ```
    pub fn new(reference: impl AsRef<str>) -> Self {
        let raw = reference.as_ref();
        Self(PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw)))
    }

    /// Filesystem path of the image.
    pub fn path(&self) -> &Path {
        self.0.as_path()
    }

    /// Lower-cased file extension, `jpg` when there is none.
    pub fn extension(&self) -> String {
        self.0
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map_or_else(|| "jpg".to_owned(), str::to_ascii_lowercase)
    }

    /// MIME type sent with the upload: PNG for `.png`, JPEG otherwise.
    pub fn mime_type(&self) -> &'static str {
        if self.extension() == "png" {
            "image/png"
        } else {
            "image/jpeg"
        }
    }
}

impl fmt::Display for LocalImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Port for uploading one image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload `image` and return its durable URL.
    async fn upload(&self, image: &LocalImage) -> Result<String, UploadError>;
}

/// Upload every image, keeping at most `concurrency` uploads in flight.
///
/// URLs come back in input order whatever order the uploads finish in. The
/// first failure aborts the batch and is returned.
pub async fn upload_all<U>(
    uploader: &U,
    images: &[LocalImage],
    concurrency: usize,
) -> Result<Vec<String>, UploadError>
where
    U: MediaUploader + ?Sized,
{
    let uploads: Vec<_> = images.iter().map(|image| uploader.upload(image)).collect();
    stream::iter(uploads)
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rstest::rstest;

    use super::*;

    /// Uploader whose latency shrinks along the batch, so later images
    /// finish first.
    struct StaggeredUploader {
        started: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaUploader for StaggeredUploader {
        async fn upload(&self, image: &LocalImage) -> Result<String, UploadError> {
            let name = image.to_string();
            self.started.lock().expect("lock").push(name.clone());
            let delay = match name.as_str() {
                "a.jpg" => 40,
                "b.jpg" => 5,
                _ => 1,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if name == "broken.jpg" {
                return Err(UploadError::rejected("corrupt file"));
            }
            Ok(format!("https://cdn.example/{name}"))
        }
    }

    fn images(names: &[&str]) -> Vec<LocalImage> {
        names.iter().map(|name| LocalImage::new(name)).collect()
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[tokio::test]
    async fn upload_all_preserves_input_order(#[case] concurrency: usize) {
        let uploader = StaggeredUploader {
            started: Mutex::new(Vec::new()),
        };

        let urls = upload_all(&uploader, &images(&["a.jpg", "b.jpg", "c.jpg"]), concurrency)
            .await
            .expect("uploads succeed");

        assert_eq!(
            urls,
            [
                "https://cdn.example/a.jpg",
                "https://cdn.example/b.jpg",
                "https://cdn.example/c.jpg",
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sequential_upload_stops_at_first_failure() {
        let uploader = StaggeredUploader {
            started: Mutex::new(Vec::new()),
        };

        let error = upload_all(&uploader, &images(&["a.jpg", "broken.jpg", "c.jpg"]), 1)
            .await
            .expect_err("batch fails");

        assert!(matches!(error, UploadError::Rejected { .. }));
        assert_eq!(
            *uploader.started.lock().expect("lock"),
            ["a.jpg", "broken.jpg"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn empty_batch_uploads_nothing() {
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let urls = upload_all(&uploader, &[], 2).await.expect("nothing to do");
        assert!(urls.is_empty());
    }

    fn assert_send<T: Send>(_: T) {}

    #[rstest]
    fn batch_upload_can_run_inside_send_futures() {
        let uploader: Arc<dyn MediaUploader> = Arc::new(MockMediaUploader::new());
        let batch = async move {
            let pending = images(&["a.jpg", "b.jpg"]);
            upload_all(uploader.as_ref(), &pending, 2).await
        };
        assert_send(batch);
    }

    #[rstest]
    #[case("file:///tmp/photo.PNG", "png", "image/png")]
    #[case("/tmp/photo.jpeg", "jpeg", "image/jpeg")]
    #[case("/tmp/photo", "jpg", "image/jpeg")]
    fn local_image_derives_type_from_extension(
        #[case] reference: &str,
        #[case] extension: &str,
        #[case] mime: &str,
    ) {
        let image = LocalImage::new(reference);
        assert_eq!(image.extension(), extension);
        assert_eq!(image.mime_type(), mime);
    }
}
