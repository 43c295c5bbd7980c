//! Shared REST plumbing for the Firestore adapters.
//!
//! Every request carries the optional web API key as `key=` and the
//! optional Firebase ID token as a bearer token. Transport failures are
//! returned as [`reqwest::Error`] so each adapter maps them into its own
//! port error.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;

const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for a Firestore project.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST root, usually `https://firestore.googleapis.com/v1`.
    pub base_url: Url,
    /// Google Cloud project id.
    pub project_id: String,
    /// Web API key sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// Firebase ID token sent as a bearer token.
    pub id_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

pub(super) struct FirestoreClient {
    client: Client,
    documents_url: String,
    documents_path: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreClient {
    pub(super) fn new(config: FirestoreConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let documents_path = format!(
            "projects/{}/databases/{DEFAULT_DATABASE}/documents",
            config.project_id
        );
        let documents_url = format!(
            "{}/{documents_path}",
            config.base_url.as_str().trim_end_matches('/')
        );
        Ok(Self {
            client,
            documents_url,
            documents_path,
            api_key: config.api_key,
            id_token: config.id_token,
        })
    }

    /// Resource name of `collection/id`, as used inside write payloads.
    pub(super) fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_path)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }
        if let Some(token) = &self.id_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    /// Fetch one document; the caller interprets the status.
    pub(super) async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
        let url = self.document_url(collection, id);
        self.execute(self.request(Method::GET, &url)).await
    }

    /// POST `body` to a database-level action such as `commit` or `runQuery`.
    pub(super) async fn post_json<B: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
        let url = format!("{}:{action}", self.documents_url);
        self.execute(self.request(Method::POST, &url).json(body))
            .await
    }
}

/// Statuses Firestore uses for transient unavailability.
pub(super) fn is_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[cfg(test)]
pub(super) fn test_config() -> FirestoreConfig {
    FirestoreConfig {
        base_url: Url::parse("https://firestore.googleapis.com/v1/").expect("valid url"),
        project_id: "cleantrack-demo".to_owned(),
        api_key: Some("key-123".to_owned()),
        id_token: None,
        timeout: Duration::from_secs(5),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn builds_document_names_under_project_database() {
        let client = FirestoreClient::new(test_config()).expect("client should build");

        assert_eq!(
            client.document_name("complaints", "abc"),
            "projects/cleantrack-demo/databases/(default)/documents/complaints/abc"
        );
        assert_eq!(
            client.document_url("users", "uid-1"),
            "https://firestore.googleapis.com/v1/projects/cleantrack-demo/databases/(default)/documents/users/uid-1"
        );
    }

    #[rstest]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::REQUEST_TIMEOUT, true)]
    #[case(StatusCode::FORBIDDEN, false)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn classifies_transient_statuses(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(is_unavailable(status), expected);
    }
}
