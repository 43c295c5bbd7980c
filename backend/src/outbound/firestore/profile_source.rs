//! Reqwest-backed Firestore user profile source.
//!
//! Reads `users/{uid}` documents written at registration. A missing
//! document is not an error: the session falls back to a citizen.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::client::{FirestoreClient, FirestoreConfig, is_unavailable};
use super::dto::{DocumentDto, decode_profile};
use crate::domain::ports::{UserProfileSource, UserProfileSourceError};
use crate::domain::{UserId, UserProfile};
use crate::outbound::status_message;

/// Collection holding user profile documents.
pub const USERS_COLLECTION: &str = "users";

/// Profile source adapter backed by a Firestore `users` collection.
pub struct FirestoreUserProfileSource {
    client: FirestoreClient,
}

impl FirestoreUserProfileSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: FirestoreConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: FirestoreClient::new(config)?,
        })
    }
}

fn parse_profile_response(
    status: StatusCode,
    body: &[u8],
) -> Result<Option<UserProfile>, UserProfileSourceError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let message = status_message(status, body);
        return Err(if is_unavailable(status) {
            UserProfileSourceError::connection(message)
        } else {
            UserProfileSourceError::query(message)
        });
    }
    let document: DocumentDto = serde_json::from_slice(body).map_err(|error| {
        UserProfileSourceError::decode(format!("invalid document payload: {error}"))
    })?;
    decode_profile(&document)
        .map(Some)
        .map_err(UserProfileSourceError::decode)
}

#[async_trait]
impl UserProfileSource for FirestoreUserProfileSource {
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserProfileSourceError> {
        let (status, body) = self
            .client
            .get_document(USERS_COLLECTION, user_id.as_ref())
            .await
            .map_err(|error| UserProfileSourceError::connection(error.to_string()))?;
        let profile = parse_profile_response(status, &body)?;
        debug!(
            user_id = %user_id,
            found = profile.is_some(),
            "firestore profile lookup completed"
        );
        Ok(profile)
    }
}
