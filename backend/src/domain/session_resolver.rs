//! Resolve the acting [`Session`] from the stored user profile.
//!
//! Configuration only names the user; role and display name always come
//! from the profile store.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{UserProfileSource, UserProfileSourceError};
use crate::domain::{Error, Session, UserId};

fn map_profile_error(error: UserProfileSourceError) -> Error {
    match error {
        UserProfileSourceError::Connection { message } => {
            Error::service_unavailable(format!("user profile store unavailable: {message}"))
        }
        UserProfileSourceError::Query { message } => {
            Error::service_unavailable(format!("user profile lookup failed: {message}"))
        }
        UserProfileSourceError::Decode { message } => {
            Error::internal(format!("stored user profile is malformed: {message}"))
        }
    }
}

/// Builds sessions from a [`UserProfileSource`].
#[derive(Clone)]
pub struct SessionResolver<P: ?Sized> {
    profiles: Arc<P>,
}

impl<P> SessionResolver<P>
where
    P: UserProfileSource + ?Sized,
{
    /// Create a resolver reading from `profiles`.
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    /// Resolve the session of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::ServiceUnavailable`] when the
    /// profile store cannot be read and
    /// [`crate::domain::ErrorCode::InternalError`] when the stored profile
    /// is malformed.
    pub async fn resolve(&self, user_id: UserId) -> Result<Session, Error> {
        let profile = self
            .profiles
            .find_profile(&user_id)
            .await
            .map_err(map_profile_error)?;
        debug!(
            user_id = %user_id,
            profile_found = profile.is_some(),
            "resolved session"
        );
        Ok(Session::from_profile(user_id, profile))
    }
}
