//! Port for reading the stored profile of a signed-in user.
//!
//! Profiles are the authority for a session's role. A user without a
//! profile document is treated as a citizen.

use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user profile adapters.
    pub enum UserProfileSourceError {
        /// The profile store could not be reached or timed out.
        Connection { message: String } =>
            "user profile store connection failed: {message}",
        /// The profile store rejected the lookup.
        Query { message: String } =>
            "user profile lookup failed: {message}",
        /// A stored profile could not be decoded.
        Decode { message: String } =>
            "user profile store returned an undecodable profile: {message}",
    }
}

/// Port for fetching user profiles by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileSource: Send + Sync {
    /// Fetch the profile of `user_id`, or `None` when none is stored.
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserProfileSourceError>;
}
