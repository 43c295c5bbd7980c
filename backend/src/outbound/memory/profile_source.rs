//! In-process user profile source.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{UserProfileSource, UserProfileSourceError};
use crate::domain::{UserId, UserProfile};

/// Fixed set of profiles, keyed by user id. Unknown users have no profile.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserProfileSource {
    profiles: HashMap<UserId, UserProfile>,
}

impl InMemoryUserProfileSource {
    /// Register `profile` for `user_id`, replacing any earlier one.
    pub fn with_profile(mut self, user_id: UserId, profile: UserProfile) -> Self {
        self.profiles.insert(user_id, profile);
        self
    }
}

#[async_trait]
impl UserProfileSource for InMemoryUserProfileSource {
    async fn find_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserProfileSourceError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}
