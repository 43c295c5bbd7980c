//! Explicit session context handed to callers of the complaint workflow.
//!
//! The workflow itself never reads a session: it takes the submitter id and
//! the acting display name as parameters. Calling contexts resolve a
//! [`Session`] once from the stored [`UserProfile`] and derive those
//! parameters from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Error, UserId};

const FALLBACK_ACTOR_NAME: &str = "Admin";
const FALLBACK_SUBMITTER_NAME: &str = "Unknown User";

/// Account role recorded in the user profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Citizen filing complaints.
    #[default]
    User,
    /// Municipal administrator triaging complaints.
    Admin,
}

/// Error returned when parsing a [`Role`] from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl Role {
    /// Lenient lookup for stored profiles: only `admin` grants the
    /// administrator role, anything else is a citizen.
    pub fn lookup(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Profile document kept for each registered user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name given at registration.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Stored role; absent or unknown roles are [`Role::User`].
    pub role: Role,
}

/// The signed-in identity on whose behalf workflow calls are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    name: Option<String>,
    email: Option<String>,
    role: Role,
}

impl Session {
    /// Build a session from profile fields. Blank name or email values are
    /// treated as absent.
    pub fn new(user_id: UserId, name: Option<String>, email: Option<String>, role: Role) -> Self {
        Self {
            user_id,
            name: non_blank(name),
            email: non_blank(email),
            role,
        }
    }

    /// Build a session from the stored profile of `user_id`.
    ///
    /// A user without a profile document is a citizen with no display name.
    ///
    /// # Examples
    /// ```
    /// use cleantrack::domain::{Role, Session, UserId};
    ///
    /// let id = UserId::new("u-9").expect("valid id");
    /// let session = Session::from_profile(id, None);
    /// assert_eq!(session.role(), Role::User);
    /// assert_eq!(session.submitter_name(), "Unknown User");
    /// ```
    pub fn from_profile(user_id: UserId, profile: Option<UserProfile>) -> Self {
        let profile = profile.unwrap_or_default();
        Self::new(user_id, profile.name, profile.email, profile.role)
    }

    /// Identifier of the signed-in user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role of the signed-in user.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the session may use administrator views.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name recorded as `updatedBy` on status events.
    ///
    /// Falls back to the email address, then to `"Admin"`.
    ///
    /// # Examples
    /// ```
    /// use cleantrack::domain::{Role, Session, UserId};
    ///
    /// let id = UserId::new("u-1").expect("valid id");
    /// let session = Session::new(id, None, Some("ops@city.example".into()), Role::Admin);
    /// assert_eq!(session.actor_name(), "ops@city.example");
    /// ```
    pub fn actor_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(FALLBACK_ACTOR_NAME)
    }

    /// Display name recorded as a complaint's `userName`: the profile name,
    /// else `"Unknown User"`.
    pub fn submitter_name(&self) -> &str {
        self.name.as_deref().unwrap_or(FALLBACK_SUBMITTER_NAME)
    }

    /// Fail with [`super::ErrorCode::Forbidden`] unless the session is an
    /// administrator.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "user {} is not an administrator",
                self.user_id
            )))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn user_id() -> UserId {
        UserId::new("uid-7").expect("valid id")
    }

    #[rstest]
    #[case(Some("Asha Rao"), Some("asha@city.example"), "Asha Rao")]
    #[case(None, Some("asha@city.example"), "asha@city.example")]
    #[case(Some("  "), None, "Admin")]
    #[case(None, None, "Admin")]
    fn actor_name_falls_back_in_order(
        user_id: UserId,
        #[case] name: Option<&str>,
        #[case] email: Option<&str>,
        #[case] expected: &str,
    ) {
        let session = Session::new(
            user_id,
            name.map(str::to_owned),
            email.map(str::to_owned),
            Role::Admin,
        );
        assert_eq!(session.actor_name(), expected);
    }

    #[rstest]
    #[case(Some("Asha Rao"), Some("asha@city.example"), "Asha Rao")]
    #[case(None, Some("asha@city.example"), "Unknown User")]
    #[case(None, None, "Unknown User")]
    fn submitter_name_falls_back_to_unknown_user(
        user_id: UserId,
        #[case] name: Option<&str>,
        #[case] email: Option<&str>,
        #[case] expected: &str,
    ) {
        let session = Session::new(
            user_id,
            name.map(str::to_owned),
            email.map(str::to_owned),
            Role::User,
        );
        assert_eq!(session.submitter_name(), expected);
    }

    #[rstest]
    fn missing_profile_resolves_to_citizen(user_id: UserId) {
        let session = Session::from_profile(user_id, None);
        assert_eq!(session.role(), Role::User);
        assert!(session.require_admin().is_err());
    }

    #[rstest]
    fn stored_profile_carries_role_and_name(user_id: UserId) {
        let session = Session::from_profile(
            user_id,
            Some(UserProfile {
                name: Some("Ward Office".to_owned()),
                email: None,
                role: Role::Admin,
            }),
        );
        assert!(session.is_admin());
        assert_eq!(session.actor_name(), "Ward Office");
    }

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("user", Role::User)]
    #[case("moderator", Role::User)]
    #[case("", Role::User)]
    fn stored_roles_default_to_user(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::lookup(raw), expected);
    }

    #[rstest]
    fn require_admin_rejects_citizens(user_id: UserId) {
        let session = Session::new(user_id, None, None, Role::User);
        let error = session.require_admin().expect_err("citizen is not admin");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn role_parses_known_values() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("root".parse::<Role>().is_err());
    }
}
