//! Submitter identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier was empty.
    EmptyId,
    /// The identifier carried leading or trailing whitespace.
    SurroundingWhitespace,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "user id must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Opaque identifier issued by the authentication provider.
///
/// Provider uids are not UUIDs, so only emptiness and surrounding whitespace
/// are checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use cleantrack::domain::UserId;
    ///
    /// let id = UserId::new("u-42").expect("valid id");
    /// assert_eq!(id.as_ref(), "u-42");
    /// assert!(UserId::new(" ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::SurroundingWhitespace);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
