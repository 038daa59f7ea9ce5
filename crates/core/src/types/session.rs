//! Anonymous session key type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionKeyError {
    /// The input string is empty.
    #[error("session key cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("session key must be at most {max} bytes")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("session key contains invalid characters")]
    InvalidCharacter,
}

/// Opaque key identifying an anonymous shopper's session.
///
/// The value is passed through verbatim from the client (usually the
/// `X-Session-Key` header); only its shape is validated here.
///
/// ## Constraints
///
/// - Length: 1-128 bytes
/// - No whitespace or control characters
///
/// ## Examples
///
/// ```
/// use cartwheel_core::SessionKey;
///
/// assert!(SessionKey::parse("b7c1e2d4-session").is_ok());
/// assert!(SessionKey::parse("").is_err());
/// assert!(SessionKey::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    /// Maximum length of a session key in bytes.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `SessionKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 bytes, or
    /// contains whitespace/control characters.
    pub fn parse(s: &str) -> Result<Self, SessionKeyError> {
        if s.is_empty() {
            return Err(SessionKeyError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SessionKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SessionKeyError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the session key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionKey {
    type Err = SessionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = SessionKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
