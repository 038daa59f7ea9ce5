//! Cart ownership.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{SessionKey, UserId};

/// The single identity a cart belongs to.
///
/// A cart is owned by exactly one authenticated user or exactly one
/// anonymous session. Modelling this as a sum type makes the "both set"
/// and "neither set" states unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Owner {
    /// An authenticated user.
    User(UserId),
    /// An anonymous session.
    Session(SessionKey),
}

impl Owner {
    /// Returns the user id if this is a user owner.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    /// Returns the session key if this is a session owner.
    #[must_use]
    pub const fn session_key(&self) -> Option<&SessionKey> {
        match self {
            Self::User(_) => None,
            Self::Session(key) => Some(key),
        }
    }

    /// Returns `true` for an authenticated user.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Session(key) => write!(f, "session:{key}"),
        }
    }
}

impl From<UserId> for Owner {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl From<SessionKey> for Owner {
    fn from(key: SessionKey) -> Self {
        Self::Session(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let user = Owner::User(UserId::new(5));
        assert_eq!(user.user_id(), Some(UserId::new(5)));
        assert!(user.session_key().is_none());
        assert!(user.is_user());

        let key = SessionKey::parse("anon-1").unwrap();
        let session = Owner::Session(key.clone());
        assert_eq!(session.session_key(), Some(&key));
        assert!(session.user_id().is_none());
        assert!(!session.is_user());
    }

    #[test]
    fn test_display() {
        assert_eq!(Owner::User(UserId::new(3)).to_string(), "user:3");
        let key = SessionKey::parse("abc").unwrap();
        assert_eq!(Owner::Session(key).to_string(), "session:abc");
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&Owner::User(UserId::new(9))).unwrap();
        assert_eq!(json, r#"{"type":"user","id":9}"#);

        let parsed: Owner = serde_json::from_str(r#"{"type":"session","id":"s-1"}"#).unwrap();
        assert_eq!(parsed, Owner::Session(SessionKey::parse("s-1").unwrap()));
    }
}
