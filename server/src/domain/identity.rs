//! Identity primitives and the shared capability check.
//!
//! The external identity provider hands the application an opaque identity
//! string (typically an email address). Handlers turn the session identity
//! into an explicit [`Actor`] and pass it into every privileged call; no
//! component reads an ambient "current user".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain error returned when an identity string is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// Identity was missing or blank once trimmed.
    #[error("identity must not be empty")]
    Empty,
    /// Identity contains interior whitespace.
    #[error("identity must not contain whitespace")]
    ContainsWhitespace,
}

/// Opaque user identity established by the external identity provider.
///
/// ## Invariants
/// - trimmed, non-empty, and free of interior whitespace, so identities can
///   be stored in the project settings form as a space-delimited list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Construct a validated identity.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdentityValidationError::ContainsWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// An authenticated caller together with its admin capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    admin: bool,
}

impl Actor {
    /// Build an actor from a session identity and the admin flag derived
    /// from configuration.
    #[must_use]
    pub fn new(id: UserId, admin: bool) -> Self {
        Self { id, admin }
    }

    /// The caller's identity.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Whether the caller holds the admin capability.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// The single owner-or-admin capability check applied by every privileged
/// handler: the resource owner, any identity on the resource's
/// extra-authorized list, and any admin may manage the resource.
#[must_use]
pub fn can_manage(actor: &Actor, owner: &UserId, other_users: &[UserId]) -> bool {
    actor.is_admin() || actor.id() == owner || other_users.contains(actor.id())
}
