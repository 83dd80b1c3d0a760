//! Session tokens and the identity store behind the access guard.

use std::sync::Arc;

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::booking::{BookingError, Profile, StudentId};

/// An opaque bearer token handed to a client once.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a new random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hash under which the token is stored.
    pub fn hash(&self) -> TokenHash {
        TokenHash::of(&self.0)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret itself
        write!(f, "SessionToken({})", self.hash())
    }
}

/// SHA-256 of a session token, hex encoded. Raw tokens are never stored.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct TokenHash(String);

impl TokenHash {
    pub fn of(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 8 chars are enough for logs
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

/// Profiles and sessions: the identity provider the access guard trusts.
pub trait IdentityStore {
    /// Stores a new profile. Fails if the email is taken.
    fn create_profile(&self, profile: &Profile) -> Result<(), BookingError>;

    fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, BookingError>;

    fn store_session(&self, hash: &TokenHash, profile: &StudentId) -> Result<(), BookingError>;

    /// Resolves a session to its profile.
    fn profile_for_session(&self, hash: &TokenHash) -> Result<Option<Profile>, BookingError>;

    /// Cheap round trip used by the health check.
    fn ping(&self) -> Result<(), BookingError>;

    /// Issues a fresh token for `profile`.
    fn issue_session(&self, profile: &StudentId) -> Result<SessionToken, BookingError> {
        let token = SessionToken::generate();
        self.store_session(&token.hash(), profile)?;
        Ok(token)
    }
}

impl<T: IdentityStore + ?Sized> IdentityStore for Arc<T> {
    fn create_profile(&self, profile: &Profile) -> Result<(), BookingError> {
        (**self).create_profile(profile)
    }

    fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, BookingError> {
        (**self).profile_by_email(email)
    }

    fn store_session(&self, hash: &TokenHash, profile: &StudentId) -> Result<(), BookingError> {
        (**self).store_session(hash, profile)
    }

    fn profile_for_session(&self, hash: &TokenHash) -> Result<Option<Profile>, BookingError> {
        (**self).profile_for_session(hash)
    }

    fn ping(&self) -> Result<(), BookingError> {
        (**self).ping()
    }
}
