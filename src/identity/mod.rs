//! Identity provider: accounts, sessions and session-change notifications.
//!
//! The provider is the only source of truth for who is signed in. Every
//! session transition is published on a [`SessionBus`] so that the
//! admin session context can follow along without polling.

pub mod local;
pub mod session_bus;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use local::LocalIdentityProvider;
pub use session_bus::SessionBus;

use crate::domain::UserId;
use crate::store::StoreError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    /// Stable user id; also the profile primary key.
    pub id: UserId,
    /// Sign-in email, lower-cased.
    pub email: String,
}

/// An authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented by the client.
    pub access_token: String,
    /// Signed-in account.
    pub user: IdentityUser,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// `true` once `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session transition published by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A new session was issued.
    SignedIn {
        /// The new session.
        session: Session,
    },
    /// A session ended (sign-out or expiry).
    SignedOut {
        /// Token that is no longer valid.
        token: String,
    },
    /// A session was renewed under a new token.
    TokenRefreshed {
        /// Token being replaced.
        previous_token: String,
        /// Replacement session.
        session: Session,
    },
}

impl SessionChange {
    /// Event name as used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut { .. } => "signed_out",
            Self::TokenRefreshed { .. } => "token_refreshed",
        }
    }
}

/// Errors raised by an [`IdentityProvider`].
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Unknown email or wrong password.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("User already registered: {0}")]
    AlreadyRegistered(String),

    /// Password shorter than [`MIN_PASSWORD_LEN`].
    #[error("Password should be at least 6 characters")]
    WeakPassword,

    /// Email does not look like an address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Token unknown or expired.
    #[error("session not found or expired")]
    SessionNotFound,

    /// The account store failed.
    #[error("account store error: {0}")]
    Backend(String),
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Authentication backend.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Signs in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    /// Looks up a live session by token. Expired sessions are dropped.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, IdentityError>;

    /// Replaces a live session with a fresh token and expiry.
    async fn refresh(&self, token: &str) -> Result<Session, IdentityError>;

    /// Ends a session. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;

    /// Receives every future session transition.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}
