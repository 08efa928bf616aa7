//! Sign-in, sign-up and session DTOs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Profile;
use crate::identity::Session;

/// Request body for `POST /auth/login` and `POST /auth/signup`.
#[derive(Clone, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    /// Account email.
    pub email: String,
    /// Account password (at least 6 characters on sign-up).
    pub password: String,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signed-in account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionUser {
    /// User id.
    pub id: uuid::Uuid,
    /// Sign-in email.
    pub email: String,
    /// Admin access flag from the profile.
    pub is_admin: bool,
}

/// A live session as returned to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// The account.
    pub user: SessionUser,
}

impl SessionResponse {
    /// Combines a session with the account's admin flag.
    #[must_use]
    pub fn new(session: Session, is_admin: bool) -> Self {
        Self {
            access_token: session.access_token,
            expires_at: session.expires_at,
            user: SessionUser {
                id: *session.user.id.as_uuid(),
                email: session.user.email,
                is_admin,
            },
        }
    }

    /// Builds the response from a session and its profile.
    #[must_use]
    pub fn with_profile(session: Session, profile: &Profile) -> Self {
        Self::new(session, profile.is_admin)
    }
}
