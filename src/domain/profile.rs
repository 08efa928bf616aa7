//! Per-user profile rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Application profile linked one-to-one with an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the identity provider's user id.
    pub id: UserId,
    /// Sign-in email.
    pub email: String,
    /// Grants access to the admin back office.
    #[serde(default)]
    pub is_admin: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
