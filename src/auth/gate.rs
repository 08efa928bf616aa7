//! Admin gate: the middleware in front of every `/admin` route.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use super::session_context::AuthState;
use crate::app_state::AppState;
use crate::error::PortalError;
use crate::identity::IdentityUser;

/// Outcome of checking an [`AuthState`] against the admin requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Still resolving; the caller should retry.
    Pending,
    /// No live session.
    Unauthenticated,
    /// Signed in without admin access.
    Forbidden,
    /// Signed in as an admin.
    Allow(IdentityUser),
}

impl GateDecision {
    /// Decides from a resolved state. Loading is never read as "not admin".
    #[must_use]
    pub fn from_state(state: AuthState) -> Self {
        match state {
            AuthState::Loading => Self::Pending,
            AuthState::SignedOut => Self::Unauthenticated,
            AuthState::SignedIn {
                is_admin: false, ..
            } => Self::Forbidden,
            AuthState::SignedIn {
                user,
                is_admin: true,
            } => Self::Allow(user),
        }
    }
}

/// Admin account attached to gated requests as an extension.
#[derive(Debug, Clone)]
pub struct AdminUser(pub IdentityUser);

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Lets the request through only for a signed-in admin.
///
/// # Errors
///
/// - [`PortalError::Auth`] without a live session.
/// - [`PortalError::Forbidden`] for non-admin accounts.
/// - [`PortalError::SessionPending`] while the session is still loading.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, PortalError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| PortalError::Auth("missing bearer token".to_string()))?;
    if state.auth.session(&token).await?.is_none() {
        return Err(PortalError::Auth("session not found or expired".to_string()));
    }

    let resolved = state
        .sessions
        .resolve(&token, state.session_resolve_timeout)
        .await;
    match GateDecision::from_state(resolved) {
        GateDecision::Allow(user) => {
            request.extensions_mut().insert(AdminUser(user));
            Ok(next.run(request).await)
        }
        GateDecision::Pending => Err(PortalError::SessionPending),
        GateDecision::Unauthenticated => {
            Err(PortalError::Auth("session not found or expired".to_string()))
        }
        GateDecision::Forbidden => Err(PortalError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::domain::UserId;

    fn user() -> IdentityUser {
        IdentityUser {
            id: UserId::new(),
            email: "a@b.co".to_string(),
        }
    }

    #[test]
    fn loading_is_pending_not_forbidden() {
        assert_eq!(GateDecision::from_state(AuthState::Loading), GateDecision::Pending);
    }

    #[test]
    fn decisions_follow_state() {
        assert_eq!(
            GateDecision::from_state(AuthState::SignedOut),
            GateDecision::Unauthenticated
        );
        assert_eq!(
            GateDecision::from_state(AuthState::SignedIn {
                user: user(),
                is_admin: false
            }),
            GateDecision::Forbidden
        );
        let admin = user();
        assert_eq!(
            GateDecision::from_state(AuthState::SignedIn {
                user: admin.clone(),
                is_admin: true
            }),
            GateDecision::Allow(admin)
        );
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc".to_string()));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
