//! Sign-in, sign-up, sign-out and session lookup.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CredentialsRequest, SessionResponse};
use crate::app_state::AppState;
use crate::auth::bearer_token;
use crate::error::{ErrorResponse, PortalError};

/// `POST /auth/login` — Admin sign-in.
///
/// # Errors
///
/// - [`PortalError::Auth`] for wrong credentials.
/// - [`PortalError::Forbidden`] for accounts without admin access.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Admin sign-in",
    description = "Signs in with email and password. Accounts without admin access are signed out again and refused.",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid login credentials", body = ErrorResponse),
        (status = 403, description = "No admin access", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let (session, profile) = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(SessionResponse::with_profile(session, &profile)))
}

/// `POST /auth/signup` — Create an account.
///
/// # Errors
///
/// Returns [`PortalError::InvalidRequest`] for a taken or malformed email
/// or a password shorter than six characters.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    summary = "Sign up",
    description = "Creates an account with a non-admin profile and signs it in.",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Sign-up refused", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let (session, profile) = state.auth.sign_up(&req.email, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::with_profile(session, &profile)),
    ))
}

/// `POST /auth/logout` — End the bearer's session.
///
/// # Errors
///
/// Returns [`PortalError::Auth`] without a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Sign out",
    description = "Ends the session named by the bearer token. Unknown tokens are accepted.",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PortalError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| PortalError::Auth("missing bearer token".to_string()))?;
    state.auth.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/session` — The bearer's live session.
///
/// # Errors
///
/// Returns [`PortalError::Auth`] without a live session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    tag = "Auth",
    summary = "Current session",
    description = "Returns the session behind the bearer token with the account's admin flag.",
    responses(
        (status = 200, description = "Live session", body = SessionResponse),
        (status = 401, description = "No live session", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PortalError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| PortalError::Auth("missing bearer token".to_string()))?;
    let session = state
        .auth
        .session(&token)
        .await?
        .ok_or_else(|| PortalError::Auth("session not found or expired".to_string()))?;
    let is_admin = state
        .auth
        .profile(session.user.id)
        .await?
        .is_some_and(|profile| profile.is_admin);
    Ok(Json(SessionResponse::new(session, is_admin)))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
}
