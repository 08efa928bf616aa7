//! Public registration handlers: submit the form, show the confirmation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ConfirmationResponse, EventView, RegistrationRequest, RegistrationView};
use crate::app_state::AppState;
use crate::domain::{EventId, RegistrationId};
use crate::error::{ErrorResponse, PortalError};

/// `POST /registrations` — Register an attendee for an event.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] with per-field messages when the
/// event is unknown or the form is incomplete; nothing is stored then.
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    tag = "Registrations",
    summary = "Submit a registration",
    description = "Validates the form, snapshots the event's title and price, and stores the registration as pending.",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration stored", body = ConfirmationResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
    )
)]
pub async fn create_registration(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let (event_id, form) = req.into_form();
    let event_id =
        event_id.ok_or_else(|| PortalError::field("event_id", "Please select an event"))?;

    let confirmed = state
        .catalog
        .create_registration(EventId::from_uuid(event_id), form)
        .await?;
    let (registration, event) = confirmed.into_parts();

    Ok((
        StatusCode::CREATED,
        Json(ConfirmationResponse {
            registration: RegistrationView::from(&registration),
            event: Some(EventView::from(&event)),
        }),
    ))
}

/// `GET /registrations/{id}` — Confirmation record.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if the registration does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/{id}",
    tag = "Registrations",
    summary = "Get confirmation",
    description = "Returns a registration together with the event it is for.",
    params(
        ("id" = uuid::Uuid, Path, description = "Registration UUID"),
    ),
    responses(
        (status = 200, description = "Confirmation record", body = ConfirmationResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse),
    )
)]
pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, PortalError> {
    let confirmation = state
        .catalog
        .get_registration(RegistrationId::from_uuid(id))
        .await?;
    Ok(Json(ConfirmationResponse {
        registration: RegistrationView::from(&confirmation.registration),
        event: confirmation.event.as_ref().map(EventView::from),
    }))
}

/// Public registration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registrations", post(create_registration))
        .route("/registrations/{id}", get(get_registration))
}
