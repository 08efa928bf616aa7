//! Admin back-office handlers. Every route here sits behind
//! [`require_admin`].

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    DashboardResponse, EventForm, EventView, GalleryForm, GalleryImageView,
    RegistrationListParams, RegistrationListResponse, RegistrationView, SponsorForm, SponsorView,
    StatusUpdateRequest,
};
use crate::api::upload::MultipartBody;
use crate::app_state::AppState;
use crate::auth::require_admin;
use crate::domain::classifier::festival_offset;
use crate::domain::csv_export::{export_filename, registrations_csv};
use crate::domain::filter::{Search, StatusFilter, filter_registrations};
use crate::domain::{EventId, GalleryImageId, PaymentStatus, Registration, RegistrationId, SponsorId};
use crate::error::{ErrorResponse, PortalError};

/// Multipart part carrying an event poster or gallery image.
const IMAGE_PART: &str = "image";
/// Multipart part carrying a sponsor logo.
const LOGO_PART: &str = "logo";

// ── Dashboard ───────────────────────────────────────────────────────────

/// `GET /admin/dashboard` — Row counts.
///
/// # Errors
///
/// Returns [`PortalError::Store`] when a count fails.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Admin",
    summary = "Dashboard counts",
    description = "Exact numbers of events, gallery images and registrations.",
    responses(
        (status = 200, description = "Counts", body = DashboardResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, PortalError> {
    let stats = state.catalog.dashboard_stats().await?;
    Ok(Json(DashboardResponse::from(stats)))
}

// ── Events ──────────────────────────────────────────────────────────────

/// `POST /admin/events` — Create an event.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] for a missing title, a bad date or
/// a negative price; nothing is uploaded or stored then.
#[utoipa::path(
    post,
    path = "/api/v1/admin/events",
    tag = "Admin",
    summary = "Create event",
    description = "Multipart form with the event fields and an optional `image` file part. The image is uploaded before the row is written.",
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PortalError> {
    let (form, image) = MultipartBody::read(multipart, IMAGE_PART)
        .await?
        .into_parts::<EventForm>()?;
    let event = state.catalog.create_event(form.into_input(), image).await?;
    Ok((StatusCode::CREATED, Json(EventView::from(&event))))
}

/// `PATCH /admin/events/{id}` — Update an event.
///
/// # Errors
///
/// - [`PortalError::Validation`] for an invalid present field.
/// - [`PortalError::NotFound`] if the event does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/events/{id}",
    tag = "Admin",
    summary = "Update event",
    description = "Multipart form with the fields to change and an optional replacement `image`. Absent fields are left untouched.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = EventView),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PortalError> {
    let (form, image) = MultipartBody::read(multipart, IMAGE_PART)
        .await?
        .into_parts::<EventForm>()?;
    let event = state
        .catalog
        .update_event(EventId::from_uuid(id), form.into_patch(), image)
        .await?;
    Ok(Json(EventView::from(&event)))
}

/// `DELETE /admin/events/{id}` — Delete an event and its poster.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/events/{id}",
    tag = "Admin",
    summary = "Delete event",
    description = "Deletes the event. Its stored poster is removed on a best-effort basis.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, PortalError> {
    state.catalog.delete_event(EventId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Gallery ─────────────────────────────────────────────────────────────

/// `POST /admin/gallery` — Upload a gallery image.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] when the image is missing or the
/// year is not four digits.
#[utoipa::path(
    post,
    path = "/api/v1/admin/gallery",
    tag = "Admin",
    summary = "Upload gallery image",
    description = "Multipart form with optional caption fields and a required `image` file part.",
    request_body(content = GalleryForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image added", body = GalleryImageView),
        (status = 400, description = "Missing image or bad year", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_gallery_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PortalError> {
    let (form, image) = MultipartBody::read(multipart, IMAGE_PART)
        .await?
        .into_parts::<GalleryForm>()?;
    let image = state
        .catalog
        .create_gallery_image(form.into(), image)
        .await?;
    Ok((StatusCode::CREATED, Json(GalleryImageView::from(&image))))
}

/// `DELETE /admin/gallery/{id}` — Delete a gallery image.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if the image does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/gallery/{id}",
    tag = "Admin",
    summary = "Delete gallery image",
    description = "Deletes the gallery row and, best effort, the stored file.",
    params(
        ("id" = uuid::Uuid, Path, description = "Gallery image UUID"),
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, PortalError> {
    state
        .catalog
        .delete_gallery_image(GalleryImageId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Sponsors ────────────────────────────────────────────────────────────

/// `POST /admin/sponsors` — Create a sponsor.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] for a missing name or unknown tier.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sponsors",
    tag = "Admin",
    summary = "Create sponsor",
    description = "Multipart form with the sponsor fields and an optional `logo` file part. The tier defaults to bronze.",
    request_body(content = SponsorForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Sponsor created", body = SponsorView),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_sponsor(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PortalError> {
    let (form, logo) = MultipartBody::read(multipart, LOGO_PART)
        .await?
        .into_parts::<SponsorForm>()?;
    let sponsor = state.catalog.create_sponsor(form.into(), logo).await?;
    Ok((StatusCode::CREATED, Json(SponsorView::from(&sponsor))))
}

/// `PATCH /admin/sponsors/{id}` — Update a sponsor.
///
/// # Errors
///
/// - [`PortalError::Validation`] for an invalid present field.
/// - [`PortalError::NotFound`] if the sponsor does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/sponsors/{id}",
    tag = "Admin",
    summary = "Update sponsor",
    description = "Multipart form with the fields to change and an optional replacement `logo`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Sponsor UUID"),
    ),
    request_body(content = SponsorForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Sponsor updated", body = SponsorView),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Sponsor not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_sponsor(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, PortalError> {
    let (form, logo) = MultipartBody::read(multipart, LOGO_PART)
        .await?
        .into_parts::<SponsorForm>()?;
    let sponsor = state
        .catalog
        .update_sponsor(SponsorId::from_uuid(id), form.into(), logo)
        .await?;
    Ok(Json(SponsorView::from(&sponsor)))
}

/// `DELETE /admin/sponsors/{id}` — Delete a sponsor and its logo.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if the sponsor does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/sponsors/{id}",
    tag = "Admin",
    summary = "Delete sponsor",
    description = "Deletes the sponsor and, best effort, its stored logo.",
    params(
        ("id" = uuid::Uuid, Path, description = "Sponsor UUID"),
    ),
    responses(
        (status = 204, description = "Sponsor deleted"),
        (status = 404, description = "Sponsor not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_sponsor(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, PortalError> {
    state
        .catalog
        .delete_sponsor(SponsorId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Registrations ───────────────────────────────────────────────────────

/// Fetches all registrations and applies the search box and status dropdown.
async fn filtered_registrations(
    state: &AppState,
    params: &RegistrationListParams,
) -> Result<Vec<Registration>, PortalError> {
    let status: StatusFilter = params
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|msg: String| PortalError::field("status", msg))?;
    let search = Search::new(params.search.as_deref().unwrap_or_default());
    let all = state.catalog.list_registrations().await?;
    Ok(filter_registrations(&all, &search, status)
        .into_iter()
        .cloned()
        .collect())
}

/// `GET /admin/registrations` — Filtered registration list.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] for an unknown status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/registrations",
    tag = "Admin",
    summary = "List registrations",
    description = "Registrations newest first. `search` matches name, email, phone and college; `status` narrows to one payment status.",
    params(RegistrationListParams),
    responses(
        (status = 200, description = "Matching registrations", body = RegistrationListResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_registrations(
    State(state): State<AppState>,
    Query(params): Query<RegistrationListParams>,
) -> Result<impl IntoResponse, PortalError> {
    let registrations = filtered_registrations(&state, &params).await?;
    Ok(Json(RegistrationListResponse {
        total: registrations.len(),
        data: registrations.iter().map(RegistrationView::from).collect(),
    }))
}

/// `PATCH /admin/registrations/{id}/status` — Set the payment status.
///
/// # Errors
///
/// - [`PortalError::Validation`] for an unknown status.
/// - [`PortalError::NotFound`] if the registration does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/registrations/{id}/status",
    tag = "Admin",
    summary = "Update payment status",
    description = "Overwrites the payment status; any transition is allowed. The response carries the patched row.",
    params(
        ("id" = uuid::Uuid, Path, description = "Registration UUID"),
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = RegistrationView),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Registration not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_registration_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let status: PaymentStatus = req
        .payment_status
        .parse()
        .map_err(|msg: String| PortalError::field("payment_status", msg))?;
    let registration = state
        .catalog
        .update_registration_status(RegistrationId::from_uuid(id), status)
        .await?;
    Ok(Json(RegistrationView::from(&registration)))
}

/// `GET /admin/registrations/export` — CSV of the filtered list.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] for an unknown status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/registrations/export",
    tag = "Admin",
    summary = "Export registrations as CSV",
    description = "Downloads the registrations matching the same filters as the list, one CSV row each.",
    params(RegistrationListParams),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown status", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn export_registrations(
    State(state): State<AppState>,
    Query(params): Query<RegistrationListParams>,
) -> Result<impl IntoResponse, PortalError> {
    let registrations = filtered_registrations(&state, &params).await?;
    let csv = registrations_csv(&registrations);
    let today = Utc::now().with_timezone(&festival_offset()).date_naive();
    let disposition = format!("attachment; filename=\"{}\"", export_filename(today));
    tracing::info!(rows = registrations.len(), "registrations exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// Admin routes, gated by [`require_admin`].
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/events", post(create_event))
        .route(
            "/admin/events/{id}",
            patch(update_event).delete(delete_event),
        )
        .route("/admin/gallery", post(create_gallery_image))
        .route("/admin/gallery/{id}", delete(delete_gallery_image))
        .route("/admin/sponsors", post(create_sponsor))
        .route(
            "/admin/sponsors/{id}",
            patch(update_sponsor).delete(delete_sponsor),
        )
        .route("/admin/registrations", get(list_registrations))
        .route("/admin/registrations/export", get(export_registrations))
        .route(
            "/admin/registrations/{id}/status",
            patch(update_registration_status),
        )
        .route_layer(from_fn_with_state(state, require_admin))
}
