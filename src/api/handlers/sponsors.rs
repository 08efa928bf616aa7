//! Public sponsor handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{SponsorListResponse, SponsorView};
use crate::app_state::AppState;
use crate::domain::sponsor::sort_for_display;
use crate::error::PortalError;

/// `GET /sponsors` — Sponsors in display order.
///
/// # Errors
///
/// Returns [`PortalError::Store`] when the catalog cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/sponsors",
    tag = "Sponsors",
    summary = "List sponsors",
    description = "Returns sponsors ordered platinum, gold, silver, bronze, then untiered, each tier by name.",
    responses(
        (status = 200, description = "Sponsors", body = SponsorListResponse),
    )
)]
pub async fn list_sponsors(State(state): State<AppState>) -> Result<impl IntoResponse, PortalError> {
    let mut sponsors = state.catalog.list_sponsors().await?;
    sort_for_display(&mut sponsors);
    Ok(Json(SponsorListResponse {
        data: sponsors.iter().map(SponsorView::from).collect(),
    }))
}

/// Public sponsor routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sponsors", get(list_sponsors))
}
