//! Public gallery handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    GalleryImageView, GalleryParams, GalleryResponse, GalleryYearGroup, YearsResponse,
};
use crate::app_state::AppState;
use crate::domain::GalleryImage;
use crate::domain::filter::{YearTab, filter_gallery};
use crate::domain::gallery::{group_by_year, years_desc};
use crate::error::PortalError;

/// `GET /gallery` — Images grouped by year.
///
/// # Errors
///
/// Returns [`PortalError::Store`] when the catalog cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/gallery",
    tag = "Gallery",
    summary = "List gallery images",
    description = "Returns every year that has images plus the images under the selected year tab, grouped by year with the most recent year first.",
    params(GalleryParams),
    responses(
        (status = 200, description = "Gallery images", body = GalleryResponse),
    )
)]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> Result<impl IntoResponse, PortalError> {
    let images = state.catalog.list_gallery().await?;
    let tab = YearTab::parse(params.year.as_deref());
    let shown: Vec<GalleryImage> = filter_gallery(&images, &tab)
        .into_iter()
        .cloned()
        .collect();

    let groups = group_by_year(&shown)
        .into_iter()
        .map(|(year, members)| GalleryYearGroup {
            year,
            images: members.into_iter().map(GalleryImageView::from).collect(),
        })
        .collect();

    Ok(Json(GalleryResponse {
        years: years_desc(&images),
        groups,
        total: shown.len(),
    }))
}

/// `GET /gallery/years` — Distinct years, most recent first.
///
/// # Errors
///
/// Returns [`PortalError::Store`] when the catalog cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/gallery/years",
    tag = "Gallery",
    summary = "List gallery years",
    description = "Returns the distinct years present in the gallery, most recent first.",
    responses(
        (status = 200, description = "Gallery years", body = YearsResponse),
    )
)]
pub async fn list_years(State(state): State<AppState>) -> Result<impl IntoResponse, PortalError> {
    let years = state.catalog.list_gallery_years().await?;
    Ok(Json(YearsResponse { years }))
}

/// Public gallery routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gallery", get(list_gallery))
        .route("/gallery/years", get(list_years))
}
