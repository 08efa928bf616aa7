//! Public event handlers: filtered list and single event.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EventListParams, EventListResponse, EventView};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::domain::filter::{EventTab, Search, filter_events};
use crate::error::{ErrorResponse, PortalError};

/// `GET /events` — Events filtered by search text and tab.
///
/// # Errors
///
/// Returns [`PortalError::InvalidRequest`] for an unknown tab.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns events ordered by date. `search` matches title and description case-insensitively; `tab` narrows to a festival day or a category.",
    params(EventListParams),
    responses(
        (status = 200, description = "Matching events", body = EventListResponse),
        (status = 400, description = "Unknown tab", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<impl IntoResponse, PortalError> {
    let tab: EventTab = params
        .tab
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(PortalError::InvalidRequest)?;
    let search = Search::new(params.search.as_deref().unwrap_or_default());

    let events = state.catalog.list_events().await?;
    let data: Vec<EventView> = filter_events(&events, &search, tab)
        .into_iter()
        .map(EventView::from)
        .collect();

    Ok(Json(EventListResponse {
        total: data.len(),
        data,
    }))
}

/// `GET /events/{id}` — One event.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event",
    description = "Returns a single event with its price label, day bucket and category.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventView),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, PortalError> {
    let event = state.catalog.get_event(EventId::from_uuid(id)).await?;
    Ok(Json(EventView::from(&event)))
}

/// Public event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
}
