//! System endpoints: health check, site configuration, stored objects.

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{EventCategory, EventDay};
use crate::error::{ErrorResponse, PortalError};
use crate::objects::content_type_for;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One page of the browser front end.
#[derive(Debug, Serialize, ToSchema)]
pub struct PageInfo {
    path: &'static str,
    title: &'static str,
    admin: bool,
}

const PAGES: [PageInfo; 12] = [
    PageInfo {
        path: "/",
        title: "Home",
        admin: false,
    },
    PageInfo {
        path: "/events",
        title: "Events",
        admin: false,
    },
    PageInfo {
        path: "/gallery",
        title: "Gallery",
        admin: false,
    },
    PageInfo {
        path: "/sponsors",
        title: "Sponsors",
        admin: false,
    },
    PageInfo {
        path: "/about",
        title: "About",
        admin: false,
    },
    PageInfo {
        path: "/register",
        title: "Register",
        admin: false,
    },
    PageInfo {
        path: "/login",
        title: "Login",
        admin: false,
    },
    PageInfo {
        path: "/signup",
        title: "Sign Up",
        admin: false,
    },
    PageInfo {
        path: "/admin",
        title: "Dashboard",
        admin: true,
    },
    PageInfo {
        path: "/admin/events",
        title: "Manage Events",
        admin: true,
    },
    PageInfo {
        path: "/admin/gallery",
        title: "Manage Gallery",
        admin: true,
    },
    PageInfo {
        path: "/admin/registrations",
        title: "Registrations",
        admin: true,
    },
];

/// `GET /config/pages` — Front-end page table.
#[utoipa::path(
    get,
    path = "/config/pages",
    tag = "System",
    summary = "List site pages",
    description = "Returns every front-end page with a flag marking the admin pages that require the session gate.",
    responses(
        (status = 200, description = "Page table", body = Vec<PageInfo>),
    )
)]
pub async fn pages_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(PAGES))
}

/// One festival day.
#[derive(Debug, Serialize, ToSchema)]
pub struct FestivalDay {
    day: &'static str,
    date: Option<String>,
}

/// Festival schedule and event categories.
#[derive(Debug, Serialize, ToSchema)]
pub struct FestivalInfo {
    time_zone: String,
    days: Vec<FestivalDay>,
    categories: Vec<&'static str>,
}

/// `GET /config/festival` — Day buckets and categories.
#[utoipa::path(
    get,
    path = "/config/festival",
    tag = "System",
    summary = "Festival schedule",
    description = "Returns the festival time zone, the calendar date of each day tab, and the event categories in matching priority order.",
    responses(
        (status = 200, description = "Festival schedule", body = FestivalInfo),
    )
)]
pub async fn festival_handler() -> impl IntoResponse {
    let info = FestivalInfo {
        time_zone: crate::domain::classifier::festival_offset().to_string(),
        days: EventDay::ALL
            .into_iter()
            .map(|day| FestivalDay {
                day: day.as_str(),
                date: day.calendar_date().map(|d| d.to_string()),
            })
            .collect(),
        categories: EventCategory::ALL
            .into_iter()
            .map(EventCategory::as_str)
            .collect(),
    };
    (StatusCode::OK, Json(info))
}

/// `GET /storage/{bucket}/{*path}` — Public object retrieval.
///
/// # Errors
///
/// Returns [`PortalError::NotFound`] if no such object is stored.
#[utoipa::path(
    get,
    path = "/storage/{bucket}/{path}",
    tag = "System",
    summary = "Fetch stored image",
    description = "Serves an uploaded image by the public URL the catalog stored for it.",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("path" = String, Path, description = "Object path inside the bucket"),
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Object not found", body = ErrorResponse),
    )
)]
pub async fn storage_handler(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<impl IntoResponse, PortalError> {
    let bytes = state.objects.read(&bucket, &path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        bytes,
    ))
}

/// Fallback for unmatched paths.
pub async fn not_found_handler() -> PortalError {
    PortalError::NotFound("route".to_string())
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/pages", get(pages_handler))
        .route("/config/festival", get(festival_handler))
        .route("/storage/{bucket}/{*path}", get(storage_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_pages_are_flagged() {
        let admin: Vec<&str> = PAGES
            .iter()
            .filter(|page| page.admin)
            .map(|page| page.path)
            .collect();
        assert!(admin.iter().all(|path| path.starts_with("/admin")));
        assert_eq!(admin.len(), 4);
    }
}
