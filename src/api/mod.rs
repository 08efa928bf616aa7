//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health, site
//! configuration and stored objects live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod upload;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::PortalConfig;

/// Builds the API router with all REST endpoints.
pub fn build_router(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes(state))
        .merge(handlers::system::routes())
        .fallback(handlers::system::not_found_handler);

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

/// Builds the complete application: routes, middleware stack and state.
pub fn build_app(state: AppState, config: &PortalConfig) -> Router {
    build_router(state.clone())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
