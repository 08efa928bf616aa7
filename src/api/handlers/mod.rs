//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod auth;
pub mod events;
pub mod gallery;
pub mod registrations;
pub mod sponsors;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`. The admin routes carry
/// the session gate, so `state` is needed to build its layer.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(gallery::routes())
        .merge(sponsors::routes())
        .merge(registrations::routes())
        .merge(auth::routes())
        .merge(admin::routes(state))
}
