//! Service layer: business logic orchestration.
//!
//! [`CatalogService`] coordinates the catalog and object stores for the
//! public pages and the admin back office; [`AuthService`] pairs the
//! identity provider with profile rows.

pub mod auth_service;
pub mod catalog_service;

pub use auth_service::AuthService;
pub use catalog_service::{CatalogService, Confirmation, DashboardStats};
