//! Data Transfer Objects for REST request/response serialization.
//!
//! Ids are plain UUIDs and prices plain numbers; derived labels (price,
//! tier, day, category) are computed here so every client shows the same
//! text.

pub mod admin_dto;
pub mod auth_dto;
pub mod catalog_dto;
pub mod registration_dto;

pub use admin_dto::*;
pub use auth_dto::*;
pub use catalog_dto::*;
pub use registration_dto::*;
