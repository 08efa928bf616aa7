//! # manfete-portal
//!
//! Catalog, registration and admin back-office API for the Manfete
//! cultural festival.
//!
//! The browser front end renders the pages; this crate owns the data
//! flow behind them: the event catalog, the registration workflow, and
//! the admin CRUD, list filters and CSV export behind a session gate.
//!
//! ## Architecture
//!
//! ```text
//! Browser front end
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Session Gate (auth/)
//!     │
//!     ├── CatalogService, AuthService (service/)
//!     ├── Classifier, filters, workflow, CSV (domain/)
//!     │
//!     ├── CatalogStore (store/): memory or PostgreSQL
//!     ├── IdentityProvider (identity/)
//!     └── ObjectStore (objects/): local files or memory
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod objects;
pub mod service;
pub mod store;
