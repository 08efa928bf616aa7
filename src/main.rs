//! manfete-portal server entry point.
//!
//! Starts the Axum HTTP server with the public and admin REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use manfete_portal::api;
use manfete_portal::app_state::AppState;
use manfete_portal::config::PortalConfig;
use manfete_portal::identity::{IdentityProvider, LocalIdentityProvider, SessionBus};
use manfete_portal::objects::{LocalObjectStore, ObjectStore};
use manfete_portal::store::{CatalogStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = PortalConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting manfete-portal");

    // External collaborators
    let store: Arc<dyn CatalogStore> = if config.persistence_enabled {
        Arc::new(PostgresStore::connect(&config).await?)
    } else {
        tracing::warn!("persistence disabled, catalog is kept in memory");
        Arc::new(MemoryStore::new())
    };
    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        config.storage_root.clone(),
        config.public_base_url.clone(),
    ));
    let provider: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
        config.session_ttl_secs,
        SessionBus::new(config.session_event_capacity),
        Arc::clone(&store),
    ));

    // Build application state
    let app_state = AppState::new(
        store,
        objects,
        provider,
        Duration::from_millis(config.session_resolve_timeout_ms),
    );
    let _session_listener = app_state.spawn_session_listener();

    // Seed the back-office account
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        app_state.auth.ensure_admin(email, password).await?;
    }

    // Build router
    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
