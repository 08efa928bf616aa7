//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::auth::SessionContext;
use crate::identity::IdentityProvider;
use crate::objects::ObjectStore;
use crate::service::{AuthService, CatalogService};
use crate::store::CatalogStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catalog reads and admin mutations.
    pub catalog: Arc<CatalogService>,
    /// Sign-in, sign-up and session lookups.
    pub auth: Arc<AuthService>,
    /// Token → auth state, fed by the identity provider's change stream.
    pub sessions: Arc<SessionContext>,
    /// Uploaded images, served back by the storage route.
    pub objects: Arc<dyn ObjectStore>,
    /// How long the admin gate waits for a loading session.
    pub session_resolve_timeout: Duration,
}

impl AppState {
    /// Wires the services over the three external collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        objects: Arc<dyn ObjectStore>,
        provider: Arc<dyn IdentityProvider>,
        session_resolve_timeout: Duration,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(
                Arc::clone(&store),
                Arc::clone(&objects),
            )),
            auth: Arc::new(AuthService::new(provider, store)),
            sessions: Arc::new(SessionContext::new()),
            objects,
            session_resolve_timeout,
        }
    }

    /// Starts feeding [`AppState::sessions`] from the identity provider.
    ///
    /// Call once, before serving requests.
    #[must_use]
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let changes = self.auth.provider().subscribe();
        Arc::clone(&self.sessions).spawn_listener(changes, Arc::clone(self.catalog.store()))
    }
}
