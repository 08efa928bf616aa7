//! Process-wide view of which tokens are signed in, and whether they
//! belong to admins.
//!
//! The context is written only by [`SessionContext::spawn_listener`],
//! which follows the identity provider's change stream. Readers that hit
//! a token still in [`AuthState::Loading`] wait on a [`Notify`] until the
//! listener settles it or their timeout runs out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::Profile;
use crate::identity::{IdentityUser, Session, SessionChange};
use crate::store::{CatalogStore, Query, Table, decode};

/// Authentication state of one bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Signed in; the admin flag is still being looked up.
    Loading,
    /// No live session.
    SignedOut,
    /// Signed in with a resolved admin flag.
    SignedIn {
        /// The account.
        user: IdentityUser,
        /// Whether the profile grants admin access.
        is_admin: bool,
    },
}

/// Token → [`AuthState`] map fed by session changes.
#[derive(Debug, Default)]
pub struct SessionContext {
    states: RwLock<HashMap<String, AuthState>>,
    changed: Notify,
}

impl SessionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `token`, `None` when no change mentioned it yet or
    /// its session has ended.
    pub async fn state(&self, token: &str) -> Option<AuthState> {
        self.states.read().await.get(token).cloned()
    }

    /// Waits up to `timeout` for `token` to leave [`AuthState::Loading`].
    ///
    /// Unknown tokens are treated as loading: the change announcing them
    /// may not have been processed yet.
    pub async fn resolve(&self, token: &str, timeout: Duration) -> AuthState {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.state(token).await {
                Some(AuthState::Loading) | None => {}
                Some(settled) => return settled,
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return AuthState::Loading;
            }
        }
    }

    /// Starts the background task that applies every change from `changes`.
    ///
    /// The task ends when the provider drops its sender.
    #[must_use]
    pub fn spawn_listener(
        self: Arc<Self>,
        mut changes: broadcast::Receiver<SessionChange>,
        store: Arc<dyn CatalogStore>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => self.apply(change, store.as_ref()).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("session listener stopped");
        })
    }

    async fn apply(&self, change: SessionChange, store: &dyn CatalogStore) {
        match change {
            SessionChange::SignedIn { session } => self.sign_in(session, store).await,
            SessionChange::SignedOut { token } => self.forget(&token).await,
            SessionChange::TokenRefreshed {
                previous_token,
                session,
            } => {
                self.forget(&previous_token).await;
                self.sign_in(session, store).await;
            }
        }
    }

    async fn sign_in(&self, session: Session, store: &dyn CatalogStore) {
        let token = session.access_token;
        self.set(token.clone(), AuthState::Loading).await;
        let is_admin = lookup_admin(&session.user, store).await;
        self.set(
            token,
            AuthState::SignedIn {
                user: session.user,
                is_admin,
            },
        )
        .await;
    }

    async fn set(&self, token: String, state: AuthState) {
        self.states.write().await.insert(token, state);
        self.changed.notify_waiters();
    }

    /// Drops an ended token. The provider no longer knows it either, so
    /// callers that check the provider first never reach [`Self::resolve`].
    async fn forget(&self, token: &str) {
        self.states.write().await.remove(token);
        self.changed.notify_waiters();
    }

    /// Number of tokens currently tracked.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    /// `true` when no token is tracked.
    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

/// Reads the profile's admin flag. Any failure counts as "not admin".
async fn lookup_admin(user: &IdentityUser, store: &dyn CatalogStore) -> bool {
    let query = Query::all().eq("id", user.id.to_string()).limit(1);
    match store.select(Table::Profiles, &query).await {
        Ok(rows) => rows
            .into_iter()
            .next()
            .and_then(|row| decode::<Profile>(row).ok())
            .is_some_and(|profile| profile.is_admin),
        Err(err) => {
            tracing::warn!(user_id = %user.id, error = %err, "profile lookup failed");
            false
        }
    }
}
