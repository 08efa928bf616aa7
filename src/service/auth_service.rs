//! Auth service: identity provider calls paired with profile rows.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::{Profile, UserId};
use crate::error::PortalError;
use crate::identity::{IdentityError, IdentityProvider, Session};
use crate::store::{CatalogStore, Query, Row, Table, decode, encode};

/// Sign-up, admin login and session lookups.
///
/// A profile row is created for every account; admin access is granted
/// only through the profile's `is_admin` flag.
#[derive(Debug, Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn CatalogStore>,
}

impl AuthService {
    /// Creates a service over the given provider and catalog store.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn CatalogStore>) -> Self {
        Self { provider, store }
    }

    /// The underlying identity provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Creates an account and its (non-admin) profile.
    ///
    /// An account left without a profile by an earlier failed sign-up is
    /// completed when the same credentials are sent again.
    ///
    /// # Errors
    ///
    /// - [`PortalError::InvalidRequest`] for a taken email, a malformed email or a short password.
    /// - [`PortalError::Store`] when the profile cannot be written; the new
    ///   session is ended again.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Profile), PortalError> {
        let session = match self.provider.sign_up(email, password).await {
            Ok(session) => session,
            Err(IdentityError::AlreadyRegistered(taken)) => self
                .resume_sign_up(email, password)
                .await?
                .ok_or(IdentityError::AlreadyRegistered(taken))?,
            Err(err) => return Err(err.into()),
        };
        let profile = Profile {
            id: session.user.id,
            email: session.user.email.clone(),
            is_admin: false,
            created_at: Utc::now(),
        };
        if let Err(err) = self.store.insert(Table::Profiles, encode(&profile)?).await {
            tracing::warn!(user_id = %profile.id, error = %err, "profile not written");
            self.provider.sign_out(&session.access_token).await?;
            return Err(err.into());
        }
        tracing::info!(user_id = %profile.id, "profile created");
        Ok((session, profile))
    }

    /// Signs in an account that has no profile yet. `None` when the
    /// password does not match or the profile already exists.
    async fn resume_sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Session>, PortalError> {
        let session = match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(IdentityError::InvalidCredentials) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if self.profile(session.user.id).await?.is_some() {
            self.provider.sign_out(&session.access_token).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Signs in an admin.
    ///
    /// Accounts without an admin profile are signed straight back out.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Auth`] for wrong credentials.
    /// - [`PortalError::Forbidden`] when the account is not an admin.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Session, Profile), PortalError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        match self.profile(session.user.id).await? {
            Some(profile) if profile.is_admin => {
                tracing::info!(user_id = %profile.id, "admin signed in");
                Ok((session, profile))
            }
            _ => {
                tracing::warn!(user_id = %session.user.id, "non-admin login refused");
                self.provider.sign_out(&session.access_token).await?;
                Err(PortalError::Forbidden)
            }
        }
    }

    /// Ends the session behind `token`. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Auth`] when the provider fails.
    pub async fn logout(&self, token: &str) -> Result<(), PortalError> {
        Ok(self.provider.sign_out(token).await?)
    }

    /// Live session for `token`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Auth`] when the provider fails.
    pub async fn session(&self, token: &str) -> Result<Option<Session>, PortalError> {
        Ok(self.provider.get_session(token).await?)
    }

    /// Profile of `user_id`, if one was created.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Store`] when the lookup fails.
    pub async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, PortalError> {
        let query = Query::all().eq("id", user_id.to_string()).limit(1);
        let rows = self.store.select(Table::Profiles, &query).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(decode(row)?)),
            None => Ok(None),
        }
    }

    /// Makes sure `email` exists with admin access, creating the account
    /// when needed. Used to seed the first back-office user.
    ///
    /// # Errors
    ///
    /// - [`PortalError::Auth`] when the account exists with another password.
    /// - [`PortalError::InvalidRequest`] for a malformed email or short password.
    /// - [`PortalError::Store`] when the profile cannot be written.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Profile, PortalError> {
        let session = match self.provider.sign_up(email, password).await {
            Ok(session) => session,
            Err(IdentityError::AlreadyRegistered(_)) => {
                self.provider.sign_in_with_password(email, password).await?
            }
            Err(err) => return Err(err.into()),
        };

        let user = session.user.clone();
        let profile = match self.profile(user.id).await? {
            Some(existing) if existing.is_admin => existing,
            Some(_) => {
                let mut patch = Row::new();
                patch.insert("is_admin".into(), Value::Bool(true));
                decode(
                    self.store
                        .update(Table::Profiles, *user.id.as_uuid(), patch)
                        .await?,
                )?
            }
            None => {
                let profile = Profile {
                    id: user.id,
                    email: user.email,
                    is_admin: true,
                    created_at: Utc::now(),
                };
                decode(self.store.insert(Table::Profiles, encode(&profile)?).await?)?
            }
        };
        self.provider.sign_out(&session.access_token).await?;
        tracing::info!(user_id = %profile.id, email = %profile.email, "admin account ready");
        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::identity::{LocalIdentityProvider, SessionBus};
    use crate::store::{MemoryStore, StoreError};

    fn service_over(store: Arc<dyn CatalogStore>) -> AuthService {
        AuthService::new(
            Arc::new(LocalIdentityProvider::new(
                3_600,
                SessionBus::new(16),
                Arc::clone(&store),
            )),
            store,
        )
    }

    fn service() -> AuthService {
        service_over(Arc::new(MemoryStore::new()))
    }

    /// Memory store whose profile inserts fail while `fail` is set.
    #[derive(Debug, Default)]
    struct FlakyProfiles {
        inner: MemoryStore,
        fail: AtomicBool,
    }

    #[async_trait::async_trait]
    impl CatalogStore for FlakyProfiles {
        async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
            if table == Table::Profiles && self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.insert(table, row).await
        }

        async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
            self.inner.update(table, id, patch).await
        }

        async fn delete(&self, table: Table, id: Uuid) -> Result<u64, StoreError> {
            self.inner.delete(table, id).await
        }

        async fn count(&self, table: Table) -> Result<u64, StoreError> {
            self.inner.count(table).await
        }
    }

    #[tokio::test]
    async fn failed_profile_write_can_be_retried() {
        let store = Arc::new(FlakyProfiles::default());
        store.fail.store(true, Ordering::SeqCst);
        let auth = service_over(Arc::clone(&store) as Arc<dyn CatalogStore>);

        let Err(PortalError::Store(_)) = auth.sign_up("late@example.com", "secret1").await else {
            panic!("profile write should fail");
        };

        store.fail.store(false, Ordering::SeqCst);
        assert!(matches!(
            auth.sign_up("late@example.com", "wrong-pass").await,
            Err(PortalError::InvalidRequest(_))
        ));
        let Ok((session, profile)) = auth.sign_up("late@example.com", "secret1").await else {
            panic!("retry failed");
        };
        assert_eq!(profile.id, session.user.id);
        assert!(!profile.is_admin);

        assert!(matches!(
            auth.sign_up("late@example.com", "secret1").await,
            Err(PortalError::InvalidRequest(_))
        ));
        let Ok(profiles) = store.count(Table::Profiles).await else {
            panic!("count failed");
        };
        assert_eq!(profiles, 1);
    }

    #[tokio::test]
    async fn admin_seed_survives_restart() {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let Ok(first) = service_over(Arc::clone(&store))
            .ensure_admin("root@example.com", "secret1")
            .await
        else {
            panic!("seed failed");
        };
        let Ok(second) = service_over(Arc::clone(&store))
            .ensure_admin("root@example.com", "secret1")
            .await
        else {
            panic!("reseed failed");
        };
        assert_eq!(first.id, second.id);
        let Ok(profiles) = store.count(Table::Profiles).await else {
            panic!("count failed");
        };
        assert_eq!(profiles, 1);
    }

    #[tokio::test]
    async fn sign_up_creates_plain_profile() {
        let auth = service();
        let Ok((session, profile)) = auth.sign_up("fan@example.com", "secret1").await else {
            panic!("sign-up failed");
        };
        assert!(!profile.is_admin);
        let Ok(Some(stored)) = auth.profile(session.user.id).await else {
            panic!("profile missing");
        };
        assert_eq!(stored.email, "fan@example.com");
    }

    #[tokio::test]
    async fn non_admin_login_is_forbidden_and_signed_out() {
        let auth = service();
        let Ok(_) = auth.sign_up("fan@example.com", "secret1").await else {
            panic!("sign-up failed");
        };
        let result = auth.login("fan@example.com", "secret1").await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }

    #[tokio::test]
    async fn wrong_password_is_auth_error() {
        let auth = service();
        let result = auth.login("nobody@example.com", "secret1").await;
        assert!(matches!(result, Err(PortalError::Auth(_))));
    }

    #[tokio::test]
    async fn ensure_admin_creates_and_promotes() {
        let auth = service();
        let Ok(_) = auth.sign_up("staff@example.com", "secret1").await else {
            panic!("sign-up failed");
        };
        let Ok(profile) = auth.ensure_admin("staff@example.com", "secret1").await else {
            panic!("promotion failed");
        };
        assert!(profile.is_admin);

        let Ok((session, _)) = auth.login("staff@example.com", "secret1").await else {
            panic!("admin login failed");
        };
        let Ok(found) = auth.session(&session.access_token).await else {
            panic!("lookup failed");
        };
        assert!(found.is_some());

        let Ok(()) = auth.logout(&session.access_token).await else {
            panic!("logout failed");
        };
        let Ok(gone) = auth.session(&session.access_token).await else {
            panic!("lookup failed");
        };
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let auth = service();
        for _ in 0..2 {
            let Ok(profile) = auth.ensure_admin("root@example.com", "secret1").await else {
                panic!("seed failed");
            };
            assert!(profile.is_admin);
        }
    }
}
