//! Identity provider with salted SHA3-256 password hashes and expiring
//! bearer tokens.
//!
//! Accounts are rows of [`Table::Accounts`] in the catalog store, so they
//! live exactly as long as the profiles that reference them. Sessions are
//! process-local.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tokio::sync::{Mutex, RwLock, broadcast};

use super::{
    IdentityError, IdentityProvider, IdentityUser, MIN_PASSWORD_LEN, Session, SessionBus,
    SessionChange,
};
use crate::domain::UserId;
use crate::domain::registration::is_valid_email;
use crate::store::{CatalogStore, Query, Table, decode, encode};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: UserId,
    email: String,
    salt: String,
    password_hash: String,
}

impl Account {
    fn user(&self) -> IdentityUser {
        IdentityUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Accounts in the catalog store, sessions in memory.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    accounts: Arc<dyn CatalogStore>,
    sign_ups: Mutex<()>,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    bus: SessionBus,
}

impl LocalIdentityProvider {
    /// Creates a provider keeping accounts in `accounts` and issuing
    /// sessions that live `ttl_secs` seconds.
    #[must_use]
    pub fn new(ttl_secs: u64, bus: SessionBus, accounts: Arc<dyn CatalogStore>) -> Self {
        let ttl = Duration::try_seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
            .unwrap_or_else(|| Duration::days(365));
        Self {
            accounts,
            sign_ups: Mutex::new(()),
            sessions: RwLock::new(HashMap::new()),
            ttl,
            bus,
        }
    }

    async fn find_account(&self, email: &str) -> Result<Option<Account>, IdentityError> {
        let query = Query::all().eq("email", email).limit(1);
        let rows = self.accounts.select(Table::Accounts, &query).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(decode(row)?)),
            None => Ok(None),
        }
    }

    /// Stores a fresh session for `user`, sweeping expired ones first.
    async fn issue(&self, user: IdentityUser) -> Session {
        let now = Utc::now();
        let session = Session {
            access_token: uuid::Uuid::new_v4().simple().to_string(),
            user,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let expired: Vec<String> = {
            let mut sessions = self.sessions.write().await;
            let expired = sessions
                .iter()
                .filter(|(_, s)| s.is_expired(now))
                .map(|(token, _)| token.clone())
                .collect::<Vec<_>>();
            for token in &expired {
                sessions.remove(token);
            }
            sessions.insert(session.access_token.clone(), session.clone());
            expired
        };
        for token in expired {
            self.bus.publish(SessionChange::SignedOut { token });
        }
        session
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:X}", hasher.finalize())
}

#[async_trait::async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(IdentityError::InvalidEmail(email));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }

        let user = {
            let _guard = self.sign_ups.lock().await;
            if self.find_account(&email).await?.is_some() {
                return Err(IdentityError::AlreadyRegistered(email));
            }
            let salt = uuid::Uuid::new_v4().simple().to_string();
            let account = Account {
                id: UserId::new(),
                password_hash: hash_password(&salt, password),
                email,
                salt,
            };
            self.accounts
                .insert(Table::Accounts, encode(&account)?)
                .await?;
            account.user()
        };
        tracing::info!(user_id = %user.id, "account created");

        let session = self.issue(user).await;
        self.bus.publish(SessionChange::SignedIn {
            session: session.clone(),
        });
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let account = self
            .find_account(&normalize_email(email))
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        if hash_password(&account.salt, password) != account.password_hash {
            return Err(IdentityError::InvalidCredentials);
        }

        let session = self.issue(account.user()).await;
        self.bus.publish(SessionChange::SignedIn {
            session: session.clone(),
        });
        Ok(session)
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, IdentityError> {
        let found = self.sessions.read().await.get(token).cloned();
        match found {
            Some(session) if session.is_expired(Utc::now()) => {
                self.sessions.write().await.remove(token);
                self.bus.publish(SessionChange::SignedOut {
                    token: token.to_string(),
                });
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn refresh(&self, token: &str) -> Result<Session, IdentityError> {
        let previous = self
            .get_session(token)
            .await?
            .ok_or(IdentityError::SessionNotFound)?;
        self.sessions.write().await.remove(token);

        let session = self.issue(previous.user).await;
        self.bus.publish(SessionChange::TokenRefreshed {
            previous_token: token.to_string(),
            session: session.clone(),
        });
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        if self.sessions.write().await.remove(token).is_some() {
            self.bus.publish(SessionChange::SignedOut {
                token: token.to_string(),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    use crate::store::MemoryStore;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(3_600, SessionBus::new(16), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn hash_is_salted_uppercase_hex() {
        let a = hash_password("salt-a", "secret");
        let b = hash_password("salt-b", "secret");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let idp = provider();
        let Ok(first) = idp.sign_up("Admin@Example.com", "hunter22").await else {
            panic!("sign-up failed");
        };
        assert_eq!(first.user.email, "admin@example.com");

        let Ok(second) = idp.sign_in_with_password("admin@example.com", "hunter22").await else {
            panic!("sign-in failed");
        };
        assert_eq!(second.user.id, first.user.id);
        assert_ne!(second.access_token, first.access_token);

        assert!(matches!(
            idp.sign_in_with_password("admin@example.com", "wrong-pass").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn accounts_outlive_the_provider() {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let first = LocalIdentityProvider::new(3_600, SessionBus::new(4), Arc::clone(&store));
        let Ok(created) = first.sign_up("crew@example.com", "secret1").await else {
            panic!("sign-up failed");
        };
        drop(first);

        let restarted = LocalIdentityProvider::new(3_600, SessionBus::new(4), store);
        assert!(matches!(
            restarted.sign_up("crew@example.com", "secret1").await,
            Err(IdentityError::AlreadyRegistered(_))
        ));
        let Ok(again) = restarted
            .sign_in_with_password("crew@example.com", "secret1")
            .await
        else {
            panic!("sign-in after restart failed");
        };
        assert_eq!(again.user.id, created.user.id);
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicates_and_weak_passwords() {
        let idp = provider();
        assert!(matches!(
            idp.sign_up("a@b.co", "123").await,
            Err(IdentityError::WeakPassword)
        ));
        assert!(matches!(
            idp.sign_up("not-an-email", "123456").await,
            Err(IdentityError::InvalidEmail(_))
        ));
        let Ok(_) = idp.sign_up("a@b.co", "123456").await else {
            panic!("sign-up failed");
        };
        assert!(matches!(
            idp.sign_up("A@B.CO", "123456").await,
            Err(IdentityError::AlreadyRegistered(_))
        ));
    }

    #[tokio::test]
    async fn changes_are_published_in_order() {
        let idp = provider();
        let mut rx = idp.subscribe();
        let Ok(session) = idp.sign_up("a@b.co", "123456").await else {
            panic!("sign-up failed");
        };
        let Ok(refreshed) = idp.refresh(&session.access_token).await else {
            panic!("refresh failed");
        };
        let Ok(()) = idp.sign_out(&refreshed.access_token).await else {
            panic!("sign-out failed");
        };

        let mut kinds = Vec::new();
        for _ in 0..3 {
            let Ok(change) = rx.recv().await else {
                panic!("missing change");
            };
            kinds.push(change.kind());
        }
        assert_eq!(kinds, vec!["signed_in", "token_refreshed", "signed_out"]);

        let Ok(gone) = idp.get_session(&session.access_token).await else {
            panic!("lookup failed");
        };
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_swept_on_issue() {
        let idp = LocalIdentityProvider::new(0, SessionBus::new(64), Arc::new(MemoryStore::new()));
        let Ok(_) = idp.sign_up("a@b.co", "123456").await else {
            panic!("sign-up failed");
        };
        let mut rx = idp.subscribe();
        for _ in 0..10 {
            let Ok(_) = idp.sign_in_with_password("a@b.co", "123456").await else {
                panic!("sign-in failed");
            };
        }
        assert_eq!(idp.sessions.read().await.len(), 1);

        let mut signed_out = 0;
        while let Ok(change) = rx.try_recv() {
            if matches!(change, SessionChange::SignedOut { .. }) {
                signed_out += 1;
            }
        }
        assert_eq!(signed_out, 10);
    }

    #[tokio::test]
    async fn expired_sessions_vanish() {
        let idp = LocalIdentityProvider::new(0, SessionBus::new(4), Arc::new(MemoryStore::new()));
        let Ok(session) = idp.sign_up("a@b.co", "123456").await else {
            panic!("sign-up failed");
        };
        let Ok(found) = idp.get_session(&session.access_token).await else {
            panic!("lookup failed");
        };
        assert!(found.is_none());
    }
}
