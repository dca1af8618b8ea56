//! Authentication store
//!
//! Holds the logged-in session. Credentials are checked against the
//! `user_accounts` table; the session itself is mirrored into the Redis
//! session cache when one is configured.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn, error, debug};
use crate::database::AccountRepository;
use crate::models::account::{AccountStatus, Role, Session};
use crate::state::SessionCache;
use crate::utils::errors::{DashboardError, Result};
use crate::utils::logging::log_member_action;
use super::LoadingFlag;

#[derive(Clone)]
pub struct AuthStore {
    accounts: AccountRepository,
    cache: Option<SessionCache>,
    session: Arc<RwLock<Option<Session>>>,
    loading: LoadingFlag,
}

impl AuthStore {
    pub fn new(accounts: AccountRepository, cache: Option<SessionCache>) -> Self {
        Self {
            accounts,
            cache,
            session: Arc::new(RwLock::new(None)),
            loading: LoadingFlag::default(),
        }
    }

    /// Restore the cached session, if any
    pub async fn init_session(&self) -> Option<Session> {
        let cache = self.cache.as_ref()?;

        match cache.load().await {
            Ok(Some(session)) => {
                debug!(user_id = %session.user_id, "Restored cached session");
                *self.session.write().await = Some(session.clone());
                Some(session)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to restore cached session");
                None
            }
        }
    }

    /// Log in with a username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let _loading = self.loading.start();

        let account = match self.accounts.find_by_credentials(username, password).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                info!(username = %username, "Login rejected: unknown credentials");
                return Err(DashboardError::InvalidCredentials);
            }
            Err(e) => {
                error!(username = %username, error = %e, "Login error");
                return Err(DashboardError::LoginFailed(e.to_string()));
            }
        };

        if account.status != AccountStatus::Active {
            info!(username = %username, "Login rejected: account inactive");
            return Err(DashboardError::AccountInactive);
        }

        let session = Session::from(&account);
        self.set_session(session.clone()).await;
        log_member_action(account.member_id, "login", Some(&account.username));

        Ok(session)
    }

    /// Replace the current session and persist it
    pub async fn set_session(&self, session: Session) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save(&session).await {
                warn!(error = %e, "Failed to persist session");
            }
        }
        *self.session.write().await = Some(session);
    }

    /// Forget the session locally and in the cache
    pub async fn logout(&self) {
        let previous = self.session.write().await.take();
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear().await {
                warn!(error = %e, "Failed to clear cached session");
            }
        }
        if let Some(session) = previous {
            log_member_action(session.member_id, "logout", Some(&session.username));
        }
    }

    pub async fn current_user(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn is_admin(&self) -> bool {
        self.has_role(Role::Admin).await
    }

    pub async fn is_user(&self) -> bool {
        self.has_role(Role::User).await
    }

    async fn has_role(&self, role: Role) -> bool {
        self.session.read().await.as_ref().map(|s| s.role) == Some(role)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn offline_store() -> AuthStore {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/prsdn_offline")
            .unwrap();
        AuthStore::new(AccountRepository::new(pool), None)
    }

    #[tokio::test]
    async fn test_role_flags_follow_session() {
        let store = offline_store();
        assert!(!store.is_authenticated().await);
        assert!(!store.is_admin().await);

        store.set_session(Session {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            username: "ketua".to_string(),
            member_id: None,
        }).await;
        assert!(store.is_authenticated().await);
        assert!(store.is_admin().await);
        assert!(!store.is_user().await);

        store.logout().await;
        assert!(store.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_init_session_without_cache_is_empty() {
        let store = offline_store();
        assert!(store.init_session().await.is_none());
    }
}
