use super::model::{Session, StoredTokens, UserIdentity};
use super::repository::TokenStore;
use crate::error::{HumloopError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Process-wide holder of the current [`Session`].
///
/// `SessionStore` keeps the in-memory session and mirrors the token pair into
/// a [`TokenStore`]. It performs no network calls; restore, login and logout
/// are orchestrated by the application layer on top of it.
///
/// Any holder may observe the session being cleared between two calls, for
/// example when a concurrent request hit an unrecoverable 401.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn TokenStore>,
}

impl SessionStore {
    /// Creates an empty store backed by `storage`.
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            storage,
        }
    }

    /// Returns a copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<UserIdentity> {
        self.state.read().await.user.clone()
    }

    /// Reads whatever tokens were persisted by an earlier run.
    pub async fn load_persisted(&self) -> Result<StoredTokens> {
        self.storage.load().await
    }

    /// Adopts tokens into memory without writing them back.
    ///
    /// Used during restore, where the tokens came from storage already.
    pub async fn adopt(&self, tokens: StoredTokens) {
        let mut state = self.state.write().await;
        state.access_token = tokens.access_token;
        state.refresh_token = tokens.refresh_token;
        state.user = None;
    }

    /// Stores a fresh token pair durably and in memory.
    ///
    /// Any previously known user is dropped; the caller fetches identity for
    /// the new tokens.
    pub async fn store_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let tokens = StoredTokens::new(access_token, Some(refresh_token));
        let mut state = self.state.write().await;
        self.storage.save(&tokens).await?;

        state.access_token = tokens.access_token;
        state.refresh_token = tokens.refresh_token;
        state.user = None;
        debug!("Stored new token pair");
        Ok(())
    }

    /// Replaces only the access token, e.g. after a refresh.
    pub async fn set_access_token(&self, access_token: String) -> Result<()> {
        let mut state = self.state.write().await;
        let tokens = StoredTokens::new(access_token, state.refresh_token.clone());
        self.storage.save(&tokens).await?;
        state.access_token = tokens.access_token;
        debug!("Access token replaced");
        Ok(())
    }

    /// Stores the result of redeeming `redeemed` as the new access token.
    ///
    /// Applies only while `redeemed` is still the held refresh token. A
    /// session that was cleared or replaced while the refresh was in flight
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without writing when the session moved on.
    pub async fn set_refreshed_access_token(&self, redeemed: &str, access_token: String) -> Result<()> {
        let mut state = self.state.write().await;
        if state.refresh_token.as_deref() != Some(redeemed) {
            debug!("Discarding refreshed token for a session that ended");
            return Err(HumloopError::unauthorized("session changed during refresh"));
        }
        let tokens = StoredTokens::new(access_token, state.refresh_token.clone());
        self.storage.save(&tokens).await?;
        state.access_token = tokens.access_token;
        debug!("Access token refreshed");
        Ok(())
    }

    /// Records the identity for the held access token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no access token is held; a user without a
    /// token would break the session invariant.
    pub async fn set_user(&self, user: UserIdentity) -> Result<()> {
        let mut state = self.state.write().await;
        if state.access_token.is_none() {
            return Err(HumloopError::unauthorized(
                "cannot attach a user to a session without an access token",
            ));
        }
        info!(user_id = user.id, "Session authenticated");
        state.user = Some(user);
        Ok(())
    }

    /// Tears the session down: memory first, then durable storage.
    ///
    /// Always succeeds locally. A storage failure is logged and otherwise
    /// ignored so that logout can never leave the process logged in.
    pub async fn clear(&self) {
        self.clear_if(|_| true).await;
    }

    /// Tears the session down only if `still_current` accepts it.
    ///
    /// Returns whether the session was cleared. Used by background work that
    /// must not end a session other than the one it started with.
    pub async fn clear_if<F>(&self, still_current: F) -> bool
    where
        F: FnOnce(&Session) -> bool,
    {
        let mut state = self.state.write().await;
        if !still_current(&state) {
            return false;
        }
        if !state.is_empty() {
            info!("Session cleared");
        }
        *state = Session::default();

        if let Err(e) = self.storage.clear().await {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemoryTokenStore;

    fn user() -> UserIdentity {
        UserIdentity {
            id: 1,
            username: "hummer".into(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_store_tokens_persists_both_entries() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());

        store.store_tokens("access".into(), "refresh".into()).await.unwrap();

        let persisted = storage.load().await.unwrap();
        assert_eq!(persisted.access_token.as_deref(), Some("access"));
        assert_eq!(persisted.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(store.access_token().await.as_deref(), Some("access"));
    }

    #[tokio::test]
    async fn test_set_access_token_keeps_refresh_token() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());
        store.store_tokens("old".into(), "refresh".into()).await.unwrap();

        store.set_access_token("new".into()).await.unwrap();

        let persisted = storage.load().await.unwrap();
        assert_eq!(persisted.access_token.as_deref(), Some("new"));
        assert_eq!(persisted.refresh_token.as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn test_user_requires_access_token() {
        let store = SessionStore::new(Arc::new(InMemoryTokenStore::new()));
        let err = store.set_user(user()).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(store.user().await.is_none());

        store.store_tokens("a".into(), "r".into()).await.unwrap();
        store.set_user(user()).await.unwrap();
        assert!(store.snapshot().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());

        store.clear().await;
        store.clear().await;
        assert!(store.snapshot().await.is_empty());
        assert!(storage.load().await.unwrap().is_empty());

        store.store_tokens("a".into(), "r".into()).await.unwrap();
        store.clear().await;
        assert!(store.snapshot().await.is_empty());
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adopt_does_not_write_storage() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());

        store
            .adopt(StoredTokens::new("restored", Some("r".into())))
            .await;

        assert_eq!(store.access_token().await.as_deref(), Some("restored"));
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refreshed_token_applies_to_same_session_only() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());
        store.store_tokens("old".into(), "r1".into()).await.unwrap();

        store.set_refreshed_access_token("r1", "fresh".into()).await.unwrap();
        assert_eq!(store.access_token().await.as_deref(), Some("fresh"));

        store.clear().await;
        let err = store.set_refreshed_access_token("r1", "late".into()).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(store.snapshot().await.is_empty());
        assert!(storage.load().await.unwrap().is_empty());

        store.store_tokens("a2".into(), "r2".into()).await.unwrap();
        assert!(store.set_refreshed_access_token("r1", "late".into()).await.is_err());
        assert_eq!(store.access_token().await.as_deref(), Some("a2"));
        assert_eq!(storage.load().await.unwrap().access_token.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_clear_if_leaves_other_session_alone() {
        let storage = Arc::new(InMemoryTokenStore::new());
        let store = SessionStore::new(storage.clone());
        store.store_tokens("a2".into(), "r2".into()).await.unwrap();

        let cleared = store
            .clear_if(|session| session.refresh_token.as_deref() == Some("r1"))
            .await;

        assert!(!cleared);
        assert_eq!(store.refresh_token().await.as_deref(), Some("r2"));
        assert!(!storage.load().await.unwrap().is_empty());
    }
}
