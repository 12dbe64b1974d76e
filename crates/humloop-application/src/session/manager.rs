use humloop_core::session::{Session, SessionStore, UserIdentity, token};
use humloop_core::validation::{validate_password, validate_username};
use humloop_core::{HumloopError, Result};
use humloop_interaction::AccountsApi;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates the network-backed session operations.
///
/// `SessionManager` is responsible for:
/// - Rehydrating a persisted session on startup
/// - Logging in and fetching the identity for the new tokens
/// - Logging out, which always ends the local session
/// - Registering new accounts after client-side validation
///
/// The session itself lives in the shared [`SessionStore`]; the HTTP
/// gateway may clear it at any time when a refresh fails.
pub struct SessionManager {
    store: Arc<SessionStore>,
    accounts: AccountsApi,
}

impl SessionManager {
    pub fn new(store: Arc<SessionStore>, accounts: AccountsApi) -> Self {
        Self { store, accounts }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Snapshot of the current session.
    pub async fn current(&self) -> Session {
        self.store.snapshot().await
    }

    /// Rehydrates the session persisted by an earlier run.
    ///
    /// Fails open: any problem (unreadable storage, expired or malformed
    /// token, rejected identity fetch) ends in the logged-out state, never in
    /// an error.
    pub async fn restore(&self) -> Session {
        let tokens = match self.store.load_persisted().await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Could not read persisted tokens");
                self.store.clear().await;
                return Session::default();
            }
        };

        let Some(access) = tokens.access_token.as_deref() else {
            if !tokens.is_empty() {
                self.store.clear().await;
            }
            debug!("No persisted session");
            return Session::default();
        };

        if token::is_expired(access) {
            info!("Persisted access token expired, starting logged out");
            self.store.clear().await;
            return Session::default();
        }

        self.store.adopt(tokens).await;

        let identity = match self.accounts.current_user().await {
            Ok(user) => self.store.set_user(user).await,
            Err(e) => Err(e),
        };
        if let Err(e) = identity {
            info!(error = %e, "Restored session rejected, starting logged out");
            self.store.clear().await;
        }

        self.store.snapshot().await
    }

    /// Logs in and returns the identity the session now holds.
    ///
    /// Identity is fetched as part of login, so a successful return always
    /// leaves a consistent session. If the identity fetch fails the new
    /// tokens are discarded and the error returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserIdentity> {
        let mut missing = Vec::new();
        if username.trim().is_empty() {
            missing.push("Username is required.".to_string());
        }
        if password.is_empty() {
            missing.push("Password is required.".to_string());
        }
        if !missing.is_empty() {
            return Err(HumloopError::Validation(missing));
        }

        let tokens = self.accounts.login(username.trim(), password).await?;
        self.store.store_tokens(tokens.access, tokens.refresh).await?;

        let identity = match self.accounts.current_user().await {
            Ok(user) => self.store.set_user(user.clone()).await.map(|_| user),
            Err(e) => Err(e),
        };

        match identity {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, "Identity fetch after login failed");
                self.store.clear().await;
                Err(e)
            }
        }
    }

    /// Ends the session.
    ///
    /// The revoke request is best effort; local state is cleared whatever it
    /// returns. With no session held nothing is sent.
    pub async fn logout(&self) {
        if let Some(refresh) = self.store.refresh_token().await {
            if let Err(e) = self.accounts.logout(&refresh).await {
                warn!(error = %e, "Logout request failed, clearing local session anyway");
            }
        }
        self.store.clear().await;
    }

    /// Replaces only the access token.
    pub async fn set_access_token(&self, access_token: String) -> Result<()> {
        self.store.set_access_token(access_token).await
    }

    /// Registers a new account.
    ///
    /// Username and password are checked locally first; when they fail, all
    /// violations are returned together and nothing is sent.
    pub async fn register(&self, username: &str, password: &str, nickname: &str) -> Result<Option<String>> {
        validate_username(username)
            .merge(validate_password(password))
            .into_result()?;

        let response = self.accounts.register(username, password, nickname).await?;
        info!(username, "Account registered");
        Ok(response.message)
    }
}
