//! Token storage trait.
//!
//! Defines the interface for durable persistence of the token pair.

use super::model::StoredTokens;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// An abstract store for the access/refresh token pair.
///
/// This trait decouples the session lifecycle from the storage mechanism
/// (a JSON file on disk, a keychain, memory in tests).
///
/// # Implementation Notes
///
/// Implementations must treat the pair as one record: `clear` removes both
/// entries, and clearing an already empty store succeeds.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the persisted tokens.
    ///
    /// # Returns
    ///
    /// - `Ok(StoredTokens)`: The stored pair (possibly empty)
    /// - `Err(_)`: Storage could not be read
    async fn load(&self) -> Result<StoredTokens>;

    /// Replaces the persisted tokens.
    async fn save(&self, tokens: &StoredTokens) -> Result<()>;

    /// Removes both entries.
    async fn clear(&self) -> Result<()>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with tokens, as if persisted by an
    /// earlier run.
    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<StoredTokens> {
        Ok(self.tokens.lock().await.clone())
    }

    async fn save(&self, tokens: &StoredTokens) -> Result<()> {
        *self.tokens.lock().await = tokens.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.lock().await = StoredTokens::default();
        Ok(())
    }
}
