//! File-backed token persistence.

use super::atomic_json::AtomicJsonFile;
use crate::paths::HumloopPaths;
use async_trait::async_trait;
use humloop_core::session::{StoredTokens, TokenStore};
use humloop_core::{HumloopError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// [`TokenStore`] keeping the pair in `tokens.json`.
///
/// Both entries live in one document, so saving or clearing them is a single
/// atomic file operation.
#[derive(Clone)]
pub struct FileTokenStore {
    file: Arc<AtomicJsonFile<StoredTokens>>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    /// Store at the default location resolved by `paths`.
    pub fn from_paths(paths: &HumloopPaths) -> Result<Self> {
        let path = paths
            .tokens_file()
            .map_err(|e| HumloopError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AtomicJsonFile<StoredTokens>) -> Result<T> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || op(&file))
            .await
            .map_err(|e| HumloopError::internal(format!("token storage task failed: {e}")))?
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<StoredTokens> {
        self.blocking(|file| Ok(file.load()?.unwrap_or_default())).await
    }

    async fn save(&self, tokens: &StoredTokens) -> Result<()> {
        let tokens = tokens.clone();
        self.blocking(move |file| {
            file.save(&tokens)?;
            debug!(path = %file.path().display(), "Tokens persisted");
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|file| Ok(file.remove()?)).await
    }
}
