//! Wiring of the client stack for one CLI invocation.

use anyhow::{Context, Result};
use humloop_application::{PostPublisher, SessionManager};
use humloop_core::config::ClientConfig;
use humloop_core::session::SessionStore;
use humloop_infrastructure::{ConfigStorage, FileTokenStore, HumloopPaths};
use humloop_interaction::{AccountsApi, GenerationApi, HttpGateway, PostsApi, ProfileApi};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct AppContext {
    pub config: ClientConfig,
    pub sessions: SessionManager,
    pub posts: PostsApi,
    pub profile: ProfileApi,
    pub generation: GenerationApi,
    pub publisher: PostPublisher,
}

impl AppContext {
    /// Loads config, rehydrates the persisted session and builds the clients.
    pub async fn bootstrap(config_dir: Option<&Path>) -> Result<Self> {
        let paths = HumloopPaths::new(config_dir);
        let config_path = paths.config_file().context("Failed to resolve config path")?;
        let config = ConfigStorage::new(config_path)
            .load_with_env()
            .context("Failed to load configuration")?;
        debug!(api = %config.api_base_url, generation = %config.generation_base_url, "Configuration loaded");

        let tokens = FileTokenStore::from_paths(&paths).context("Failed to resolve token path")?;
        let store = Arc::new(SessionStore::new(Arc::new(tokens)));

        let api = HttpGateway::new(&config.api_base_url, store.clone(), config.request_timeout())?;
        let generation_gateway = HttpGateway::unauthenticated(&config.generation_base_url, config.request_timeout())?;

        let posts = PostsApi::new(api.clone()).with_upload_timeout(config.generation_timeout());
        let profile = ProfileApi::new(api.clone());
        let generation = GenerationApi::new(generation_gateway).with_timeout(config.generation_timeout());
        let sessions = SessionManager::new(store.clone(), AccountsApi::new(api));
        let publisher = PostPublisher::new(store, posts.clone(), generation.clone());

        sessions.restore().await;

        Ok(Self {
            config,
            sessions,
            posts,
            profile,
            generation,
            publisher,
        })
    }
}
