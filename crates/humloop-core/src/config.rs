use crate::validation::{DEFAULT_MAX_UPLOAD_BYTES, UploadLimits};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_GENERATION_BASE_URL: &str = "http://localhost:5000";

/// Client settings, read from `config.toml`. Every key is optional.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base of the REST backend, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,
    /// Base of the generation service, a separate origin.
    pub generation_base_url: String,
    pub max_upload_bytes: u64,
    pub request_timeout_secs: u64,
    /// Generation can take minutes; it gets its own budget.
    pub generation_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            generation_base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 30,
            generation_timeout_secs: 600,
        }
    }
}

impl ClientConfig {
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits::new(self.max_upload_bytes)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}
