//! Storage layer for local files.

mod atomic_json;
mod config_storage;
mod token_storage;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use config_storage::{
    ConfigStorage, ENV_API_URL, ENV_GENERATION_URL, ENV_MAX_UPLOAD_BYTES, apply_overrides,
};
pub use token_storage::FileTokenStore;
