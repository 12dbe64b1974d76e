//! Local infrastructure for the Humloop client: paths, token and config
//! files, and audio loading.

pub mod audio_file;
pub mod paths;
pub mod storage;

pub use crate::paths::HumloopPaths;
pub use crate::storage::{ConfigStorage, FileTokenStore};
