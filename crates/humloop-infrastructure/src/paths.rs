//! Path management for humloop's local files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/humloop/
//! ├── config.toml      # Client configuration
//! └── tokens.json      # Persisted access/refresh tokens
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "humloop";
const CONFIG_FILE: &str = "config.toml";
const TOKENS_FILE: &str = "tokens.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves the files humloop keeps on disk.
///
/// With a base directory every file lives directly under it, which is what
/// tests and the `--config-dir` flag use. Without one the files live in
/// `~/.config/humloop/` on every platform.
#[derive(Debug, Clone)]
pub struct HumloopPaths {
    base: Option<PathBuf>,
}

impl HumloopPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the humloop configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/humloop/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".config").join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// Returns the path to the token file.
    ///
    /// # Security Note
    ///
    /// The file holds bearer credentials; writers restrict it to the owner
    /// on Unix.
    pub fn tokens_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(TOKENS_FILE))
    }
}

impl Default for HumloopPaths {
    fn default() -> Self {
        Self::new(None)
    }
}
