//! Reading audio files from disk into [`AudioAsset`]s.

use humloop_core::audio::{AudioAsset, AudioFileInfo};
use humloop_core::validation::{UploadLimits, validate_audio_file};
use humloop_core::{HumloopError, Result};
use std::path::Path;
use tracing::debug;

/// Guesses the MIME type from the file extension.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Describes a file without reading its contents.
pub async fn inspect_audio_file(path: &Path) -> Result<AudioFileInfo> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HumloopError::not_found("audio file", path.display().to_string())
        } else {
            e.into()
        }
    })?;
    if !metadata.is_file() {
        return Err(HumloopError::io(format!("{} is not a regular file", path.display())));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| HumloopError::io(format!("{} has no file name", path.display())))?;

    Ok(AudioFileInfo::new(file_name, guess_mime_type(path), metadata.len()))
}

/// Loads an audio file, rejecting it before reading when the rules fail.
///
/// The same rules run again when the asset is submitted to a wizard; checking
/// here avoids pulling an oversized file into memory.
pub async fn load_audio_file(path: &Path, limits: &UploadLimits) -> Result<AudioAsset> {
    let info = inspect_audio_file(path).await?;
    validate_audio_file(&info, limits).into_result()?;

    let data = tokio::fs::read(path).await?;
    debug!(file = %info.file_name, bytes = data.len(), "Audio file loaded");
    Ok(AudioAsset::new(info.file_name, info.mime_type, data))
}
