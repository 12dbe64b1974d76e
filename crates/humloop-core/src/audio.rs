//! Audio asset handles passed between the wizard, validation and transports.

use std::fmt;
use std::sync::Arc;

/// Metadata describing an audio file without its contents.
///
/// Validation only ever looks at this, so callers can reject a file before
/// reading it into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFileInfo {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl AudioFileInfo {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

/// An in-memory audio file.
///
/// The contents are reference counted, so cloning an asset (for a retry or a
/// publish) does not copy the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioAsset {
    file_name: String,
    mime_type: String,
    data: Arc<[u8]>,
}

impl AudioAsset {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn info(&self) -> AudioFileInfo {
        AudioFileInfo::new(self.file_name.clone(), self.mime_type.clone(), self.size_bytes())
    }
}

// Skip the payload; assets can be tens of megabytes.
impl fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioAsset")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_reflects_payload() {
        let asset = AudioAsset::new("hum.wav", "audio/wav", vec![0u8; 16]);
        let info = asset.info();
        assert_eq!(info.file_name, "hum.wav");
        assert_eq!(info.mime_type, "audio/wav");
        assert_eq!(info.size_bytes, 16);
    }

    #[test]
    fn test_clone_shares_bytes() {
        let asset = AudioAsset::new("hum.wav", "audio/wav", vec![1u8, 2, 3]);
        let copy = asset.clone();
        assert_eq!(asset.bytes().as_ptr(), copy.bytes().as_ptr());
    }

    #[test]
    fn test_debug_omits_payload() {
        let asset = AudioAsset::new("hum.wav", "audio/wav", vec![7u8; 4]);
        let rendered = format!("{asset:?}");
        assert!(rendered.contains("size_bytes: 4"));
        assert!(!rendered.contains("[7, 7"));
    }
}
