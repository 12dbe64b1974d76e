use crate::audio::AudioAsset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    AwaitingUpload,
    AwaitingDetails,
    Processing,
    Complete,
    Failed,
}

impl WizardStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Complete | WizardStep::Failed)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WizardStep::AwaitingUpload => "awaiting upload",
            WizardStep::AwaitingDetails => "awaiting details",
            WizardStep::Processing => "processing",
            WizardStep::Complete => "complete",
            WizardStep::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Which backend pipeline a wizard feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// New music composed from a hummed melody.
    #[default]
    Humming,
    /// An existing track re-arranged in another genre.
    GenreConversion,
}

impl GenerationMode {
    /// Endpoint path on the generation service.
    pub fn endpoint(&self) -> &'static str {
        match self {
            GenerationMode::Humming => "generate-from-humming",
            GenerationMode::GenreConversion => "convert-genre",
        }
    }

    pub fn default_genre(&self) -> &'static str {
        match self {
            GenerationMode::Humming => "Pop Ballad",
            GenerationMode::GenreConversion => "Rock",
        }
    }

    pub fn default_mood(&self) -> &'static str {
        match self {
            GenerationMode::Humming => "Happy",
            GenerationMode::GenreConversion => "Energetic",
        }
    }

    /// Instrument used when none was picked. Genre conversion leaves the
    /// choice to the model.
    pub fn default_instrument(&self) -> Option<&'static str> {
        match self {
            GenerationMode::Humming => Some("Piano"),
            GenerationMode::GenreConversion => None,
        }
    }

    /// Title given to results, since the backend does not name them.
    pub fn result_title(&self) -> &'static str {
        match self {
            GenerationMode::Humming => "New humming track",
            GenerationMode::GenreConversion => "Converted track",
        }
    }
}

/// Free-form choices made on the details step. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl GenerationOptions {
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = Some(instrument.into());
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genre.is_none()
            && self.mood.is_none()
            && self.instrument.is_none()
            && self.custom_prompt.is_none()
    }
}

/// A finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub media_url: String,
    pub title: String,
    pub duration_seconds: f64,
}

impl GenerationResult {
    pub fn new(media_url: impl Into<String>, title: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            media_url: media_url.into(),
            title: title.into(),
            duration_seconds,
        }
    }

    /// `m:ss` rendering of the duration.
    pub fn formatted_duration(&self) -> String {
        let total = self.duration_seconds.max(0.0).floor() as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Everything the driver needs to run one backend call.
///
/// Issued by [`WizardSession::submit_details`](super::WizardSession::submit_details);
/// the `run_id` must accompany the resolution.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub run_id: u64,
    pub mode: GenerationMode,
    pub asset: AudioAsset,
    pub options: GenerationOptions,
}
