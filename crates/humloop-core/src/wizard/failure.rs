use serde::Deserialize;
use thiserror::Error;

const RECITATION_ERROR_TYPE: &str = "recitation_error";

/// Error payload returned by the generation service: `{error, error_type}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

/// Why a generation run failed, ordered from most to least specific.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The model output was rejected for resembling existing material.
    #[error("generation rejected by recitation check")]
    Recitation { detail: Option<String> },

    /// The service explained the failure.
    #[error("generation service error: {message}")]
    Backend {
        message: String,
        error_type: Option<String>,
    },

    /// No response arrived at all.
    #[error("generation service unreachable: {detail}")]
    Unreachable { detail: String },

    /// A response arrived but could not be interpreted.
    #[error("unexpected generation response (status {status:?})")]
    Unknown { status: Option<u16> },
}

impl GenerationFailure {
    /// Classifies an error response from the generation service.
    pub fn from_error_body(status: Option<u16>, body: Option<GenerationErrorBody>) -> Self {
        let Some(body) = body else {
            return Self::Unknown { status };
        };

        if body.error_type.as_deref() == Some(RECITATION_ERROR_TYPE) {
            return Self::Recitation { detail: body.error };
        }

        match body.error.filter(|message| !message.trim().is_empty()) {
            Some(message) => Self::Backend {
                message,
                error_type: body.error_type,
            },
            None => Self::Unknown { status },
        }
    }

    /// Message shown to the user on the failed step.
    pub fn user_message(&self) -> String {
        match self {
            Self::Recitation { .. } => "The generated music was too similar to existing \
                copyrighted material. Try a different melody or prompt."
                .to_string(),
            Self::Backend { message, .. } => message.clone(),
            Self::Unreachable { .. } => "Could not reach the generation server. Check your \
                connection and try again."
                .to_string(),
            Self::Unknown { .. } => "An unknown server error occurred.".to_string(),
        }
    }
}
