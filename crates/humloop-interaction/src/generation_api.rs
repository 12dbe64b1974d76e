//! Client for the music generation service.
//!
//! The service lives on its own origin and never receives user tokens, so it
//! is reached through an unauthenticated [`HttpGateway`].

use crate::gateway::{ApiRequest, HttpGateway, MultipartField};
use async_trait::async_trait;
use humloop_core::Result;
use humloop_core::audio::AudioAsset;
use humloop_core::wizard::{
    GenerationErrorBody, GenerationFailure, GenerationMode, GenerationOptions, GenerationResult,
    GenerationService,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// HTTP implementation of [`GenerationService`].
#[derive(Clone)]
pub struct GenerationApi {
    gateway: HttpGateway,
    timeout: Option<Duration>,
}

impl GenerationApi {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway, timeout: None }
    }

    /// Generation can take minutes; this replaces the gateway's default
    /// timeout for generation calls only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Downloads a generated track. Relative URLs resolve against the
    /// service origin.
    pub async fn download(&self, media_url: &str) -> Result<Vec<u8>> {
        let mut request = ApiRequest::get(media_url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        self.gateway.fetch_bytes(request).await
    }

    fn form_fields(mode: GenerationMode, asset: &AudioAsset, options: &GenerationOptions) -> Vec<MultipartField> {
        let genre = options.genre.as_deref().unwrap_or(mode.default_genre());
        let mood = options.mood.as_deref().unwrap_or(mode.default_mood());
        let instrument = options.instrument.as_deref().or(mode.default_instrument());

        let mut fields = vec![
            MultipartField::file("audio", asset.clone()),
            MultipartField::text("genre", genre),
            MultipartField::text("mood", mood),
        ];
        if let Some(instrument) = instrument {
            fields.push(MultipartField::text("instruments[]", instrument));
        }
        if let Some(prompt) = options.custom_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            fields.push(MultipartField::text("custom_prompt", prompt));
        }
        fields
    }
}

#[async_trait]
impl GenerationService for GenerationApi {
    async fn generate(
        &self,
        mode: GenerationMode,
        asset: &AudioAsset,
        options: &GenerationOptions,
    ) -> std::result::Result<GenerationResult, GenerationFailure> {
        let mut request = ApiRequest::post(mode.endpoint()).multipart(Self::form_fields(mode, asset, options));
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.gateway.send_raw(&request).await.map_err(|e| {
            if e.is_network() {
                warn!(error = %e, "Generation service unreachable");
                GenerationFailure::Unreachable { detail: e.to_string() }
            } else {
                warn!(error = %e, "Generation request could not be sent");
                GenerationFailure::Unknown { status: None }
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GenerationFailure::Unreachable {
            detail: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            let error_body = serde_json::from_str::<GenerationErrorBody>(&body).ok();
            let failure = GenerationFailure::from_error_body(Some(status.as_u16()), error_body);
            warn!(status = status.as_u16(), failure = %failure, "Generation failed");
            return Err(failure);
        }

        let unknown = || GenerationFailure::Unknown {
            status: Some(status.as_u16()),
        };
        let parsed: GenerationResponse = serde_json::from_str(&body).map_err(|_| unknown())?;
        let (Some(audio_url), Some(duration)) = (parsed.audio_url, parsed.duration) else {
            return Err(unknown());
        };
        if audio_url.trim().is_empty() {
            return Err(unknown());
        }

        let media_url = self.gateway.url_for(&audio_url);
        debug!(media_url = %media_url, duration, "Generation succeeded");
        Ok(GenerationResult::new(media_url, mode.result_title(), duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api(server: &MockServer) -> GenerationApi {
        GenerationApi::new(HttpGateway::unauthenticated(server.base_url(), Duration::from_secs(5)).unwrap())
    }

    fn hum() -> AudioAsset {
        AudioAsset::new("hum.wav", "audio/wav", vec![0u8; 32])
    }

    #[tokio::test]
    async fn test_unsendable_upload_is_not_reported_as_unreachable() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/generate-from-humming");
            then.status(200).json_body(json!({"audio_url": "/a.wav", "duration": 1.0}));
        });

        let odd = AudioAsset::new("hum.wav", "audio/ x", vec![0u8; 32]);
        let failure = api(&server)
            .generate(GenerationMode::Humming, &odd, &GenerationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(failure, GenerationFailure::Unknown { status: None });
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_success_resolves_relative_url() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/generate-from-humming")
                .body_includes("name=\"audio\"; filename=\"hum.wav\"")
                .body_includes("Pop Ballad")
                .body_includes("name=\"instruments[]\"");
            then.status(200).json_body(json!({
                "status": "success",
                "audio_url": "/final_music/humming_based_1234.wav",
                "duration": 62.5
            }));
        });

        let result = api(&server)
            .generate(GenerationMode::Humming, &hum(), &GenerationOptions::default())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(result.media_url, server.url("/final_music/humming_based_1234.wav"));
        assert_eq!(result.title, "New humming track");
        assert_eq!(result.formatted_duration(), "1:02");
    }

    #[tokio::test]
    async fn test_genre_conversion_uses_its_endpoint_and_options() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/convert-genre")
                .body_includes("Jazz")
                .body_includes("name=\"custom_prompt\"");
            then.status(200)
                .json_body(json!({"status": "success", "audio_url": "/final_music/x.wav", "duration": 10.0}));
        });

        let options = GenerationOptions::default()
            .with_genre("Jazz")
            .with_custom_prompt("late night");
        let result = api(&server)
            .generate(GenerationMode::GenreConversion, &hum(), &options)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(result.title, "Converted track");
    }

    #[tokio::test]
    async fn test_recitation_error_is_classified() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/convert-genre");
            then.status(400).json_body(json!({
                "error": "AI generated music similar to existing material.",
                "error_type": "recitation_error"
            }));
        });

        let failure = api(&server)
            .generate(GenerationMode::GenreConversion, &hum(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(failure, GenerationFailure::Recitation { .. }));
    }

    #[tokio::test]
    async fn test_unstructured_error_is_unknown() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/generate-from-humming");
            then.status(502).body("<html>bad gateway</html>");
        });

        let failure = api(&server)
            .generate(GenerationMode::Humming, &hum(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(failure, GenerationFailure::Unknown { status: Some(502) });
    }

    #[tokio::test]
    async fn test_success_without_url_is_unknown() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/generate-from-humming");
            then.status(200).json_body(json!({"status": "success", "duration": 3.0}));
        });

        let failure = api(&server)
            .generate(GenerationMode::Humming, &hum(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(failure, GenerationFailure::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let api = GenerationApi::new(HttpGateway::unauthenticated("http://127.0.0.1:9", Duration::from_secs(2)).unwrap());
        let failure = api
            .generate(GenerationMode::Humming, &hum(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(failure, GenerationFailure::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_download_fetches_bytes() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/final_music/x.wav");
            then.status(200).body(vec![1u8, 2, 3]);
        });

        let bytes = api(&server).download("/final_music/x.wav").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
