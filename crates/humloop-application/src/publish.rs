//! Publishing a generated track as a board post.

use humloop_core::audio::AudioAsset;
use humloop_core::post::MusicPostDraft;
use humloop_core::session::{SessionStore, token};
use humloop_core::validation::validate_post_title;
use humloop_core::wizard::{GenerationOptions, GenerationResult};
use humloop_core::{HumloopError, Result};
use humloop_infrastructure::audio_file::guess_mime_type;
use humloop_interaction::{GenerationApi, PostsApi};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const FALLBACK_MIME: &str = "audio/mpeg";

/// Turns a finished generation into a music post.
pub struct PostPublisher {
    session: Arc<SessionStore>,
    posts: PostsApi,
    media: GenerationApi,
}

impl PostPublisher {
    pub fn new(session: Arc<SessionStore>, posts: PostsApi, media: GenerationApi) -> Self {
        Self { session, posts, media }
    }

    /// Publishes `result` and returns the new post id.
    ///
    /// When `asset` is `None` the generated media is downloaded first.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`: no access token is held, or it expired and cannot be
    ///   refreshed; nothing is sent
    /// - `Validation`: the title is blank; nothing is sent
    /// - anything the download or the upload returns
    pub async fn publish(
        &self,
        title: &str,
        description: &str,
        result: &GenerationResult,
        asset: Option<&AudioAsset>,
        options: &GenerationOptions,
    ) -> Result<i64> {
        if !self.can_authenticate().await {
            return Err(HumloopError::unauthorized("log in to publish"));
        }
        validate_post_title(title).into_result()?;

        let audio = match asset {
            Some(asset) => asset.clone(),
            None => self.download(title, result).await?,
        };

        let mut details = serde_json::to_value(options)?;
        if let Some(map) = details.as_object_mut() {
            map.insert("duration".to_string(), json!(result.duration_seconds));
        }

        let mut draft = MusicPostDraft::new(title, description, audio).with_details(details);
        if let Some(user) = self.session.user().await {
            draft = draft.with_author(user.id);
        }

        let post = self.posts.create_music_post(draft).await?;
        info!(post_id = post.id, "Track published");
        Ok(post.id)
    }

    /// An expired access token is still usable while a refresh token exists.
    async fn can_authenticate(&self) -> bool {
        let session = self.session.snapshot().await;
        match (&session.access_token, &session.refresh_token) {
            (None, _) => false,
            (Some(access), None) => !token::is_expired(access),
            (Some(_), Some(_)) => true,
        }
    }

    async fn download(&self, title: &str, result: &GenerationResult) -> Result<AudioAsset> {
        debug!(media_url = %result.media_url, "Downloading generated media for upload");
        let bytes = self.media.download(&result.media_url).await?;
        let file_name = media_file_name(title, &result.media_url);
        let mime = guess_mime_type(Path::new(&file_name));
        let mime = if mime.starts_with("audio/") { mime } else { FALLBACK_MIME.to_string() };
        Ok(AudioAsset::new(file_name, mime, bytes))
    }
}

/// Names the upload after the title, keeping the media URL's extension.
fn media_file_name(title: &str, media_url: &str) -> String {
    let path = media_url.split(['?', '#']).next().unwrap_or(media_url);
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("mp3");

    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let stem = if stem.is_empty() { "humloop-track".to_string() } else { stem };
    format!("{stem}.{extension}")
}
