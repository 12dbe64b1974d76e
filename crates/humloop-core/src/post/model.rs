use crate::audio::AudioAsset;
use crate::error::Result;
use crate::validation::validate_post_title;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author reference on a post.
///
/// List endpoints return a bare user id, detail endpoints may expand it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostAuthor {
    Id(i64),
    User {
        id: i64,
        #[serde(default)]
        username: Option<String>,
    },
}

impl PostAuthor {
    pub fn id(&self) -> i64 {
        match self {
            PostAuthor::Id(id) => *id,
            PostAuthor::User { id, .. } => *id,
        }
    }
}

/// A board post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<PostAuthor>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes_count: Option<u32>,
    #[serde(default)]
    pub comments_count: Option<u32>,
}

/// Sort order accepted by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrdering {
    #[default]
    Newest,
    Oldest,
    MostLiked,
}

impl PostOrdering {
    /// Value of the `ordering` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            PostOrdering::Newest => "-created_at",
            PostOrdering::Oldest => "created_at",
            PostOrdering::MostLiked => "-likes_count",
        }
    }
}

impl fmt::Display for PostOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// A music post ready for upload.
#[derive(Debug, Clone)]
pub struct MusicPostDraft {
    pub title: String,
    pub content: String,
    pub audio: AudioAsset,
    /// Generation choices, sent as a JSON `details` field.
    pub details: Option<serde_json::Value>,
    pub author: Option<i64>,
}

impl MusicPostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, audio: AudioAsset) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            audio,
            details: None,
            author: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_author(mut self, author: i64) -> Self {
        self.author = Some(author);
        self
    }

    /// Trims title and content and rejects a blank title.
    pub fn validate(mut self) -> Result<Self> {
        validate_post_title(&self.title).into_result()?;
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        Ok(self)
    }
}

/// Partial update for `PUT posts/{id}/`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_accepts_bare_and_expanded_author() {
        let bare: Post = serde_json::from_value(json!({
            "id": 1, "title": "a", "content": "b", "author": 7,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(bare.author.unwrap().id(), 7);
        assert!(bare.created_at.is_some());

        let expanded: Post = serde_json::from_value(json!({
            "id": 2, "title": "a", "author": {"id": 9, "username": "kim"}, "likes_count": 3
        }))
        .unwrap();
        assert_eq!(expanded.author.unwrap().id(), 9);
        assert_eq!(expanded.likes_count, Some(3));
    }

    #[test]
    fn test_draft_validation_trims_and_rejects_blank_title() {
        let audio = AudioAsset::new("song.mp3", "audio/mpeg", vec![1, 2, 3]);
        let draft = MusicPostDraft::new("  My song ", " desc ", audio.clone())
            .validate()
            .unwrap();
        assert_eq!(draft.title, "My song");
        assert_eq!(draft.content, "desc");

        let err = MusicPostDraft::new("   ", "", audio).validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = PostPatch {
            title: Some("new".into()),
            content: None,
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"title": "new"}));
        assert!(PostPatch::default().is_empty());
    }
}
