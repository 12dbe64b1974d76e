use crate::error::{HumloopError, Result};
use crate::post::Post;
use crate::validation::{ValidationResult, validate_email, validate_password_change, validate_username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of the signed-in user as returned by `users/me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub posts_count: Option<u32>,
    #[serde(default)]
    pub favorites_count: Option<u32>,
    #[serde(default)]
    pub followers_count: Option<u32>,
    #[serde(default)]
    pub following_count: Option<u32>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Activity totals from `users/me/statistics/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStatistics {
    pub total_posts: u32,
    pub total_likes: u32,
    pub total_comments: u32,
    pub total_music: u32,
    pub total_favorites: u32,
}

/// A track in the music library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Music {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritePost {
    pub id: i64,
    pub post: Post,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteMusic {
    pub id: i64,
    pub music: Music,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update for `PUT users/me/`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.bio.is_none()
    }

    /// Applies the username and email rules to the fields being changed.
    ///
    /// # Errors
    ///
    /// `Validation` with every violation, or when nothing would change.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(HumloopError::Validation(vec!["Nothing to update.".to_string()]));
        }
        let mut result = ValidationResult::default();
        if let Some(username) = &self.username {
            result = result.merge(validate_username(username));
        }
        if let Some(email) = &self.email {
            result = result.merge(validate_email(email));
        }
        result.into_result()
    }
}

/// Body of `POST users/change-password/`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl PasswordChange {
    pub fn new(old_password: impl Into<String>, new_password: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            old_password: old_password.into(),
            new_password: new_password.into(),
            new_password_confirm: confirm.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_password_change(&self.old_password, &self.new_password, &self.new_password_confirm).into_result()
    }
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tolerates_missing_counters() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 3, "username": "hummer", "nickname": "", "bio": "loops"
        }))
        .unwrap();
        assert_eq!(profile.display_name(), "hummer");
        assert_eq!(profile.posts_count, None);
    }

    #[test]
    fn test_favorite_post_wraps_post() {
        let favorite: FavoritePost = serde_json::from_value(json!({
            "id": 1,
            "post": {"id": 8, "title": "night drive", "author": 2},
            "created_at": "2024-06-01T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(favorite.post.id, 8);
        assert!(favorite.created_at.is_some());
    }

    #[test]
    fn test_profile_update_validation() {
        assert!(ProfileUpdate::default().validate().unwrap_err().is_validation());

        let update = ProfileUpdate {
            username: Some("ab".into()),
            email: Some("nope".into()),
            bio: None,
        };
        let err = update.validate().unwrap_err();
        assert_eq!(err.validation_messages().unwrap().len(), 2);

        let bio_only = ProfileUpdate {
            bio: Some("hello".into()),
            ..Default::default()
        };
        assert!(bio_only.validate().is_ok());
        assert_eq!(serde_json::to_value(&bio_only).unwrap(), json!({"bio": "hello"}));
    }

    #[test]
    fn test_password_change_debug_hides_secrets() {
        let change = PasswordChange::new("Old1234!", "New1234!", "New1234!");
        assert!(change.validate().is_ok());
        assert!(!format!("{change:?}").contains("1234"));
    }
}
