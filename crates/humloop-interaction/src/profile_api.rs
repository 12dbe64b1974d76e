//! Profile endpoints for the signed-in user: `users/me/`, own works and
//! favorites.

use crate::gateway::{ApiRequest, HttpGateway};
use crate::listing::Listing;
use humloop_core::Result;
use humloop_core::profile::{
    FavoriteMusic, FavoritePost, Music, PasswordChange, ProfileUpdate, UserProfile, UserStatistics,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the profile endpoints. Every call needs a session.
#[derive(Clone)]
pub struct ProfileApi {
    gateway: HttpGateway,
}

impl ProfileApi {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    pub async fn me(&self) -> Result<UserProfile> {
        self.gateway.send_json(ApiRequest::get("users/me/")).await
    }

    /// Validates the changed fields locally, then sends them.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        update.validate()?;
        let body = serde_json::to_value(update)?;
        self.gateway.send_json(ApiRequest::put("users/me/").json(body)).await
    }

    /// Changes the password after the same strength rules as registration.
    ///
    /// Returns the backend's confirmation message, if any.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Option<String>> {
        change.validate()?;
        let body = serde_json::to_value(change)?;
        let response = self
            .gateway
            .send(ApiRequest::post("users/change-password/").json(body))
            .await?;
        info!("Password changed");

        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MessageBody>(&text)
            .ok()
            .and_then(|body| body.message))
    }

    pub async fn statistics(&self) -> Result<UserStatistics> {
        self.gateway.send_json(ApiRequest::get("users/me/statistics/")).await
    }

    /// Tracks owned by the signed-in user, one page at a time.
    pub async fn my_music(&self, page: u32) -> Result<Vec<Music>> {
        self.page("music/my-music/", page).await
    }

    pub async fn favorite_posts(&self, page: u32) -> Result<Vec<FavoritePost>> {
        self.page("posts/favorites/", page).await
    }

    pub async fn favorite_music(&self, page: u32) -> Result<Vec<FavoriteMusic>> {
        self.page("music/favorites/", page).await
    }

    async fn page<T: DeserializeOwned>(&self, path: &str, page: u32) -> Result<Vec<T>> {
        let request = ApiRequest::get(path).query("page", page.max(1).to_string());
        let list: Listing<T> = self.gateway.send_json(request).await?;
        Ok(list.into_items())
    }
}
