//! Board endpoints under `posts/`.

use crate::gateway::{ApiRequest, HttpGateway, MultipartField};
use crate::listing::Listing;
use humloop_core::post::{MusicPostDraft, Post, PostOrdering, PostPatch};
use humloop_core::{HumloopError, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Result of `posts/{id}/like/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LikeStatus {
    #[serde(default, alias = "is_liked")]
    pub liked: Option<bool>,
    #[serde(default)]
    pub likes_count: Option<u32>,
}

/// Client for the board endpoints.
#[derive(Clone)]
pub struct PostsApi {
    gateway: HttpGateway,
    upload_timeout: Option<Duration>,
}

impl PostsApi {
    pub fn new(gateway: HttpGateway) -> Self {
        Self {
            gateway,
            upload_timeout: None,
        }
    }

    /// Overrides the timeout for music uploads, which carry whole files.
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = Some(timeout);
        self
    }

    pub async fn list_posts(&self, ordering: PostOrdering) -> Result<Vec<Post>> {
        let request = ApiRequest::get("posts/list-posts/").query("ordering", ordering.as_query());
        let list: Listing<Post> = self.gateway.send_json(request).await?;
        Ok(list.into_items())
    }

    /// Posts authored by the logged-in user.
    pub async fn my_posts(&self, ordering: PostOrdering) -> Result<Vec<Post>> {
        let request = ApiRequest::get("posts/my-posts/").query("ordering", ordering.as_query());
        let list: Listing<Post> = self.gateway.send_json(request).await?;
        Ok(list.into_items())
    }

    /// Fetches one post. A missing post is `Ok(None)`.
    pub async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        match self.gateway.send_json(ApiRequest::get(post_path(id))).await {
            Ok(post) => Ok(Some(post)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_post(&self, title: &str, content: &str) -> Result<Post> {
        let request = ApiRequest::post("posts/create-post/").json(json!({ "title": title, "content": content }));
        self.gateway.send_json(request).await
    }

    /// Uploads a music post as multipart form data.
    pub async fn create_music_post(&self, draft: MusicPostDraft) -> Result<Post> {
        let draft = draft.validate()?;

        let mut fields = vec![
            MultipartField::text("title", draft.title),
            MultipartField::text("content", draft.content),
            MultipartField::file("audio", draft.audio),
        ];
        if let Some(details) = draft.details {
            fields.push(MultipartField::text("details", details.to_string()));
        }
        if let Some(author) = draft.author {
            fields.push(MultipartField::text("author", author.to_string()));
        }

        let mut request = ApiRequest::post("posts/create-music-post/").multipart(fields);
        if let Some(timeout) = self.upload_timeout {
            request = request.timeout(timeout);
        }
        self.gateway.send_json(request).await
    }

    pub async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<Post> {
        if patch.is_empty() {
            return Err(HumloopError::Validation(vec!["Nothing to update.".to_string()]));
        }
        let body = serde_json::to_value(patch)?;
        self.gateway
            .send_json(ApiRequest::put(post_path(id)).json(body))
            .await
    }

    pub async fn delete_post(&self, id: i64) -> Result<()> {
        self.gateway.send_empty(ApiRequest::delete(post_path(id))).await
    }

    pub async fn toggle_like(&self, id: i64) -> Result<LikeStatus> {
        let response = self
            .gateway
            .send(ApiRequest::post(format!("posts/{id}/like/")))
            .await?;
        // Some deployments answer 204 with no body.
        let body = response
            .text()
            .await
            .map_err(|e| HumloopError::network(format!("failed to read response body: {e}")))?;
        if body.trim().is_empty() {
            return Ok(LikeStatus {
                liked: None,
                likes_count: None,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn post_path(id: i64) -> String {
    format!("posts/{id}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use humloop_core::audio::AudioAsset;
    use humloop_core::session::{InMemoryTokenStore, SessionStore};
    use std::sync::Arc;

    async fn api(server: &MockServer) -> PostsApi {
        let session = Arc::new(SessionStore::new(Arc::new(InMemoryTokenStore::new())));
        session.store_tokens("a".into(), "r".into()).await.unwrap();
        let gateway = HttpGateway::new(server.url("/api"), session, Duration::from_secs(5)).unwrap();
        PostsApi::new(gateway)
    }

    #[tokio::test]
    async fn test_list_accepts_plain_and_paginated() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/posts/list-posts/")
                .query_param("ordering", "-created_at");
            then.status(200).json_body(json!([{"id": 1, "title": "one"}]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/posts/my-posts/");
            then.status(200)
                .json_body(json!({"count": 1, "next": null, "previous": null, "results": [{"id": 2, "title": "two"}]}));
        });

        let api = api(&server).await;
        let all = api.list_posts(PostOrdering::Newest).await.unwrap();
        let mine = api.my_posts(PostOrdering::Newest).await.unwrap();

        assert_eq!(all[0].id, 1);
        assert_eq!(mine[0].title, "two");
    }

    #[tokio::test]
    async fn test_get_missing_post_is_none() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/posts/42/");
            then.status(404).json_body(json!({"detail": "Not found."}));
        });

        let api = api(&server).await;
        assert!(api.get_post(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_music_post_is_multipart() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/posts/create-music-post/")
                .header("authorization", "Bearer a")
                .body_includes("name=\"title\"")
                .body_includes("My song")
                .body_includes("name=\"audio\"; filename=\"song.mp3\"")
                .body_includes("name=\"author\"");
            then.status(201).json_body(json!({"id": 5, "title": "My song"}));
        });

        let api = api(&server).await;
        let draft = MusicPostDraft::new(" My song ", "", AudioAsset::new("song.mp3", "audio/mpeg", vec![1, 2, 3]))
            .with_details(json!({"genre": "Jazz"}))
            .with_author(7);
        let post = api.create_music_post(draft).await.unwrap();

        assert_eq!(post.id, 5);
        mock.assert();
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch() {
        let server = MockServer::start_async().await;
        let api = api(&server).await;
        let err = api.update_post(1, &PostPatch::default()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_delete_and_like() {
        let server = MockServer::start_async().await;
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/posts/3/");
            then.status(204);
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/posts/3/like/");
            then.status(200).json_body(json!({"liked": true, "likes_count": 4}));
        });

        let api = api(&server).await;
        api.delete_post(3).await.unwrap();
        let like = api.toggle_like(3).await.unwrap();

        delete.assert();
        assert_eq!(like.liked, Some(true));
        assert_eq!(like.likes_count, Some(4));
    }
}
