//! Account endpoints: register, login, logout, identity.

use crate::gateway::{ApiRequest, HttpGateway};
use humloop_core::Result;
use humloop_core::session::UserIdentity;
use serde::Deserialize;
use serde_json::json;

/// Token pair issued by `accounts/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the account endpoints of the REST backend.
#[derive(Clone)]
pub struct AccountsApi {
    gateway: HttpGateway,
}

impl AccountsApi {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    pub async fn register(&self, username: &str, password: &str, nickname: &str) -> Result<RegisterResponse> {
        let request = ApiRequest::post("accounts/register/")
            .json(json!({
                "username": username,
                "password": password,
                "nickname": nickname,
            }))
            .public();
        self.gateway.send_json(request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginTokens> {
        let request = ApiRequest::post("accounts/login/")
            .json(json!({ "username": username, "password": password }))
            .public();
        self.gateway.send_json(request).await
    }

    /// Asks the backend to revoke `refresh_token`.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let request = ApiRequest::post("accounts/logout/").json(json!({ "refresh_token": refresh_token }));
        self.gateway.send_empty(request).await
    }

    /// Identity of the user owning the current access token.
    pub async fn current_user(&self) -> Result<UserIdentity> {
        self.gateway.send_json(ApiRequest::get("user/")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use humloop_core::session::{InMemoryTokenStore, SessionStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn api(server: &MockServer) -> (AccountsApi, Arc<SessionStore>) {
        let session = Arc::new(SessionStore::new(Arc::new(InMemoryTokenStore::new())));
        let gateway = HttpGateway::new(server.url("/api"), session.clone(), Duration::from_secs(5)).unwrap();
        (AccountsApi::new(gateway), session)
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/accounts/login/")
                .json_body(json!({"username": "hum", "password": "Abcd123!"}));
            then.status(200).json_body(json!({"access": "a", "refresh": "r"}));
        });

        let (api, _) = api(&server);
        let tokens = api.login("hum", "Abcd123!").await.unwrap();

        assert_eq!(tokens, LoginTokens { access: "a".into(), refresh: "r".into() });
        mock.assert();
    }

    #[tokio::test]
    async fn test_logout_sends_refresh_token_with_bearer() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/accounts/logout/")
                .header("authorization", "Bearer a")
                .json_body(json!({"refresh_token": "r"}));
            then.status(205);
        });

        let (api, session) = api(&server);
        session.store_tokens("a".into(), "r".into()).await.unwrap();
        api.logout("r").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_register_payload() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/accounts/register/")
                .json_body(json!({"username": "hum", "password": "Abcd123!", "nickname": "Hummer"}));
            then.status(201).json_body(json!({"message": "registered"}));
        });

        let (api, _) = api(&server);
        let response = api.register("hum", "Abcd123!", "Hummer").await.unwrap();
        assert_eq!(response.message.as_deref(), Some("registered"));
        mock.assert();
    }
}
