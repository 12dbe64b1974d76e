//! Session domain model.

use serde::{Deserialize, Serialize};

/// Identity of the logged-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    /// Nickname chosen at registration; falls back to the username.
    #[serde(default, alias = "nickname", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// The client's notion of the currently authenticated user and their tokens.
///
/// Invariant: `user` is only ever set while `access_token` is held. The
/// [`SessionStore`](super::SessionStore) enforces this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserIdentity>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Durable layout of the token pair.
///
/// Two string entries under fixed keys; written and cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_tokens_use_fixed_keys() {
        let tokens = StoredTokens::new("a", Some("r".into()));
        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }

    #[test]
    fn test_user_identity_accepts_nickname_alias() {
        let user: UserIdentity =
            serde_json::from_str(r#"{"id": 3, "username": "hum", "nickname": "Hummer", "email": "x@y.z"}"#)
                .unwrap();
        assert_eq!(user.display_name(), "Hummer");

        let bare: UserIdentity = serde_json::from_str(r#"{"id": 4, "username": "loop"}"#).unwrap();
        assert_eq!(bare.display_name(), "loop");
    }

    #[test]
    fn test_default_session_is_empty() {
        let session = Session::default();
        assert!(session.is_empty());
        assert!(!session.is_authenticated());
    }
}
