//! HTTP bodies for signup and login.

use serde::{Deserialize, Serialize};

use crate::dto::PlayerData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub handle: String,
    pub password: String,
    #[serde(default)]
    pub access_code: Option<String>,
    pub server_code: String,
}

/// `{success, token, user}` on success, `{success: false, error}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PlayerData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    pub fn ok(token: impl Into<String>, user: PlayerData) -> Self {
        Self {
            success: true,
            token: Some(token.into()),
            user: Some(user),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            user: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_code_is_optional() {
        let req: AuthRequest = serde_json::from_str(
            r#"{"handle":"wanderer","password":"secret1","serverCode":"alpha"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.access_code, None);
        assert_eq!(req.server_code, "alpha");
    }

    #[test]
    fn failure_carries_only_the_error() {
        let json = serde_json::to_value(AuthResponse::failed("access denied")).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "access denied");
        assert!(json.get("token").is_none());
    }
}
