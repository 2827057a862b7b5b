use serde::{Deserialize, Serialize};

/// Session token as returned by the login and refresh endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenResponse {
    pub token: String,
    /// Token lifetime in seconds, measured from the moment of issue.
    pub expires_in: i64,
}

/// Username/password pair, either given explicitly or extracted from the
/// user-info part of the server URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

impl UserCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Descriptor of the currently authenticated user, fetched after login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub user_name: String,
    pub authenticated: bool,
    pub is_admin: bool,
    pub is_user: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}
