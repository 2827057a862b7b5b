use std::time::Duration;

use base64ct::{Base64, Encoding};
use chrono::{DateTime, Utc};

use crate::models::TokenResponse;

/// Server-issued session token with its expiry bookkeeping.
///
/// Tokens are never mutated after creation; a refresh produces a whole new
/// token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    token: String,
    issued_at: DateTime<Utc>,
    expires_in: i64,
}

impl SessionToken {
    pub fn new(token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            token: token.into(),
            issued_at: Utc::now(),
            expires_in,
        }
    }

    pub(crate) fn from_response(response: TokenResponse) -> Self {
        Self::new(response.token, response.expires_in)
    }

    #[cfg(test)]
    pub(crate) fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    pub fn value(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + chrono::Duration::seconds(self.expires_in)
    }

    /// Whether the token is within `skew` of its expiry (or past it) and
    /// should be exchanged before the next request.
    pub fn is_expiring(&self, skew: Duration) -> bool {
        let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() >= self.expires_at() - skew
    }
}

/// Authorization state presentable to the server.
///
/// Replaced wholesale on every change (login, refresh, session change) so
/// concurrent readers observe either the previous or the next complete
/// value, never a partial update.
#[derive(Debug, Clone)]
pub enum AuthMaterial {
    /// No credentials attached to requests.
    Anonymous,
    /// HTTP basic credentials, attached to every request.
    Basic { username: String, password: String },
    /// Server-issued session token, renewable via the refresh endpoint.
    SessionToken(SessionToken),
    /// Externally minted bearer token (e.g. OAuth2). Opaque to this library
    /// and refreshed by its issuer, never by the session.
    Bearer(String),
}

impl AuthMaterial {
    /// Value for the `Authorization` header, or `None` for anonymous access.
    pub fn authorization_value(&self) -> Option<String> {
        match self {
            AuthMaterial::Anonymous => None,
            AuthMaterial::Basic { username, password } => {
                let encoded = Base64::encode_string(format!("{username}:{password}").as_bytes());
                Some(format!("Basic {encoded}"))
            }
            AuthMaterial::SessionToken(token) => Some(format!("Bearer {}", token.value())),
            AuthMaterial::Bearer(token) => Some(format!("Bearer {token}")),
        }
    }

    /// Whether this material is within `skew` of expiring. Only session
    /// tokens carry an expiry; every other kind never expires from the
    /// session's point of view.
    pub fn is_expiring(&self, skew: Duration) -> bool {
        match self {
            AuthMaterial::SessionToken(token) => token.is_expiring(skew),
            _ => false,
        }
    }

    /// Whether this library may refresh the material against the server.
    pub fn is_refreshable(&self) -> bool {
        matches!(self, AuthMaterial::SessionToken(_))
    }
}
