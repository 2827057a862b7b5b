use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DEFAULT_TOKEN_REFRESH_SKEW;
use crate::error::{Error, Result};
use crate::session::RestSession;

use super::{AuthMaterial, SessionToken};

/// Strategy producing [`AuthMaterial`] for a session.
///
/// A provider serves at most one session at a time: when asked to serve a
/// different session instance than the one it last served, it treats the
/// prior session as expired and authenticates from scratch. Calling
/// `provide` while the held material is still valid is cheap and does not
/// touch the network.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Produce material for `session`, logging in or refreshing as needed.
    async fn provide(&self, session: &RestSession) -> Result<Arc<AuthMaterial>>;

    /// Material for transports without a login endpoint (SOAP), where
    /// credentials are attached per request instead of being exchanged for
    /// a token.
    fn static_material(&self) -> Arc<AuthMaterial>;
}

/// Provider for unauthenticated access.
#[derive(Debug, Default)]
pub struct AnonymousAuthProvider;

#[async_trait]
impl AuthProvider for AnonymousAuthProvider {
    async fn provide(&self, _session: &RestSession) -> Result<Arc<AuthMaterial>> {
        Ok(self.static_material())
    }

    fn static_material(&self) -> Arc<AuthMaterial> {
        Arc::new(AuthMaterial::Anonymous)
    }
}

/// Provider wrapping an externally minted bearer token (e.g. OAuth2).
///
/// The token is opaque to this library: it is attached as-is and never
/// refreshed here. Callers exchange it with their identity provider and
/// construct a new session provider when it rotates.
pub struct TokenAuthProvider {
    token: String,
}

impl TokenAuthProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn provide(&self, _session: &RestSession) -> Result<Arc<AuthMaterial>> {
        Ok(self.static_material())
    }

    fn static_material(&self) -> Arc<AuthMaterial> {
        Arc::new(AuthMaterial::Bearer(self.token.clone()))
    }
}

struct UserProviderState {
    /// Instance id of the session this provider last authenticated for.
    session_id: Option<Uuid>,
    material: Option<Arc<AuthMaterial>>,
}

/// Username/password provider implementing the login/refresh state machine
/// for REST session tokens.
///
/// The provider state sits behind a single async mutex acting as the
/// "updating" guard: concurrent `provide` calls on one provider instance
/// serialize, so exactly one login or refresh is in flight at a time and
/// late callers observe the material produced by the winner.
pub struct UserAuthProvider {
    username: String,
    password: String,
    skew: Duration,
    state: Mutex<UserProviderState>,
}

impl UserAuthProvider {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            skew: DEFAULT_TOKEN_REFRESH_SKEW,
            state: Mutex::new(UserProviderState {
                session_id: None,
                material: None,
            }),
        }
    }

    /// Override the refresh skew window (default 5 seconds).
    pub fn with_token_refresh_skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    fn login_material(&self) -> AuthMaterial {
        AuthMaterial::Basic {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Keeps server business errors (wrong password and friends) verbatim while
/// wrapping transport and codec failures as authentication failures.
fn as_auth_error(context: &str, err: Error) -> Error {
    match err {
        err @ Error::Server { .. } => err,
        other => Error::Authentication(format!("{context}: {other}")),
    }
}

#[async_trait]
impl AuthProvider for UserAuthProvider {
    async fn provide(&self, session: &RestSession) -> Result<Arc<AuthMaterial>> {
        let mut state = self.state.lock().await;

        let holds_token_for_session = state.session_id == Some(session.instance_id())
            && matches!(
                state.material.as_deref(),
                Some(AuthMaterial::SessionToken(_))
            );

        if !holds_token_for_session {
            // Either the first call, a different session instance than the
            // one last served, or non-token material: authenticate fresh.
            if state.session_id.is_some() && state.session_id != Some(session.instance_id()) {
                info!("auth provider switching to a new session, prior session treated as expired");
            }
            let token = session
                .fetch_token(&self.login_material())
                .await
                .map_err(|e| as_auth_error("login failed", e))?;
            let material = Arc::new(AuthMaterial::SessionToken(token));
            state.session_id = Some(session.instance_id());
            state.material = Some(Arc::clone(&material));
            debug!("auth provider logged in");
            return Ok(material);
        }

        // The session's auth slot is authoritative: a per-request refresh
        // may have renewed the token since this provider last served it, so
        // adopt the slot's token before deciding whether to exchange.
        let session_material = session.auth_material();
        if matches!(&*session_material, AuthMaterial::SessionToken(_)) {
            state.material = Some(Arc::clone(&session_material));
        }

        let current = state
            .material
            .clone()
            .unwrap_or_else(|| Arc::new(AuthMaterial::Anonymous));

        if let AuthMaterial::SessionToken(token) = &*current {
            if token.is_expiring(self.skew) {
                let renewed: SessionToken = session
                    .exchange_token(token)
                    .await
                    .map_err(|e| as_auth_error("token refresh failed", e))?;
                let material = Arc::new(AuthMaterial::SessionToken(renewed));
                state.material = Some(Arc::clone(&material));
                debug!("auth provider refreshed session token");
                return Ok(material);
            }
        }

        Ok(current)
    }

    fn static_material(&self) -> Arc<AuthMaterial> {
        Arc::new(self.login_material())
    }
}
