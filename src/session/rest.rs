use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::Method;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::admin::AdministrationManager;
use crate::auth::{AnonymousAuthProvider, AuthMaterial, AuthProvider, SessionToken, UserAuthProvider};
use crate::config::SessionOptions;
use crate::documents::DocumentManager;
use crate::error::{Error, Result};
use crate::http::{RequestBody, RestExecutor};
use crate::models::{TokenResponse, UserInfo};
use crate::webservice::{RestWebService, WebServiceType};

use super::Protocol;

/// Shared per-session state: transport, base URL and the auth slot.
///
/// Sub-managers (documents, administration, webservice instances) hold an
/// `Arc` to this core so they can issue requests under the session's
/// current auth material.
pub(crate) struct SessionCore {
    instance_id: Uuid,
    base_url: Url,
    executor: RestExecutor,
    /// Current auth material. Replaced as a whole `Arc` so concurrent
    /// readers always observe a complete value.
    auth: RwLock<Arc<AuthMaterial>>,
    /// Serializes the proactive token exchange so concurrent requests
    /// cannot both present the same expiring token to the refresh endpoint.
    refresh_guard: tokio::sync::Mutex<()>,
    skew: Duration,
}

impl SessionCore {
    pub(crate) fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub(crate) fn executor(&self) -> &RestExecutor {
        &self.executor
    }

    /// Build a request URL under the session's transport base path.
    pub(crate) fn build_url(&self, sub_path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(sub_path)
            .map_err(|e| Error::InvalidUrl(format!("{sub_path}: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Snapshot of the current auth material.
    pub(crate) fn auth_material(&self) -> Arc<AuthMaterial> {
        Arc::clone(&self.auth.read().unwrap())
    }

    /// Replace the auth material wholesale.
    pub(crate) fn swap_auth(&self, material: Arc<AuthMaterial>) {
        *self.auth.write().unwrap() = material;
    }

    /// Material to attach to the next request. A session token within its
    /// skew window is exchanged for a renewed one first; every other kind
    /// is used as-is.
    ///
    /// The exchange is double-checked under the refresh guard: exactly one
    /// caller performs it, late callers re-read the slot and pick up the
    /// winner's token instead of presenting the superseded one.
    pub(crate) async fn request_material(&self) -> Result<Arc<AuthMaterial>> {
        let current = self.auth_material();
        if !current.is_expiring(self.skew) {
            return Ok(current);
        }
        let _guard = self.refresh_guard.lock().await;
        let current = self.auth_material();
        if let AuthMaterial::SessionToken(token) = &*current {
            if token.is_expiring(self.skew) {
                info!("session token within skew window, refreshing before request");
                let renewed = self.exchange_token(token).await?;
                let material = Arc::new(AuthMaterial::SessionToken(renewed));
                self.swap_auth(Arc::clone(&material));
                return Ok(material);
            }
        }
        Ok(current)
    }

    /// Obtain a fresh session token from the login endpoint, presenting the
    /// given material (typically basic credentials).
    pub(crate) async fn fetch_token(&self, material: &AuthMaterial) -> Result<SessionToken> {
        let url = self.build_url("authentication/user/login/", &[])?;
        let response: Option<TokenResponse> = self
            .executor
            .request(Method::GET, url, material, RequestBody::None)
            .await?;
        let response = response
            .ok_or_else(|| Error::Authentication("login endpoint returned no token".into()))?;
        Ok(SessionToken::from_response(response))
    }

    /// Exchange a session token for a renewed one via the refresh endpoint.
    pub(crate) async fn exchange_token(&self, token: &SessionToken) -> Result<SessionToken> {
        let url = self.build_url("authentication/user/refresh/", &[])?;
        let material = AuthMaterial::SessionToken(token.clone());
        let response: Option<TokenResponse> = self
            .executor
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        let response = response
            .ok_or_else(|| Error::Authentication("refresh endpoint returned no token".into()))?;
        Ok(SessionToken::from_response(response))
    }

    async fn fetch_user_info(&self) -> Result<UserInfo> {
        let url = self.build_url("authentication/user/info/", &[])?;
        let material = self.request_material().await?;
        let info: Option<UserInfo> = self
            .executor
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        Ok(info.unwrap_or_default())
    }

    async fn logout(&self) -> Result<()> {
        let url = self.build_url("authentication/user/logout/", &[])?;
        let material = self.auth_material();
        let _: Option<serde_json::Value> = self
            .executor
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        Ok(())
    }
}

/// A stateful REST connection to the server.
///
/// Owns the transport client, the document manager and the administration
/// manager. All calls are plain async round trips on the caller's task; the
/// session spawns nothing of its own.
pub struct RestSession {
    core: Arc<SessionCore>,
    provider: Arc<dyn AuthProvider>,
    documents: DocumentManager,
    admin: AdministrationManager,
    user_info: RwLock<Option<UserInfo>>,
}

impl std::fmt::Debug for RestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSession").finish_non_exhaustive()
    }
}

impl RestSession {
    /// Connect to `base_url` with the REST transport.
    ///
    /// The URL is validated here, before any network activity. Credentials
    /// embedded in the URL's user-info part become a
    /// [`UserAuthProvider`] when no explicit provider is given; with
    /// neither, the session starts anonymous.
    pub fn connect(
        base_url: &str,
        options: SessionOptions,
        provider: Option<Arc<dyn AuthProvider>>,
    ) -> Result<Self> {
        let (base, credentials) = super::normalize_base_url(base_url, Protocol::Rest)?;
        let provider: Arc<dyn AuthProvider> = match (provider, credentials) {
            (Some(provider), _) => provider,
            (None, Some(credentials)) => Arc::new(UserAuthProvider::new(
                credentials.username,
                credentials.password,
            )),
            (None, None) => Arc::new(AnonymousAuthProvider),
        };
        let skew = options.token_refresh_skew();
        let core = Arc::new(SessionCore {
            instance_id: Uuid::new_v4(),
            base_url: base,
            executor: RestExecutor::new(Protocol::Rest.data_format(), options),
            auth: RwLock::new(Arc::new(AuthMaterial::Anonymous)),
            refresh_guard: tokio::sync::Mutex::new(()),
            skew,
        });
        debug!("created REST session {}", core.instance_id());
        Ok(Self {
            documents: DocumentManager::new(Arc::clone(&core)),
            admin: AdministrationManager::new(Arc::clone(&core)),
            core,
            provider,
            user_info: RwLock::new(None),
        })
    }

    /// Unique id of this session instance, used by auth providers to detect
    /// that they are being reused across sessions.
    pub fn instance_id(&self) -> Uuid {
        self.core.instance_id()
    }

    /// Log in via the session's auth provider and fetch the current user's
    /// descriptor.
    pub async fn login(&self) -> Result<UserInfo> {
        let material = self.provider.provide(self).await?;
        self.core.swap_auth(material);
        let info = self.core.fetch_user_info().await?;
        *self.user_info.write().unwrap() = Some(info.clone());
        info!("logged in as '{}'", info.user_name);
        Ok(info)
    }

    /// Adopt an already issued session token instead of logging in, still
    /// followed by the user info fetch.
    pub async fn login_with_token(&self, token: SessionToken) -> Result<UserInfo> {
        self.core
            .swap_auth(Arc::new(AuthMaterial::SessionToken(token)));
        let info = self.core.fetch_user_info().await?;
        *self.user_info.write().unwrap() = Some(info.clone());
        info!("adopted session token for '{}'", info.user_name);
        Ok(info)
    }

    /// Exchange the current session token for a renewed one.
    ///
    /// Valid only while the session holds a server-issued session token;
    /// any other auth material kind fails with
    /// [`Error::ForbiddenTokenRefresh`] without touching the network.
    pub async fn refresh(&self) -> Result<()> {
        let current = self.core.auth_material();
        match &*current {
            AuthMaterial::SessionToken(token) => {
                let renewed = self.core.exchange_token(token).await?;
                self.core
                    .swap_auth(Arc::new(AuthMaterial::SessionToken(renewed)));
                Ok(())
            }
            _ => Err(Error::ForbiddenTokenRefresh),
        }
    }

    /// Current auth material snapshot.
    pub fn auth_material(&self) -> Arc<AuthMaterial> {
        self.core.auth_material()
    }

    /// The user descriptor cached by the last login, if any.
    pub fn user_info(&self) -> Option<UserInfo> {
        self.user_info.read().unwrap().clone()
    }

    /// Build a request URL under the session's `rest/` base path.
    pub fn build_url(&self, sub_path: &str, params: &[(&str, &str)]) -> Result<Url> {
        self.core.build_url(sub_path, params)
    }

    /// Document registry and upload/download operations of this session.
    pub fn documents(&self) -> &DocumentManager {
        &self.documents
    }

    /// Administration endpoints (REST only).
    pub fn admin(&self) -> &AdministrationManager {
        &self.admin
    }

    /// Webservice bound to this session for the given operation type.
    pub fn webservice(&self, ws_type: WebServiceType) -> RestWebService {
        RestWebService::new(Arc::clone(&self.core), self.documents.clone(), ws_type)
    }

    /// Webservice whose type is detected from the populated operation block
    /// of the given envelope.
    pub fn webservice_from_operation(
        &self,
        operation: crate::models::OperationData,
    ) -> Result<RestWebService> {
        let ws_type = WebServiceType::from_operation_data(&operation)?;
        let mut service = self.webservice(ws_type);
        service.set_operation(operation)?;
        Ok(service)
    }

    pub(crate) async fn fetch_token(&self, material: &AuthMaterial) -> Result<SessionToken> {
        self.core.fetch_token(material).await
    }

    pub(crate) async fn exchange_token(&self, token: &SessionToken) -> Result<SessionToken> {
        self.core.exchange_token(token).await
    }

    /// Terminate the session: best-effort logout when a session token is
    /// held, then release the transport client. Safe to call without ever
    /// having logged in; a failed logout is reported after the client has
    /// been released regardless.
    pub async fn close(self) -> Result<()> {
        let result = match &*self.core.auth_material() {
            AuthMaterial::SessionToken(_) => match self.core.logout().await {
                Ok(()) => Ok(()),
                Err(err) => {
                    warn!("logout during session close failed: {err}");
                    Err(Error::Io(std::io::Error::other(format!(
                        "logout failed during session close: {err}"
                    ))))
                }
            },
            _ => Ok(()),
        };
        // Dropping `self` releases the transport client and its pool.
        result
    }
}
