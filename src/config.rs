use std::time::Duration;

use url::Url;

/// Default tolerance window subtracted from a session token's expiry before
/// a proactive refresh is triggered.
pub const DEFAULT_TOKEN_REFRESH_SKEW: Duration = Duration::from_secs(5);

/// TLS settings passed through to the underlying HTTP client.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Accept self-signed or otherwise invalid server certificates. Only
    /// meant for test servers.
    pub accept_invalid_certs: bool,
    /// Additional trusted root certificate in PEM form.
    pub root_certificate_pem: Option<Vec<u8>>,
}

/// Connection settings for a session.
///
/// Everything here is a pass-through to the HTTP client: the session does
/// not implement its own timeouts, retries or backoff.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub connect_timeout: Option<Duration>,
    /// Total request timeout (connect + transfer). Unset means the request
    /// runs until the transport gives up on its own.
    pub timeout: Option<Duration>,
    pub proxy: Option<Url>,
    pub tls: Option<TlsOptions>,
    /// Skew window for proactive session token refresh.
    pub token_refresh_skew: Option<Duration>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_token_refresh_skew(mut self, skew: Duration) -> Self {
        self.token_refresh_skew = Some(skew);
        self
    }

    pub(crate) fn token_refresh_skew(&self) -> Duration {
        self.token_refresh_skew.unwrap_or(DEFAULT_TOKEN_REFRESH_SKEW)
    }
}
