use std::sync::Arc;

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::auth::{AnonymousAuthProvider, AuthMaterial, AuthProvider, UserAuthProvider};
use crate::config::SessionOptions;
use crate::error::{Error, Result};
use crate::http::RestExecutor;
use crate::models::OperationData;
use crate::webservice::{SoapWebService, WebServiceType};

use super::Protocol;

/// A SOAP connection to the server.
///
/// SOAP has no login endpoint: auth material is attached to every port call
/// individually, so the session carries the provider's static credentials
/// and no token state machine.
pub struct SoapSession {
    instance_id: Uuid,
    base_url: Url,
    executor: RestExecutor,
    auth: Arc<AuthMaterial>,
}

impl SoapSession {
    /// Connect to `base_url` with the SOAP transport. The URL is validated
    /// before any network activity.
    pub fn connect(
        base_url: &str,
        options: SessionOptions,
        provider: Option<Arc<dyn AuthProvider>>,
    ) -> Result<Self> {
        let (base, credentials) = super::normalize_base_url(base_url, Protocol::Soap)?;
        let provider: Arc<dyn AuthProvider> = match (provider, credentials) {
            (Some(provider), _) => provider,
            (None, Some(credentials)) => Arc::new(UserAuthProvider::new(
                credentials.username,
                credentials.password,
            )),
            (None, None) => Arc::new(AnonymousAuthProvider),
        };
        let session = Self {
            instance_id: Uuid::new_v4(),
            base_url: base,
            executor: RestExecutor::new(Protocol::Soap.data_format(), options),
            auth: provider.static_material(),
        };
        debug!("created SOAP session {}", session.instance_id);
        Ok(session)
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Auth material attached to every port call of this session.
    pub fn auth_material(&self) -> Arc<AuthMaterial> {
        Arc::clone(&self.auth)
    }

    /// Build a request URL under the session's `soap/` base path.
    pub fn build_url(&self, sub_path: &str) -> Result<Url> {
        self.base_url
            .join(sub_path)
            .map_err(|e| Error::InvalidUrl(format!("{sub_path}: {e}")))
    }

    pub(crate) fn executor(&self) -> &RestExecutor {
        &self.executor
    }

    /// Webservice bound to this session for the given operation type.
    pub fn webservice(&self, ws_type: WebServiceType) -> SoapWebService<'_> {
        SoapWebService::new(self, ws_type)
    }

    /// Webservice whose type is detected from the populated operation block
    /// of the given envelope.
    pub fn webservice_from_operation(
        &self,
        operation: OperationData,
    ) -> Result<SoapWebService<'_>> {
        let ws_type = WebServiceType::from_operation_data(&operation)?;
        let mut service = self.webservice(ws_type);
        service.set_operation(operation)?;
        Ok(service)
    }

    /// Release the transport client. SOAP sessions hold no server-side
    /// state, so there is nothing to log out from.
    pub fn close(self) {
        debug!("closed SOAP session {}", self.instance_id);
    }
}
