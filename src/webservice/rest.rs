use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use crate::documents::{DocumentManager, RestDocument};
use crate::error::{Error, Result};
use crate::http::RequestBody;
use crate::models::{DocumentFile, OperationData};
use crate::session::rest::SessionCore;

use super::WebServiceType;

/// A webservice invocation bound to a REST session.
///
/// Holds the operation parameter envelope; `process` posts it against a
/// source document and synchronizes the produced descriptor back into the
/// session's document manager.
pub struct RestWebService {
    core: Arc<SessionCore>,
    manager: DocumentManager,
    ws_type: WebServiceType,
    operation: OperationData,
}

impl std::fmt::Debug for RestWebService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestWebService")
            .field("ws_type", &self.ws_type)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

impl RestWebService {
    pub(crate) fn new(
        core: Arc<SessionCore>,
        manager: DocumentManager,
        ws_type: WebServiceType,
    ) -> Self {
        Self {
            core,
            manager,
            ws_type,
            operation: ws_type.default_operation(),
        }
    }

    pub fn webservice_type(&self) -> WebServiceType {
        self.ws_type
    }

    pub fn operation(&self) -> &OperationData {
        &self.operation
    }

    pub fn operation_mut(&mut self) -> &mut OperationData {
        &mut self.operation
    }

    /// Replace the whole operation envelope. The populated operation block
    /// must match this webservice's type.
    pub fn set_operation(&mut self, operation: OperationData) -> Result<()> {
        let detected = WebServiceType::from_operation_data(&operation)?;
        if detected != self.ws_type {
            return Err(Error::UnknownWebService(format!(
                "operation data targets '{detected}' but this webservice is '{}'",
                self.ws_type
            )));
        }
        self.operation = operation;
        Ok(())
    }

    /// Execute the operation against a source document.
    ///
    /// The result descriptor returned by the server is synchronized into
    /// the document manager; the returned handle is tracked like any other
    /// document of the session.
    pub async fn process(&self, document: &RestDocument) -> Result<Arc<RestDocument>> {
        let url = self.core.build_url(
            &format!("{}/{}", self.ws_type.rest_endpoint(), document.document_id()),
            &[],
        )?;
        let material = self.core.request_material().await?;
        let body = serde_json::to_value(&self.operation)?;
        let descriptor: Option<DocumentFile> = self
            .core
            .executor()
            .request(Method::POST, url, &material, RequestBody::Json(body))
            .await?;
        let descriptor = descriptor.ok_or_else(|| {
            Error::Codec(format!(
                "webservice '{}' returned no document descriptor",
                self.ws_type
            ))
        })?;
        info!(
            "webservice '{}' produced document {}",
            self.ws_type, descriptor.document_id
        );
        self.manager.synchronize_descriptor(descriptor).await
    }
}
