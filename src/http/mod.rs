//! Request execution against the server's REST interface.
//!
//! One executor per session: it owns the lazily built HTTP client, resolves
//! accept and authorization headers per request and maps failure responses
//! into the typed error taxonomy.

use once_cell::sync::OnceCell;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use url::Url;

use crate::auth::AuthMaterial;
use crate::config::SessionOptions;
use crate::error::{Error, Result};
use crate::models::FaultPayload;

/// Wire format of a session, derived from its protocol and never chosen
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Xml,
}

impl DataFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DataFormat::Json => "application/json",
            DataFormat::Xml => "application/xml",
        }
    }

    /// Loose content-type match: parameters like charset are ignored and
    /// `text/xml` counts as XML.
    pub(crate) fn matches(&self, content_type: &str) -> bool {
        match self {
            DataFormat::Json => content_type.contains("json"),
            DataFormat::Xml => content_type.contains("xml"),
        }
    }
}

/// Request body variants the executor knows how to send.
pub(crate) enum RequestBody {
    None,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Executes single requests for one session.
///
/// The client (and its connection pool) is built on first use and owned
/// exclusively by this executor; it is never shared across sessions.
pub(crate) struct RestExecutor {
    format: DataFormat,
    options: SessionOptions,
    client: OnceCell<Client>,
}

impl RestExecutor {
    pub(crate) fn new(format: DataFormat, options: SessionOptions) -> Self {
        Self {
            format,
            options,
            client: OnceCell::new(),
        }
    }

    /// The underlying HTTP client, built lazily from the session options.
    pub(crate) fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.options.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(timeout) = self.options.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(proxy) = &self.options.proxy {
                builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
            }
            if let Some(tls) = &self.options.tls {
                if tls.accept_invalid_certs {
                    builder = builder.danger_accept_invalid_certs(true);
                }
                if let Some(pem) = &tls.root_certificate_pem {
                    let certificate = reqwest::Certificate::from_pem(pem)?;
                    builder = builder.add_root_certificate(certificate);
                }
            }
            builder.build().map_err(Error::from)
        })
    }

    /// Send a request and return the status-checked response.
    ///
    /// A non-success status with a structured fault body (content type
    /// matching the session format, non-zero error code) becomes a server
    /// business error carrying the server's own code; anything else becomes
    /// an HTTP failure with the raw status and body text.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        auth: &AuthMaterial,
        body: RequestBody,
    ) -> Result<reqwest::Response> {
        let mut builder = self
            .client()?
            .request(method.clone(), url.clone())
            .header(ACCEPT, self.format.mime_type());
        if let Some(value) = auth.authorization_value() {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder = match body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        debug!("{} {}", method, url);
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let content_type = response_content_type(&response);
        let body_text = response.text().await.unwrap_or_default();
        if self.format.matches(&content_type) {
            if let Some(fault) = parse_fault(self.format, &body_text) {
                if fault.is_error() {
                    warn!(
                        "server reported error {} for {} {}",
                        fault.error_code, method, url
                    );
                    return Err(Error::Server {
                        code: fault.error_code,
                        message: fault.error_message,
                        stack_trace: Some(fault.stack_trace),
                    });
                }
            }
        }
        Err(Error::Http {
            status: status.as_u16(),
            body: body_text,
        })
    }

    /// Execute a request and parse the response body in the session format.
    ///
    /// Returns `Ok(None)` when the response declares a content type that
    /// does not match the expected format instead of attempting a
    /// mismatched parse. Known trade-off: a misconfigured server degrades
    /// to "no content" here rather than failing loudly.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        auth: &AuthMaterial,
        body: RequestBody,
    ) -> Result<Option<T>> {
        let response = self.send(method, url, auth, body).await?;
        let content_type = response_content_type(&response);
        if !self.format.matches(&content_type) {
            debug!(
                "response content type '{}' does not match session format, returning no content",
                content_type
            );
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let value = match self.format {
            DataFormat::Json => serde_json::from_slice(&bytes)?,
            DataFormat::Xml => {
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::Codec(format!("response is not valid UTF-8: {e}")))?;
                quick_xml::de::from_str(text).map_err(|e| Error::Codec(e.to_string()))?
            }
        };
        Ok(Some(value))
    }

    /// Stream the raw response body into `sink` without parsing it.
    pub(crate) async fn download<W>(
        &self,
        method: Method,
        url: Url,
        auth: &AuthMaterial,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut response = self.send(method, url, auth, RequestBody::None).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }
}

fn response_content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn parse_fault(format: DataFormat, body: &str) -> Option<FaultPayload> {
    match format {
        DataFormat::Json => serde_json::from_str(body).ok(),
        DataFormat::Xml => quick_xml::de::from_str(body).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_matching_ignores_parameters() {
        assert!(DataFormat::Json.matches("application/json; charset=utf-8"));
        assert!(DataFormat::Xml.matches("text/xml"));
        assert!(!DataFormat::Json.matches("text/html"));
        assert!(!DataFormat::Xml.matches("application/octet-stream"));
    }

    #[test]
    fn json_fault_parses_with_server_code() {
        let body = r#"{"errorCode": -5008, "errorMessage": "wrong password", "stackTrace": ""}"#;
        let fault = parse_fault(DataFormat::Json, body).unwrap();
        assert_eq!(fault.error_code, -5008);
        assert!(fault.is_error());
    }

    #[test]
    fn zero_code_fault_is_not_an_error() {
        let body = r#"{"errorCode": 0, "errorMessage": "", "stackTrace": ""}"#;
        let fault = parse_fault(DataFormat::Json, body).unwrap();
        assert!(!fault.is_error());
    }
}
