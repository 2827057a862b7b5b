use base64ct::{Base64, Encoding};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};

use crate::documents::SoapDocument;
use crate::error::{Error, Result};
use crate::models::OperationData;
use crate::session::SoapSession;

use super::WebServiceType;

/// Payload attached to an execute call besides the operation envelope.
enum SoapPayload {
    /// Base64-inlined source document content.
    Data(String),
    /// Source URL hint for document-less operations.
    SourceUrl(String),
}

/// A webservice invocation bound to a SOAP session.
///
/// Builds the SOAP envelope (operation data plus source payload), posts it
/// to the port address and interprets the response: a fault becomes a
/// server-side error, anything else that goes wrong becomes a client-side
/// SOAP execution error. No failure escapes `process` unwrapped.
pub struct SoapWebService<'a> {
    session: &'a SoapSession,
    ws_type: WebServiceType,
    operation: OperationData,
}

impl<'a> SoapWebService<'a> {
    pub(crate) fn new(session: &'a SoapSession, ws_type: WebServiceType) -> Self {
        Self {
            session,
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

    /// Execute the operation. `document` may be `None` only for
    /// document-less operations (URL conversion), which take their source
    /// from the operation parameters instead.
    pub async fn process(&self, document: Option<&SoapDocument>) -> Result<SoapDocument> {
        let payload = self.resolve_payload(document).await?;
        let envelope = build_envelope(self.ws_type, &self.operation, &payload)?;
        let url = self.session.build_url(self.ws_type.rest_endpoint())?;

        let client = self.session.executor().client()?;
        let mut builder = client
            .post(url.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", self.ws_type.soap_action()))
            .body(envelope);
        if let Some(value) = self.session.auth_material().authorization_value() {
            builder = builder.header(AUTHORIZATION, value);
        }

        debug!("POST {} ({} port)", url, self.ws_type);
        let response = builder
            .send()
            .await
            .map_err(|e| Error::SoapExecution(format!("port call failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::SoapExecution(format!("reading port response failed: {e}")))?;

        let scan = scan_envelope(&body)?;
        if scan.fault {
            return Err(scan.into_server_error());
        }
        if !status.is_success() {
            return Err(Error::SoapExecution(format!(
                "port returned status {}: {}",
                status.as_u16(),
                body
            )));
        }
        let data = scan.data.ok_or_else(|| {
            Error::SoapExecution("port response carries no result data".into())
        })?;
        let bytes = Base64::decode_vec(data.trim())
            .map_err(|e| Error::SoapExecution(format!("malformed result payload: {e}")))?;
        info!(
            "webservice '{}' returned {} result bytes",
            self.ws_type,
            bytes.len()
        );
        Ok(SoapDocument::from_result(bytes))
    }

    async fn resolve_payload(&self, document: Option<&SoapDocument>) -> Result<SoapPayload> {
        if let Some(document) = document {
            if let Some(url) = document.source_url() {
                return Ok(SoapPayload::SourceUrl(url.to_string()));
            }
            let bytes = document.data().await?;
            return Ok(SoapPayload::Data(Base64::encode_string(&bytes)));
        }
        match self.ws_type {
            WebServiceType::UrlConverter => {
                let url = self
                    .operation
                    .url_converter
                    .as_ref()
                    .map(|op| op.url.clone())
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        Error::InvalidSource("URL conversion requires a source URL".into())
                    })?;
                Ok(SoapPayload::SourceUrl(url))
            }
            _ => Err(Error::InvalidSource(format!(
                "webservice '{}' requires a source document",
                self.ws_type
            ))),
        }
    }
}

fn build_envelope(
    ws_type: WebServiceType,
    operation: &OperationData,
    payload: &SoapPayload,
) -> Result<String> {
    let operation_xml = quick_xml::se::to_string_with_root("operation", operation)?;
    let payload_xml = match payload {
        SoapPayload::Data(encoded) => format!("<data>{encoded}</data>"),
        SoapPayload::SourceUrl(url) => {
            format!("<sourceUrl>{}</sourceUrl>", quick_xml::escape::escape(url.as_str()))
        }
    };
    Ok(format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soap:Body>",
            r#"<execute xmlns="{namespace}">"#,
            "{operation}{payload}",
            "</execute>",
            "</soap:Body>",
            "</soap:Envelope>"
        ),
        namespace = ws_type.soap_namespace(),
        operation = operation_xml,
        payload = payload_xml,
    ))
}

/// Flat scan over a response envelope: captures the result data element and
/// any fault details without modeling the full SOAP schema.
#[derive(Debug, Default)]
struct EnvelopeScan {
    fault: bool,
    fault_string: Option<String>,
    error_code: Option<i32>,
    error_message: Option<String>,
    stack_trace: Option<String>,
    data: Option<String>,
}

impl EnvelopeScan {
    fn into_server_error(self) -> Error {
        let message = self
            .error_message
            .or(self.fault_string)
            .unwrap_or_else(|| "unspecified SOAP fault".into());
        Error::Server {
            code: self.error_code.unwrap_or(crate::error::codes::UNKNOWN),
            message,
            stack_trace: self.stack_trace,
        }
    }
}

fn scan_envelope(body: &str) -> Result<EnvelopeScan> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut scan = EnvelopeScan::default();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if name == "Fault" {
                    scan.fault = true;
                }
                current = Some(name);
            }
            Ok(Event::Text(text)) => {
                if let Some(name) = &current {
                    let value = String::from_utf8_lossy(text.as_ref()).trim().to_string();
                    match name.as_str() {
                        "data" => scan.data = Some(value),
                        "faultstring" => scan.fault_string = Some(value),
                        "errorCode" => scan.error_code = value.parse().ok(),
                        "errorMessage" => scan.error_message = Some(value),
                        "stackTrace" => scan.stack_trace = Some(value),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Codec(format!("malformed SOAP response: {e}"))),
            _ => {}
        }
    }
    Ok(scan)
}
