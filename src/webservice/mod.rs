// Webservice dispatch: operation type selection and per-transport execution

pub mod rest;
pub mod soap;

use std::fmt;

use crate::error::{Error, Result};
use crate::models::OperationData;

pub use rest::RestWebService;
pub use soap::SoapWebService;

/// The webservice operation types offered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebServiceType {
    Converter,
    UrlConverter,
    Ocr,
    Pdfa,
    Signature,
    Barcode,
    Toolbox,
}

impl WebServiceType {
    /// REST endpoint segment the operation is posted to.
    pub fn rest_endpoint(&self) -> &'static str {
        match self {
            WebServiceType::Converter => "converter",
            WebServiceType::UrlConverter => "urlconverter",
            WebServiceType::Ocr => "ocr",
            WebServiceType::Pdfa => "pdfa",
            WebServiceType::Signature => "signature",
            WebServiceType::Barcode => "barcode",
            WebServiceType::Toolbox => "toolbox",
        }
    }

    /// XML namespace of the SOAP port for this operation type.
    pub fn soap_namespace(&self) -> String {
        format!("http://schema.webpdf.de/1.0/soap/{}", self.rest_endpoint())
    }

    /// SOAPAction header value for the execute call on this port.
    pub fn soap_action(&self) -> String {
        format!("{}/execute", self.soap_namespace())
    }

    /// Envelope with this type's operation block populated with defaults.
    pub fn default_operation(&self) -> OperationData {
        match self {
            WebServiceType::Converter => OperationData::converter(),
            WebServiceType::UrlConverter => OperationData::url_converter(),
            WebServiceType::Ocr => OperationData::ocr(),
            WebServiceType::Pdfa => OperationData::pdfa(),
            WebServiceType::Signature => OperationData::signature(),
            WebServiceType::Barcode => OperationData::barcode(),
            WebServiceType::Toolbox => OperationData::toolbox(),
        }
    }

    /// Detect the target webservice from the populated operation block of
    /// an envelope. Exactly one block must be populated.
    pub fn from_operation_data(data: &OperationData) -> Result<Self> {
        let populated = data.populated_operations();
        if populated != 1 {
            return Err(Error::UnknownWebService(format!(
                "expected exactly one populated operation block, found {populated}"
            )));
        }
        if data.converter.is_some() {
            Ok(WebServiceType::Converter)
        } else if data.url_converter.is_some() {
            Ok(WebServiceType::UrlConverter)
        } else if data.ocr.is_some() {
            Ok(WebServiceType::Ocr)
        } else if data.pdfa.is_some() {
            Ok(WebServiceType::Pdfa)
        } else if data.signature.is_some() {
            Ok(WebServiceType::Signature)
        } else if data.barcode.is_some() {
            Ok(WebServiceType::Barcode)
        } else {
            Ok(WebServiceType::Toolbox)
        }
    }
}

impl fmt::Display for WebServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rest_endpoint())
    }
}
