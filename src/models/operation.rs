//! Operation parameter blocks for the webservice endpoints.
//!
//! These are plain data-binding types: the envelope carries shared blocks
//! (billing, PDF password) plus exactly one populated operation block, and
//! the populated block determines which webservice the envelope targets.

use serde::{Deserialize, Serialize};

/// Top-level envelope sent to every webservice endpoint.
///
/// Serialized to JSON for REST calls and to XML for the SOAP body. Exactly
/// one of the operation blocks must be populated; see
/// `WebServiceType::from_operation_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PdfPassword>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_converter: Option<UrlConverterOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfa: Option<PdfaOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<BarcodeOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbox: Option<Vec<ToolboxOperation>>,
}

/// Billing information forwarded to the server unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Billing {
    pub user_name: String,
    pub application_name: String,
    pub customer_code: String,
}

/// Passwords for opening or modifying a protected source PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfPassword {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// Document format conversion (office/image/mail formats to PDF).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    pub embed_fonts: bool,
    pub reduce_resolution: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<i32>,
    pub compression: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfa: Option<PdfaOperation>,
}

/// Conversion of an external web page (no source document) to PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlConverterOperation {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

/// Text recognition over scanned pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrOperation {
    pub language: OcrLanguage,
    pub check_resolution: bool,
    pub force_each_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrLanguage {
    #[default]
    Eng,
    Deu,
    Fra,
    Ita,
    Spa,
}

/// PDF/A conversion and validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfaOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_report: Option<String>,
    pub convert: bool,
}

/// Digital signature application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub append_signature: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
}

/// Barcode detection or creation on document pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_pages: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<BarcodeElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeElement {
    pub value: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
}

/// One toolbox manipulation step; a toolbox call carries an ordered list of
/// these and applies them in sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolboxOperation {
    Merge {
        #[serde(skip_serializing_if = "Option::is_none")]
        source_document_id: Option<String>,
        outline_name: Option<String>,
    },
    Rotate {
        pages: String,
        degrees: i32,
    },
    Delete {
        pages: String,
    },
    Watermark {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pages: Option<String>,
        opacity: Option<i32>,
    },
    Extraction {
        #[serde(skip_serializing_if = "Option::is_none")]
        pages: Option<String>,
    },
    Security {
        #[serde(skip_serializing_if = "Option::is_none")]
        open_password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        permission_password: Option<String>,
    },
    Annotation {
        page: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl OperationData {
    /// Envelope with the converter block populated with defaults.
    pub fn converter() -> Self {
        Self {
            converter: Some(ConverterOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with the URL converter block populated with defaults.
    pub fn url_converter() -> Self {
        Self {
            url_converter: Some(UrlConverterOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with the OCR block populated with defaults.
    pub fn ocr() -> Self {
        Self {
            ocr: Some(OcrOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with the PDF/A block populated with defaults.
    pub fn pdfa() -> Self {
        Self {
            pdfa: Some(PdfaOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with the signature block populated with defaults.
    pub fn signature() -> Self {
        Self {
            signature: Some(SignatureOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with the barcode block populated with defaults.
    pub fn barcode() -> Self {
        Self {
            barcode: Some(BarcodeOperation::default()),
            ..Self::default()
        }
    }

    /// Envelope with an empty toolbox step list.
    pub fn toolbox() -> Self {
        Self {
            toolbox: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Number of populated operation blocks. A well-formed envelope has
    /// exactly one.
    pub fn populated_operations(&self) -> usize {
        [
            self.converter.is_some(),
            self.url_converter.is_some(),
            self.ocr.is_some(),
            self.pdfa.is_some(),
            self.signature.is_some(),
            self.barcode.is_some(),
            self.toolbox.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}
