// Wire-level data types shared by the REST and SOAP transports

pub mod admin;
pub mod auth;
pub mod document;
pub mod fault;
pub mod operation;

pub use admin::{DatastoreEntry, ServerStatus, SessionEntry};
pub use auth::{TokenResponse, UserCredentials, UserInfo};
pub use document::{DocumentFile, DocumentMetadata, HistoryEntry};
pub use fault::FaultPayload;
pub use operation::{
    BarcodeElement, BarcodeOperation, Billing, ConverterOperation, OcrLanguage, OcrOperation,
    OperationData, PdfPassword, PdfaOperation, SignatureOperation, ToolboxOperation,
    UrlConverterOperation,
};
