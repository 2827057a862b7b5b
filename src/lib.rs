//! Client SDK for the webPDF document processing server.
//!
//! The server exposes its webservices (conversion, OCR, signing, barcode,
//! toolbox manipulations) over two transports, REST and SOAP. This crate
//! hides the wire differences behind a common session abstraction:
//!
//! ```no_run
//! use webpdf_client::{RestSession, SessionOptions, UserAuthProvider, WebServiceType};
//! use std::sync::Arc;
//!
//! # async fn run() -> webpdf_client::Result<()> {
//! let session = RestSession::connect(
//!     "https://localhost:8080/webPDF",
//!     SessionOptions::new(),
//!     Some(Arc::new(UserAuthProvider::new("admin", "admin"))),
//! )?;
//! session.login().await?;
//!
//! let document = session
//!     .documents()
//!     .upload(std::fs::read("letter.docx")?, "letter.docx")
//!     .await?;
//! let converter = session.webservice(WebServiceType::Converter);
//! let result = converter.process(&document).await?;
//!
//! let mut target = tokio::fs::File::create("letter.pdf").await?;
//! session
//!     .documents()
//!     .download(result.document_id(), &mut target)
//!     .await?;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Sessions authenticate through an [`auth::AuthProvider`]: anonymous,
//! username/password (with transparent session token refresh), or an
//! externally minted bearer token. All calls are plain async round trips on
//! the caller's task; the library spawns no tasks and performs no retries.

pub mod admin;
pub mod auth;
pub mod config;
pub mod documents;
pub mod error;
pub mod http;
pub mod models;
pub mod session;
pub mod webservice;

pub use auth::{
    AnonymousAuthProvider, AuthMaterial, AuthProvider, SessionToken, TokenAuthProvider,
    UserAuthProvider,
};
pub use config::{SessionOptions, TlsOptions, DEFAULT_TOKEN_REFRESH_SKEW};
pub use documents::{DocumentManager, RestDocument, SoapDocument, SoapSource};
pub use error::{Error, Result};
pub use http::DataFormat;
pub use models::{DocumentFile, HistoryEntry, OperationData, UserInfo};
pub use session::{connect, Protocol, RestSession, Session, SoapSession};
pub use webservice::{RestWebService, SoapWebService, WebServiceType};
