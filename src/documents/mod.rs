// Document handles and the per-session document registry

pub mod manager;
pub mod rest;
pub mod soap;

pub use manager::DocumentManager;
pub use rest::RestDocument;
pub use soap::{SoapDocument, SoapSource};
