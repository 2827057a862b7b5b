//! Error taxonomy of the client.
//!
//! Failures raised before a request leaves the client carry a well-known
//! negative code from [`codes`]; failures reported by the server keep the
//! server's own code untouched in [`Error::Server`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Well-known client-side error codes. Server-side codes arrive in
/// [`Error::Server`] and are never remapped.
pub mod codes {
    pub const UNKNOWN: i32 = -1;
    pub const INVALID_URL: i32 = -2;
    pub const UNKNOWN_WEBSERVICE: i32 = -3;
    pub const INVALID_SOURCE_DOCUMENT: i32 = -4;
    pub const INVALID_DOCUMENT: i32 = -5;
    pub const INVALID_HISTORY_DATA: i32 = -6;
    pub const AUTHENTICATION_FAILURE: i32 = -7;
    pub const FORBIDDEN_TOKEN_REFRESH: i32 = -8;
    pub const TRANSPORT_FAILURE: i32 = -9;
    pub const HTTP_STATUS_FAILURE: i32 = -10;
    pub const CODEC_FAILURE: i32 = -11;
    pub const IO_FAILURE: i32 = -12;
    pub const SOAP_EXECUTION_FAILURE: i32 = -13;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("unknown webservice: {0}")]
    UnknownWebService(String),

    #[error("invalid source document: {0}")]
    InvalidSource(String),

    #[error("unknown document id: {0}")]
    InvalidDocument(String),

    #[error("invalid history data: {0}")]
    InvalidHistoryData(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Token refresh is only valid while the session holds a server-issued
    /// session token.
    #[error("token refresh is forbidden for the current auth material")]
    ForbiddenTokenRefresh,

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status without a structured fault body.
    #[error("HTTP request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// Business error reported by the server, code and message verbatim.
    #[error("server error {code}: {message}")]
    Server {
        code: i32,
        message: String,
        stack_trace: Option<String>,
    },

    #[error("malformed payload: {0}")]
    Codec(String),

    #[error("SOAP execution failed: {0}")]
    SoapExecution(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The error code: the server's own code for [`Error::Server`], a
    /// well-known client code from [`codes`] otherwise.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidUrl(_) => codes::INVALID_URL,
            Error::UnknownWebService(_) => codes::UNKNOWN_WEBSERVICE,
            Error::InvalidSource(_) => codes::INVALID_SOURCE_DOCUMENT,
            Error::InvalidDocument(_) => codes::INVALID_DOCUMENT,
            Error::InvalidHistoryData(_) => codes::INVALID_HISTORY_DATA,
            Error::Authentication(_) => codes::AUTHENTICATION_FAILURE,
            Error::ForbiddenTokenRefresh => codes::FORBIDDEN_TOKEN_REFRESH,
            Error::Transport(_) => codes::TRANSPORT_FAILURE,
            Error::Http { .. } => codes::HTTP_STATUS_FAILURE,
            Error::Server { code, .. } => *code,
            Error::Codec(_) => codes::CODEC_FAILURE,
            Error::SoapExecution(_) => codes::SOAP_EXECUTION_FAILURE,
            Error::Io(_) => codes::IO_FAILURE,
        }
    }

    /// Whether the server itself reported this error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::ForbiddenTokenRefresh)
    }

    /// The server-side stack trace, when the server attached one.
    pub fn server_stack_trace(&self) -> Option<&str> {
        match self {
            Error::Server {
                stack_trace: Some(trace),
                ..
            } if !trace.is_empty() => Some(trace),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Codec(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Codec(err.to_string())
    }
}

impl From<quick_xml::SeError> for Error {
    fn from(err: quick_xml::SeError) -> Self {
        Error::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_keep_their_own_code() {
        let err = Error::Server {
            code: -5008,
            message: "wrong password".into(),
            stack_trace: Some("at de.webpdf...".into()),
        };
        assert_eq!(err.code(), -5008);
        assert!(err.is_server_error());
        assert_eq!(err.server_stack_trace(), Some("at de.webpdf..."));
    }

    #[test]
    fn empty_stack_trace_reads_as_absent() {
        let err = Error::Server {
            code: -31,
            message: "locked".into(),
            stack_trace: Some(String::new()),
        };
        assert_eq!(err.server_stack_trace(), None);
    }

    #[test]
    fn client_errors_map_to_well_known_codes() {
        assert_eq!(
            Error::InvalidUrl("x".into()).code(),
            codes::INVALID_URL
        );
        assert_eq!(
            Error::ForbiddenTokenRefresh.code(),
            codes::FORBIDDEN_TOKEN_REFRESH
        );
        assert!(Error::ForbiddenTokenRefresh.is_authentication_error());
        assert!(Error::Authentication("denied".into()).is_authentication_error());
        assert!(!Error::Codec("bad".into()).is_authentication_error());
    }

    #[test]
    fn http_failures_surface_the_status() {
        let err = Error::Http {
            status: 502,
            body: "<html>bad gateway</html>".into(),
        };
        assert!(err.to_string().contains("502"));
        assert_eq!(err.code(), codes::HTTP_STATUS_FAILURE);
    }
}
