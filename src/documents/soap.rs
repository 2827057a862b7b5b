use std::path::PathBuf;
use std::sync::Mutex;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::error::{Error, Result};

/// Source of a SOAP document: local file, in-memory bytes, or a URL hint
/// for document-less operations like URL conversion.
#[derive(Debug, Clone)]
pub enum SoapSource {
    File(PathBuf),
    Bytes(Vec<u8>),
    Url(Url),
}

/// An ephemeral document for the SOAP transport.
///
/// Unlike REST documents, SOAP documents have no server-assigned identity
/// and are not tracked by any manager: each one is owned by its creator.
/// The result payload of a webservice call is buffered until it is written
/// to a target or the document is closed.
#[derive(Debug)]
pub struct SoapDocument {
    source: Option<SoapSource>,
    result: Mutex<Option<Vec<u8>>>,
}

impl SoapDocument {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(SoapSource::File(path.into())),
            result: Mutex::new(None),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            source: Some(SoapSource::Bytes(bytes)),
            result: Mutex::new(None),
        }
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            source: Some(SoapSource::Url(url)),
            result: Mutex::new(None),
        }
    }

    pub(crate) fn from_result(bytes: Vec<u8>) -> Self {
        Self {
            source: None,
            result: Mutex::new(Some(bytes)),
        }
    }

    pub fn source(&self) -> Option<&SoapSource> {
        self.source.as_ref()
    }

    /// URL hint for document-less operations, if this document was created
    /// from a URL.
    pub fn source_url(&self) -> Option<&Url> {
        match &self.source {
            Some(SoapSource::Url(url)) => Some(url),
            _ => None,
        }
    }

    /// Load the source payload to attach to a webservice call. URL sources
    /// carry no local data and fail here.
    pub(crate) async fn data(&self) -> Result<Vec<u8>> {
        match &self.source {
            Some(SoapSource::File(path)) => Ok(tokio::fs::read(path).await?),
            Some(SoapSource::Bytes(bytes)) => Ok(bytes.clone()),
            Some(SoapSource::Url(url)) => Err(Error::InvalidSource(format!(
                "URL source '{url}' carries no local data"
            ))),
            None => Err(Error::InvalidSource(
                "result document has no source payload".into(),
            )),
        }
    }

    /// Whether a webservice result is buffered in this document.
    pub fn has_result(&self) -> bool {
        self.result.lock().unwrap().is_some()
    }

    /// Write the buffered result payload to `sink`.
    pub async fn write_result_to<W>(&self, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let bytes = self
            .result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::InvalidSource("document carries no result payload".into()))?;
        sink.write_all(&bytes).await?;
        sink.flush().await?;
        Ok(bytes.len() as u64)
    }

    /// Release the buffered source and result payloads. Also happens on
    /// drop; explicit close lets callers free large buffers early.
    pub fn close(&self) {
        self.result.lock().unwrap().take();
    }
}
