use serde::{Deserialize, Serialize};

use super::FaultPayload;

/// Server-side descriptor of an uploaded document.
///
/// This is advisory client-side state: the server owns the authoritative
/// copy and the cached descriptor must be re-fetched after any operation
/// that could have changed it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentFile {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_document_id: Option<String>,
    pub file_name: String,
    pub file_extension: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_lock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FaultPayload>,
}

/// Per-type metadata block attached to a document descriptor. The server
/// reports different shapes per MIME type, so the content stays opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One past state of a document, as recorded by the server-side history.
///
/// Exactly one entry per document is active at a time; activating an entry
/// reverts the document's current content to that state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    pub id: i32,
    pub file_name: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<chrono::DateTime<chrono::Utc>>,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_file_deserializes_from_camel_case() {
        let json = r#"{
            "documentId": "abc123",
            "fileName": "report",
            "fileExtension": "pdf",
            "fileSize": 2048,
            "mimeType": "application/pdf",
            "fileLock": false
        }"#;
        let file: DocumentFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.document_id, "abc123");
        assert_eq!(file.file_size, 2048);
        assert!(file.error.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let file: DocumentFile = serde_json::from_str(r#"{"documentId": "x"}"#).unwrap();
        assert_eq!(file.file_name, "");
        assert_eq!(file.file_size, 0);
    }
}
