use std::sync::RwLock;

use crate::models::{DocumentFile, HistoryEntry};

/// Client-side handle for a document uploaded to the server.
///
/// The document id is assigned by the server and never changes for the
/// lifetime of the handle. The cached descriptor is advisory: it reflects
/// the server state as of the last synchronization and is refreshed in
/// place, so every holder of the shared handle sees the update.
#[derive(Debug)]
pub struct RestDocument {
    document_id: String,
    file: RwLock<DocumentFile>,
    history: RwLock<Option<Vec<HistoryEntry>>>,
}

impl RestDocument {
    pub(crate) fn new(descriptor: DocumentFile) -> Self {
        Self {
            document_id: descriptor.document_id.clone(),
            file: RwLock::new(descriptor),
            history: RwLock::new(None),
        }
    }

    /// Server-assigned document id, immutable for this handle's lifetime.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Snapshot of the cached server-side descriptor.
    pub fn file(&self) -> DocumentFile {
        self.file.read().unwrap().clone()
    }

    /// Cached history list, if it has been fetched for this document.
    pub fn history(&self) -> Option<Vec<HistoryEntry>> {
        self.history.read().unwrap().clone()
    }

    pub(crate) fn set_file(&self, descriptor: DocumentFile) {
        *self.file.write().unwrap() = descriptor;
    }

    pub(crate) fn set_history(&self, entries: Vec<HistoryEntry>) {
        *self.history.write().unwrap() = Some(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_descriptor_updates_in_place() {
        let document = RestDocument::new(DocumentFile {
            document_id: "d1".into(),
            file_name: "old".into(),
            ..DocumentFile::default()
        });
        document.set_file(DocumentFile {
            document_id: "d1".into(),
            file_name: "new".into(),
            ..DocumentFile::default()
        });
        assert_eq!(document.document_id(), "d1");
        assert_eq!(document.file().file_name, "new");
    }
}
