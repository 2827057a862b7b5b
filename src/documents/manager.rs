use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::RequestBody;
use crate::models::{DocumentFile, HistoryEntry};
use crate::session::rest::SessionCore;

use super::RestDocument;

struct ManagerState {
    /// Document id to handle. Ids are unique; re-synchronizing a known id
    /// updates the existing handle instead of inserting a second one.
    documents: RwLock<HashMap<String, Arc<RestDocument>>>,
    history_active: AtomicBool,
}

/// Registry and lifecycle manager for the documents a REST session knows.
///
/// All mutation of the id-to-handle map goes through this manager's
/// methods; callers sharing a session across tasks serialize access
/// themselves.
#[derive(Clone)]
pub struct DocumentManager {
    core: Arc<SessionCore>,
    state: Arc<ManagerState>,
}

impl DocumentManager {
    pub(crate) fn new(core: Arc<SessionCore>) -> Self {
        Self {
            core,
            state: Arc::new(ManagerState {
                documents: RwLock::new(HashMap::new()),
                history_active: AtomicBool::new(false),
            }),
        }
    }

    /// Whether document history tracking is active for this manager.
    pub fn is_history_active(&self) -> bool {
        self.state.history_active.load(Ordering::Acquire)
    }

    /// Handle for a tracked document id.
    pub fn get_document(&self, document_id: &str) -> Result<Arc<RestDocument>> {
        self.state
            .documents
            .read()
            .unwrap()
            .get(document_id)
            .cloned()
            .ok_or_else(|| Error::InvalidDocument(document_id.to_string()))
    }

    /// Snapshot of all tracked handles, in no particular order.
    pub fn get_documents(&self) -> Vec<Arc<RestDocument>> {
        self.state
            .documents
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect()
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.state
            .documents
            .read()
            .unwrap()
            .contains_key(document_id)
    }

    /// Upload a document; the returned handle is tracked by this manager.
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<Arc<RestDocument>> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())?;
        let form = Form::new().part("filedata", part);

        let url = self.core.build_url("documents/", &[])?;
        let material = self.core.request_material().await?;
        let descriptor: Option<DocumentFile> = self
            .core
            .executor()
            .request(Method::POST, url, &material, RequestBody::Multipart(form))
            .await?;
        let descriptor = descriptor
            .ok_or_else(|| Error::Codec("upload returned no document descriptor".into()))?;
        info!(
            "uploaded '{}' as document {}",
            file_name, descriptor.document_id
        );
        self.insert_or_update(descriptor).await
    }

    /// Rebuild the whole registry from the server's document list. This is
    /// the authoritative reconciliation for a resumed session: handles for
    /// ids no longer known to the server are dropped.
    pub async fn synchronize(&self) -> Result<Vec<Arc<RestDocument>>> {
        let url = self.core.build_url("documents/list", &[])?;
        let material = self.core.request_material().await?;
        let descriptors: Option<Vec<DocumentFile>> = self
            .core
            .executor()
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        let descriptors = descriptors.unwrap_or_default();

        self.state.documents.write().unwrap().clear();
        let mut handles = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            handles.push(self.insert_or_update(descriptor).await?);
        }
        debug!("synchronized {} documents from server", handles.len());
        Ok(handles)
    }

    /// Reconcile a single descriptor into the registry.
    ///
    /// A known id keeps its existing handle: the cached descriptor is
    /// re-fetched from the per-document info endpoint (and the history
    /// list, when tracking is active). An unknown id gets a new handle.
    pub async fn synchronize_descriptor(
        &self,
        descriptor: DocumentFile,
    ) -> Result<Arc<RestDocument>> {
        let document_id = descriptor.document_id.clone();
        let known = self
            .state
            .documents
            .read()
            .unwrap()
            .get(&document_id)
            .cloned();
        match known {
            Some(handle) => {
                let info = self.fetch_info(&document_id).await?;
                handle.set_file(info);
                if self.is_history_active() {
                    let entries = self.fetch_history(&document_id).await?;
                    handle.set_history(entries);
                }
                Ok(handle)
            }
            None => self.insert_or_update(descriptor).await,
        }
    }

    /// Stream a tracked document's content into `sink`.
    pub async fn download<W>(&self, document_id: &str, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.get_document(document_id)?;
        let url = self
            .core
            .build_url(&format!("documents/{document_id}"), &[])?;
        let material = self.core.request_material().await?;
        self.core
            .executor()
            .download(Method::GET, url, &material, sink)
            .await
    }

    /// Delete a tracked document on the server. The local handle is removed
    /// only after the server confirms the deletion.
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.get_document(document_id)?;
        let url = self
            .core
            .build_url(&format!("documents/{document_id}"), &[])?;
        let material = self.core.request_material().await?;
        let _: Option<serde_json::Value> = self
            .core
            .executor()
            .request(Method::DELETE, url, &material, RequestBody::None)
            .await?;
        self.state.documents.write().unwrap().remove(document_id);
        info!("deleted document {}", document_id);
        Ok(())
    }

    /// Rename a tracked document and re-synchronize its handle.
    pub async fn rename(&self, document_id: &str, new_name: &str) -> Result<Arc<RestDocument>> {
        let handle = self.get_document(document_id)?;
        let mut descriptor = self.fetch_info(document_id).await?;
        descriptor.file_name = new_name.to_string();

        let url = self
            .core
            .build_url(&format!("documents/{document_id}/update"), &[])?;
        let material = self.core.request_material().await?;
        let updated: Option<DocumentFile> = self
            .core
            .executor()
            .request(
                Method::POST,
                url,
                &material,
                RequestBody::Json(serde_json::to_value(&descriptor)?),
            )
            .await?;
        handle.set_file(updated.unwrap_or(descriptor));
        if self.is_history_active() {
            let entries = self.fetch_history(document_id).await?;
            handle.set_history(entries);
        }
        Ok(handle)
    }

    /// Toggle history tracking. Activation backfills the history of every
    /// currently tracked document; deactivation stops future fetches but
    /// keeps already cached history.
    pub async fn set_history_active(&self, active: bool) -> Result<()> {
        let was_active = self.state.history_active.swap(active, Ordering::AcqRel);
        if active && !was_active {
            let handles = self.get_documents();
            info!("history tracking activated, backfilling {} documents", handles.len());
            for handle in handles {
                let entries = self.fetch_history(handle.document_id()).await?;
                handle.set_history(entries);
            }
        }
        Ok(())
    }

    /// History of a tracked document. Fails with invalid-history-data
    /// whenever history tracking is not active, regardless of whether the
    /// document exists.
    pub async fn get_history(&self, document_id: &str) -> Result<Vec<HistoryEntry>> {
        if !self.is_history_active() {
            return Err(Error::InvalidHistoryData(
                "document history tracking is not active".into(),
            ));
        }
        let handle = self.get_document(document_id)?;
        if let Some(entries) = handle.history() {
            return Ok(entries);
        }
        let entries = self.fetch_history(document_id).await?;
        handle.set_history(entries.clone());
        Ok(entries)
    }

    /// Push an updated history entry for a tracked document.
    ///
    /// An entry whose active flag is set reverts the document to that past
    /// state on the server, so the document's metadata is re-synchronized
    /// afterwards along with the history list.
    pub async fn update_history_entry(
        &self,
        document_id: &str,
        entry: &HistoryEntry,
    ) -> Result<HistoryEntry> {
        if !self.is_history_active() {
            return Err(Error::InvalidHistoryData(
                "document history tracking is not active".into(),
            ));
        }
        let handle = self.get_document(document_id)?;

        let url = self.core.build_url(
            &format!("documents/{document_id}/history/{}", entry.id),
            &[],
        )?;
        let material = self.core.request_material().await?;
        let updated: Option<HistoryEntry> = self
            .core
            .executor()
            .request(
                Method::PUT,
                url,
                &material,
                RequestBody::Json(serde_json::to_value(entry)?),
            )
            .await?;

        // Reverting to a history entry can change size, MIME type and name,
        // so the cached descriptor must be re-fetched.
        let info = self.fetch_info(document_id).await?;
        handle.set_file(info);
        let entries = self.fetch_history(document_id).await?;
        handle.set_history(entries);

        Ok(updated.unwrap_or_else(|| entry.clone()))
    }

    /// Insert a new handle or update the existing one for the descriptor's
    /// id, without contacting the server.
    async fn insert_or_update(&self, descriptor: DocumentFile) -> Result<Arc<RestDocument>> {
        let document_id = descriptor.document_id.clone();
        let existing = self
            .state
            .documents
            .read()
            .unwrap()
            .get(&document_id)
            .cloned();
        let handle = match existing {
            Some(handle) => {
                handle.set_file(descriptor);
                handle
            }
            None => {
                let handle = Arc::new(RestDocument::new(descriptor));
                self.state
                    .documents
                    .write()
                    .unwrap()
                    .insert(document_id.clone(), Arc::clone(&handle));
                handle
            }
        };
        if self.is_history_active() {
            let entries = self.fetch_history(&document_id).await?;
            handle.set_history(entries);
        }
        Ok(handle)
    }

    async fn fetch_info(&self, document_id: &str) -> Result<DocumentFile> {
        let url = self
            .core
            .build_url(&format!("documents/{document_id}/info"), &[])?;
        let material = self.core.request_material().await?;
        let info: Option<DocumentFile> = self
            .core
            .executor()
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        info.ok_or_else(|| Error::InvalidDocument(document_id.to_string()))
    }

    async fn fetch_history(&self, document_id: &str) -> Result<Vec<HistoryEntry>> {
        let url = self
            .core
            .build_url(&format!("documents/{document_id}/history"), &[])?;
        let material = self.core.request_material().await?;
        let entries: Option<Vec<HistoryEntry>> = self
            .core
            .executor()
            .request(Method::GET, url, &material, RequestBody::None)
            .await?;
        Ok(entries.unwrap_or_default())
    }
}
