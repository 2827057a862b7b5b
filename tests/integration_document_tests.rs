#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use webpdf_client::{Error, RestSession, SessionOptions};

    fn descriptor_body(id: &str, name: &str) -> serde_json::Value {
        json!({
            "documentId": id,
            "fileName": name,
            "fileExtension": "pdf",
            "fileSize": 7,
            "mimeType": "application/pdf",
            "fileLock": false
        })
    }

    fn session(server: &MockServer) -> RestSession {
        RestSession::connect(&server.uri(), SessionOptions::new(), None).unwrap()
    }

    async fn mount_upload(server: &MockServer, id: &str, name: &str) {
        Mock::given(method("POST"))
            .and(path("/rest/documents/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptor_body(id, name)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let server = MockServer::start().await;
        let content = b"PDF-1.7".to_vec();
        mount_upload(&server, "d1", "sample").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(content.clone(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let session = session(&server);
        let document = session
            .documents()
            .upload(content.clone(), "sample.pdf")
            .await
            .unwrap();
        assert_eq!(document.document_id(), "d1");

        let mut sink = Vec::new();
        let written = session
            .documents()
            .download("d1", &mut sink)
            .await
            .unwrap();
        assert_eq!(written, content.len() as u64);
        assert_eq!(sink, content);
    }

    #[tokio::test]
    async fn test_download_into_file_on_disk() {
        let server = MockServer::start().await;
        let content = b"%PDF-1.7 disk copy".to_vec();
        mount_upload(&server, "d1", "report").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(content.clone(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let session = session(&server);
        session
            .documents()
            .upload(content.clone(), "report.pdf")
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("report.pdf");
        let mut target = tokio::fs::File::create(&target_path).await.unwrap();
        session
            .documents()
            .download("d1", &mut target)
            .await
            .unwrap();
        drop(target);

        assert_eq!(std::fs::read(&target_path).unwrap(), content);
    }

    #[tokio::test]
    async fn test_synchronize_descriptor_is_idempotent() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "original").await;
        // The second synchronize of a known id re-fetches the info endpoint
        // and updates the existing handle in place.
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(descriptor_body("d1", "renamed-on-server")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        let first = manager.upload(b"data".to_vec(), "original.pdf").await.unwrap();
        let second = manager
            .synchronize_descriptor(first.file())
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.get_documents().len(), 1);
        assert_eq!(first.file().file_name, "renamed-on-server");
    }

    #[tokio::test]
    async fn test_delete_removes_tracking() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "doomed").await;
        Mock::given(method("DELETE"))
            .and(path("/rest/documents/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        manager.upload(b"data".to_vec(), "doomed.pdf").await.unwrap();
        manager.delete("d1").await.unwrap();

        assert!(matches!(
            manager.get_document("d1").unwrap_err(),
            Error::InvalidDocument(_)
        ));
        assert!(manager.get_documents().is_empty());
    }

    #[tokio::test]
    async fn test_delete_keeps_handle_when_server_rejects() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "kept").await;
        Mock::given(method("DELETE"))
            .and(path("/rest/documents/d1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "errorCode": -31,
                "errorMessage": "document is locked",
                "stackTrace": ""
            })))
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        manager.upload(b"data".to_vec(), "kept.pdf").await.unwrap();

        let err = manager.delete("d1").await.unwrap_err();
        assert_eq!(err.code(), -31);
        // Local removal only happens after server confirmation.
        assert!(manager.get_document("d1").is_ok());
    }

    #[tokio::test]
    async fn test_untracked_ids_fail_fast() {
        let server = MockServer::start().await;
        let session = session(&server);
        let manager = session.documents();

        let mut sink = Vec::new();
        assert!(matches!(
            manager.download("ghost", &mut sink).await.unwrap_err(),
            Error::InvalidDocument(_)
        ));
        assert!(matches!(
            manager.delete("ghost").await.unwrap_err(),
            Error::InvalidDocument(_)
        ));
        // Fail-fast means no request ever reached the server.
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_synchronize_rebuilds_the_whole_view() {
        let server = MockServer::start().await;
        mount_upload(&server, "stale", "stale").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                descriptor_body("d1", "one"),
                descriptor_body("d2", "two")
            ])))
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        manager.upload(b"old".to_vec(), "stale.pdf").await.unwrap();

        let handles = manager.synchronize().await.unwrap();
        assert_eq!(handles.len(), 2);
        // The stale handle was dropped by the authoritative rebuild.
        assert!(manager.get_document("stale").is_err());
        assert!(manager.get_document("d1").is_ok());
        assert!(manager.get_document("d2").is_ok());
    }

    #[tokio::test]
    async fn test_history_gated_on_activation() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "doc").await;

        let session = session(&server);
        let manager = session.documents();
        manager.upload(b"data".to_vec(), "doc.pdf").await.unwrap();

        // History was never activated: gating applies even for tracked
        // documents, and equally for unknown ids.
        assert!(matches!(
            manager.get_history("d1").await.unwrap_err(),
            Error::InvalidHistoryData(_)
        ));
        assert!(matches!(
            manager.get_history("ghost").await.unwrap_err(),
            Error::InvalidHistoryData(_)
        ));
    }

    #[tokio::test]
    async fn test_history_backfill_on_activation() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "doc").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "fileName": "doc", "operation": "upload", "active": false },
                { "id": 2, "fileName": "doc", "operation": "converter", "active": true }
            ])))
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        let document = manager.upload(b"data".to_vec(), "doc.pdf").await.unwrap();

        manager.set_history_active(true).await.unwrap();
        assert!(manager.is_history_active());

        let history = manager.get_history("d1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[1].active);
        assert_eq!(document.history().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_history_entry_resynchronizes_document() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "doc").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "fileName": "doc", "operation": "upload", "active": true }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/rest/documents/d1/history/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(
                { "id": 1, "fileName": "doc", "operation": "upload", "active": true }
            )))
            .expect(1)
            .mount(&server)
            .await;
        // Reverting to a history entry changes server-side metadata, so the
        // handle must be re-fetched afterwards.
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(descriptor_body("d1", "reverted")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        let document = manager.upload(b"data".to_vec(), "doc.pdf").await.unwrap();
        manager.set_history_active(true).await.unwrap();

        let entry = manager.get_history("d1").await.unwrap().remove(0);
        manager.update_history_entry("d1", &entry).await.unwrap();
        assert_eq!(document.file().file_name, "reverted");
    }

    #[tokio::test]
    async fn test_rename_pushes_update_and_refreshes_handle() {
        let server = MockServer::start().await;
        mount_upload(&server, "d1", "before").await;
        Mock::given(method("GET"))
            .and(path("/rest/documents/d1/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptor_body("d1", "before")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/documents/d1/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(descriptor_body("d1", "after")))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server);
        let manager = session.documents();
        let document = manager.upload(b"data".to_vec(), "before.pdf").await.unwrap();

        let renamed = manager.rename("d1", "after").await.unwrap();
        assert!(Arc::ptr_eq(&document, &renamed));
        assert_eq!(renamed.file().file_name, "after");
    }
}
