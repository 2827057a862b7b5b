#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use webpdf_client::models::{OcrOperation, OperationData};
    use webpdf_client::{
        Error, RestSession, SessionOptions, SoapDocument, SoapSession, WebServiceType,
    };

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

    async fn rest_session_with_document(server: &MockServer) -> RestSession {
        Mock::given(method("POST"))
            .and(path("/rest/documents/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(descriptor_body("src", "source")),
            )
            .mount(server)
            .await;
        let session = RestSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();
        session
            .documents()
            .upload(b"source".to_vec(), "source.pdf")
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_rest_process_synchronizes_result_document() {
        let server = MockServer::start().await;
        let session = rest_session_with_document(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/converter/src"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(descriptor_body("out", "converted")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = session.documents().get_document("src").unwrap();
        let converter = session.webservice(WebServiceType::Converter);
        let result = converter.process(&source).await.unwrap();

        assert_eq!(result.document_id(), "out");
        // The result handle is tracked like any other session document.
        assert!(session.documents().get_document("out").is_ok());
        assert_eq!(session.documents().get_documents().len(), 2);
    }

    #[tokio::test]
    async fn test_rest_process_passes_server_error_through() {
        let server = MockServer::start().await;
        let session = rest_session_with_document(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/ocr/src"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "errorCode": -42,
                "errorMessage": "OCR engine unavailable",
                "stackTrace": "at de.webpdf..."
            })))
            .mount(&server)
            .await;

        let source = session.documents().get_document("src").unwrap();
        let ocr = session.webservice(WebServiceType::Ocr);
        let err = ocr.process(&source).await.unwrap_err();
        assert_eq!(err.code(), -42);
        assert_eq!(err.server_stack_trace(), Some("at de.webpdf..."));
    }

    #[tokio::test]
    async fn test_webservice_type_detected_from_envelope() {
        let server = MockServer::start().await;
        let session = RestSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();

        let envelope = OperationData {
            ocr: Some(OcrOperation::default()),
            ..OperationData::default()
        };
        let service = session.webservice_from_operation(envelope).unwrap();
        assert_eq!(service.webservice_type(), WebServiceType::Ocr);

        let err = session
            .webservice_from_operation(OperationData::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownWebService(_)));
    }

    #[tokio::test]
    async fn test_mismatched_envelope_rejected_by_setter() {
        let server = MockServer::start().await;
        let session = RestSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();

        let mut converter = session.webservice(WebServiceType::Converter);
        let err = converter
            .set_operation(OperationData::ocr())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownWebService(_)));
    }

    fn soap_response(data_b64: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <executeResponse xmlns="http://schema.webpdf.de/1.0/soap/converter">
                  <data>{data_b64}</data>
                </executeResponse>
              </soap:Body>
            </soap:Envelope>"#
        )
    }

    #[tokio::test]
    async fn test_soap_process_returns_result_document() {
        let server = MockServer::start().await;
        // "converted" base64-encoded
        Mock::given(method("POST"))
            .and(path("/soap/converter"))
            .and(header("SOAPAction", "\"http://schema.webpdf.de/1.0/soap/converter/execute\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(soap_response("Y29udmVydGVk"), "text/xml; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = SoapSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();
        let source = SoapDocument::from_bytes(b"source office document".to_vec());
        let converter = session.webservice(WebServiceType::Converter);

        let result = converter.process(Some(&source)).await.unwrap();
        assert!(result.has_result());

        let mut sink = Vec::new();
        result.write_result_to(&mut sink).await.unwrap();
        assert_eq!(sink, b"converted");
    }

    #[tokio::test]
    async fn test_soap_fault_maps_to_server_error() {
        let server = MockServer::start().await;
        let fault = r#"<?xml version="1.0" encoding="UTF-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <soap:Fault>
                  <faultcode>soap:Server</faultcode>
                  <faultstring>conversion failed</faultstring>
                  <detail>
                    <errorCode>-106</errorCode>
                    <errorMessage>unsupported source format</errorMessage>
                  </detail>
                </soap:Fault>
              </soap:Body>
            </soap:Envelope>"#;
        Mock::given(method("POST"))
            .and(path("/soap/converter"))
            .respond_with(ResponseTemplate::new(500).set_body_raw(fault, "text/xml; charset=utf-8"))
            .mount(&server)
            .await;

        let session = SoapSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();
        let source = SoapDocument::from_bytes(b"broken".to_vec());
        let converter = session.webservice(WebServiceType::Converter);

        let err = converter.process(Some(&source)).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.code(), -106);
    }

    #[tokio::test]
    async fn test_soap_requires_document_except_url_conversion() {
        let server = MockServer::start().await;
        let session = SoapSession::connect(&server.uri(), SessionOptions::new(), None).unwrap();

        // A converter call without a source document fails on the client.
        let converter = session.webservice(WebServiceType::Converter);
        assert!(matches!(
            converter.process(None).await.unwrap_err(),
            Error::InvalidSource(_)
        ));

        // URL conversion takes its source from the operation parameters.
        Mock::given(method("POST"))
            .and(path("/soap/urlconverter"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(soap_response("cGRm"), "text/xml; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;
        let mut url_converter = session.webservice(WebServiceType::UrlConverter);
        url_converter
            .operation_mut()
            .url_converter
            .as_mut()
            .unwrap()
            .url = "https://example.com/page".to_string();
        let result = url_converter.process(None).await.unwrap();
        assert!(result.has_result());
    }
}
