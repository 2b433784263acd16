//! AnalysisClient against a local HTTP server.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use safegate_core::{AnalysisClient, AnalysisFinding, AnalysisResult, Analyzer, FailureCause};

/// Serve exactly one request with a canned response, returning the base URL.
fn serve_one(status: u16, body: &'static str) -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = tiny_http::Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn success_response_is_decoded_into_findings() {
    let base_url = serve_one(
        200,
        r#"{"analysis": [
            {"type": "score", "name": "toxicity", "result": 0.25},
            {"type": "PII", "result": ["alice@example.com"]}
        ]}"#,
    );
    let client = AnalysisClient::new(base_url).unwrap();

    let result = client.analyze("Hello, friend", 10, "test::1", "key").await;

    match result {
        AnalysisResult::Success(findings) => {
            assert_eq!(findings.len(), 2);
            assert_eq!(
                findings[0],
                AnalysisFinding::Score {
                    category: "toxicity".into(),
                    score: 0.25
                }
            );
        }
        AnalysisResult::Failure(cause) => panic!("unexpected failure: {cause}"),
    }
}

#[tokio::test]
async fn request_carries_path_tag_body_and_bearer_credential() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        let auth = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map(|h| h.value.to_string());
        tx.send((
            request.method().to_string(),
            request.url().to_string(),
            auth,
            body,
        ))
        .unwrap();
        let _ = request.respond(tiny_http::Response::from_string(r#"{"analysis": []}"#));
    });

    let client = AnalysisClient::new(format!("http://{addr}")).unwrap();
    let result = client
        .analyze("the prompt text", 10, "comment::1", "secret-key")
        .await;
    assert!(!result.is_failure());

    let (method, url, auth, body) = rx.recv().unwrap();
    assert_eq!(method, "POST");
    assert_eq!(url, "/v1/analysis/10?tag=comment%3A%3A1");
    assert_eq!(auth.as_deref(), Some("Bearer secret-key"));
    assert_eq!(body, "the prompt text");
}

#[tokio::test]
async fn non_2xx_status_is_a_protocol_failure() {
    let base_url = serve_one(503, "busy");
    let client = AnalysisClient::new(base_url).unwrap();

    let result = client.analyze("hi", 10, "test::1", "key").await;

    assert_eq!(
        result,
        AnalysisResult::Failure(FailureCause::Protocol(503))
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let base_url = serve_one(200, "<html>not json</html>");
    let client = AnalysisClient::new(base_url).unwrap();

    let result = client.analyze("hi", 10, "test::1", "key").await;

    assert!(matches!(
        result,
        AnalysisResult::Failure(FailureCause::Decode(_))
    ));
}

#[tokio::test]
async fn unreachable_analyzer_is_a_network_failure() {
    // Bind to grab a port nothing will listen on, then release it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AnalysisClient::new(format!("http://{addr}")).unwrap();
    let result = client.analyze("hi", 10, "test::1", "key").await;

    assert!(matches!(
        result,
        AnalysisResult::Failure(FailureCause::Network(_))
    ));
}
