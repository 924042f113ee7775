use httpmock::prelude::*;
use postal_etl::core::PostalCodeLookup;
use postal_etl::domain::ports::FetchError;
use postal_etl::{CttClient, NormalizedPostalCode};
use std::time::Duration;

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> CttClient {
    CttClient::new(&server.base_url(), API_KEY, Duration::from_secs(5)).unwrap()
}

fn code(raw: &str) -> NormalizedPostalCode {
    NormalizedPostalCode::parse(raw).unwrap()
}

#[tokio::test]
async fn test_fetch_builds_keyed_url_and_reads_first_entry() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/1000-000");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"cp": "1000-000", "concelho": "Lisboa", "distrito": "Lisboa"},
                {"cp": "1000-000", "concelho": "Ignorado", "distrito": "Ignorado"}
            ]));
    });

    let result = client_for(&server).fetch(&code("1000000")).await.unwrap();

    api_mock.assert();
    assert_eq!(result.postal_code.as_str(), "1000-000");
    assert_eq!(result.municipality, "Lisboa");
    assert_eq!(result.district, "Lisboa");
}

#[tokio::test]
async fn test_fetch_accepts_bare_object_payload() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/2000-123");
        then.status(200)
            .json_body(serde_json::json!({"concelho": "Leiria", "distrito": "Leiria"}));
    });

    let result = client_for(&server).fetch(&code("2000-123")).await.unwrap();
    assert_eq!(result.municipality, "Leiria");
}

#[tokio::test]
async fn test_fetch_defaults_missing_fields() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/3000-456");
        then.status(200)
            .json_body(serde_json::json!([{"distrito": "Coimbra"}]));
    });

    let result = client_for(&server).fetch(&code("3000456")).await.unwrap();
    assert_eq!(result.municipality, "N/A");
    assert_eq!(result.district, "Coimbra");
}

#[tokio::test]
async fn test_fetch_empty_array_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/9999-999");
        then.status(200).json_body(serde_json::json!([]));
    });

    let err = client_for(&server).fetch(&code("9999999")).await.unwrap_err();
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_fetch_non_200_carries_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/1000-000");
        then.status(429).body("Too Many Requests");
    });

    let err = client_for(&server).fetch(&code("1000000")).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 429 }));
}

#[tokio::test]
async fn test_fetch_invalid_json_is_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/test-key/1000-000");
        then.status(200).body("<html>maintenance</html>");
    });

    let err = client_for(&server).fetch(&code("1000000")).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_connection_refused_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = format!("http://127.0.0.1:{}", port);
    let client = CttClient::new(&base_url, API_KEY, Duration::from_secs(2)).unwrap();

    let err = client.fetch(&code("1000000")).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
