// src/tests/client_tests.rs
use crate::errors::UpstreamError;
use crate::tests::utils::{serve_once, test_config};
use crate::upstream::client::{PageQuery, RecordSource, TableClient};

fn client_for(api_url: String) -> TableClient {
    let mut config = test_config(&[None]);
    config.api_url = api_url;
    TableClient::new(&config).unwrap()
}

#[test]
fn list_request_carries_token_and_paging_params() {
    let body = r#"{"records": [{"id": "rec1", "fields": {"物件名": "渋谷の路面店"}}], "offset": "itr2"}"#;
    let (api_url, server) = serve_once("200 OK", body);
    let client = client_for(api_url);

    let query = PageQuery::new(100, Some("Grid view")).with_offset(Some("itr1".into()));
    let page = client.list_records(&query).unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].id, "rec1");
    assert_eq!(page.offset.as_deref(), Some("itr2"));

    let head = server.join().unwrap();
    let request_line = head.lines().next().unwrap();
    assert!(request_line.starts_with("GET /v0/appTEST/Reins?"), "{request_line}");
    assert!(request_line.contains("maxRecords=100"));
    assert!(request_line.contains("view=Grid+view"));
    assert!(request_line.contains("offset=itr1"));
    assert!(head.to_lowercase().contains("authorization: bearer test-token"));
}

#[test]
fn forbidden_body_becomes_unauthorized() {
    let body = r#"{"error": {"type": "INVALID_PERMISSIONS", "message": "You are not permitted"}}"#;
    let (api_url, server) = serve_once("403 Forbidden", body);
    let client = client_for(api_url);

    let err = client.list_records(&PageQuery::new(10, None)).unwrap_err();
    server.join().unwrap();

    match err {
        UpstreamError::Unauthorized { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "INVALID_PERMISSIONS You are not permitted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!UpstreamError::from_status(403, "").is_transient());
}

#[test]
fn rate_limit_status_is_transient() {
    let (api_url, server) = serve_once("429 Too Many Requests", r#"{"errors": "slow down"}"#);
    let client = client_for(api_url);

    let err = client.list_records(&PageQuery::new(10, None)).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, UpstreamError::RateLimited(_)));
    assert!(err.is_transient());
}

#[test]
fn single_record_path_and_not_found() {
    let (api_url, server) = serve_once("404 Not Found", r#"{"error": "NOT_FOUND"}"#);
    let client = client_for(api_url);

    let err = client.get_record("recMISSING").unwrap_err();
    let head = server.join().unwrap();

    assert!(head.starts_with("GET /v0/appTEST/Reins/recMISSING HTTP/1.1"));
    match err {
        UpstreamError::NotFound(message) => assert_eq!(message, "NOT_FOUND"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let (api_url, server) = serve_once("200 OK", "<html>maintenance</html>");
    let client = client_for(api_url);

    let err = client.list_records(&PageQuery::new(10, None)).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, UpstreamError::Decode(_)));
}
