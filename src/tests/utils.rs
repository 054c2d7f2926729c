// src/tests/utils.rs
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::{FetchSettings, IngestConfig, NormalizeSettings};
use crate::errors::UpstreamError;
use crate::upstream::client::{PageQuery, RecordSource};
use crate::upstream::models::{FieldValue, RawRecord, RecordPage};

/// Scripted stand-in for the table API. List responses are served in order; every
/// query is recorded so tests can check what was asked for.
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<VecDeque<Result<RecordPage, UpstreamError>>>,
    queries: Mutex<Vec<PageQuery>>,
    by_id: Vec<RawRecord>,
    get_error: Mutex<Option<UpstreamError>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, records: Vec<RawRecord>, offset: Option<&str>) -> Self {
        self.push(Ok(RecordPage {
            records,
            offset: offset.map(str::to_string),
        }))
    }

    pub fn fail(self, status: u16, message: &str) -> Self {
        self.push(Err(UpstreamError::from_status(status, message)))
    }

    pub fn network_error(self) -> Self {
        self.push(Err(UpstreamError::Network("connection reset".into())))
    }

    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.by_id.push(record);
        self
    }

    pub fn with_get_error(self, error: UpstreamError) -> Self {
        *self.get_error.lock().unwrap() = Some(error);
        self
    }

    fn push(self, response: Result<RecordPage, UpstreamError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl RecordSource for MockSource {
    fn list_records(&self, query: &PageQuery) -> Result<RecordPage, UpstreamError> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {query:?}"))
    }

    fn get_record(&self, record_id: &str) -> Result<RawRecord, UpstreamError> {
        if let Some(err) = self.get_error.lock().unwrap().take() {
            return Err(err);
        }
        self.by_id
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(format!("record {record_id} does not exist")))
    }
}

pub fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

pub fn record(id: &str, pairs: &[(&str, FieldValue)]) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        fields: pairs.iter().cloned().collect(),
    }
}

/// A record that always normalizes: it carries a usable property name.
pub fn listing(n: usize) -> RawRecord {
    record(
        &format!("rec{n:08}"),
        &[
            ("物件名", text(&format!("テスト店舗物件 No.{n}"))),
            ("区", text("渋谷区")),
            ("賃料", FieldValue::Number(25.0)),
            ("面積", FieldValue::Number(30.0)),
        ],
    )
}

pub fn listings(range: std::ops::Range<usize>) -> Vec<RawRecord> {
    range.map(listing).collect()
}

/// A record with nothing to build a title from.
pub fn blank(id: &str) -> RawRecord {
    record(id, &[("備考", text("詳細未定"))])
}

pub fn fast_fetch() -> FetchSettings {
    FetchSettings {
        page_size: 100,
        max_pages: 50,
        page_delay: Duration::ZERO,
        max_attempts: 4,
        retry_base: Duration::ZERO,
    }
}

pub fn test_config(views: &[Option<&str>]) -> IngestConfig {
    IngestConfig {
        api_url: "http://127.0.0.1:9/v0".into(),
        api_token: "test-token".into(),
        base_id: "appTEST".into(),
        table: "Reins".into(),
        views: views.iter().map(|v| v.map(str::to_string)).collect(),
        probe_size: 10,
        request_timeout: Duration::from_secs(1),
        keep_partial: false,
        fetch: fast_fetch(),
        normalize: NormalizeSettings::default(),
    }
}

/// One-shot HTTP server on a free local port. Answers the first request with
/// `status` and `body`, then hands back that request's head (request line and headers).
pub fn serve_once(status: &str, body: &str) -> (String, std::thread::JoinHandle<String>) {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let api_url = format!("http://{}/v0", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&head).into_owned()
    });

    (api_url, handle)
}
