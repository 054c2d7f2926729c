pub mod client;
pub mod fetcher;
pub mod models;
pub mod probe;

pub use client::{PageQuery, RecordSource, TableClient};
pub use fetcher::{CancelToken, FetchOutcome, PageFetcher};
pub use models::{Attachment, FieldValue, Fields, RawRecord, RecordPage};
pub use probe::{probe_views, ConnectionReport, ProbeOutcome};
