pub mod config;
pub mod domain;
pub mod errors;
pub mod pipeline;
pub mod reference;
pub mod upstream;

#[cfg(test)]
mod tests;

pub use config::{BoundingBox, ConfigError, FetchSettings, IngestConfig, NormalizeSettings};
pub use domain::{CanonicalProperty, PropertyType, StatsSummary};
pub use errors::{FetchError, IngestError, RecordRejected, UpstreamError};
pub use pipeline::{compute_summary, IngestReport, Ingestor};
pub use upstream::{CancelToken, ConnectionReport, RecordSource, TableClient};
