// pipeline.rs
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::domain::normalize::{normalize_all, normalize_record};
use crate::domain::property::CanonicalProperty;
use crate::domain::stats::{compute_stats, quality_report, QualityReport, StatsSummary};
use crate::errors::{IngestError, RecordRejected, UpstreamError};
use crate::upstream::client::{RecordSource, TableClient};
use crate::upstream::fetcher::{CancelToken, FetchOutcome, PageFetcher};
use crate::upstream::models::RawRecord;
use crate::upstream::probe::{probe_views, view_label, ConnectionReport};

/// Everything one ingestion run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub working_view: String,
    pub pages: usize,
    pub raw_count: usize,
    pub properties: Vec<CanonicalProperty>,
    pub rejected: Vec<RecordRejected>,
    /// The fetch stopped early and the caller asked to keep what it had.
    pub partial: bool,
    /// The page cap was hit while the upstream still had more.
    pub capped: bool,
    pub quality: QualityReport,
    /// SHA-256 of the serialized property list, base64url. Equal across runs iff the output is.
    pub fingerprint: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn stats(&self) -> StatsSummary {
        compute_stats(&self.properties)
    }
}

/// Stateless between runs: every call re-probes, re-fetches and rebuilds from scratch.
pub struct Ingestor<S: RecordSource> {
    source: S,
    config: IngestConfig,
}

impl Ingestor<TableClient> {
    pub fn from_config(config: IngestConfig) -> Result<Self, IngestError> {
        let client = TableClient::new(&config)?;
        Ok(Self::new(client, config))
    }
}

impl<S: RecordSource> Ingestor<S> {
    pub fn new(source: S, config: IngestConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Probes the candidate views and describes the first record found.
    pub fn validate_connection(&self) -> Result<ConnectionReport, IngestError> {
        let outcome = probe_views(&self.source, &self.config.views, self.config.probe_size)?;
        Ok(ConnectionReport::from_probe(&outcome))
    }

    /// Full record set, normalized. The entry point the UI layer calls.
    pub fn fetch_all(&self) -> Result<Vec<CanonicalProperty>, IngestError> {
        self.run().map(|report| report.properties)
    }

    pub fn run(&self) -> Result<IngestReport, IngestError> {
        self.run_with_cancel(&CancelToken::new())
    }

    /// As `run`, abandoning between pages once `cancel` is set.
    pub fn run_with_cancel(&self, cancel: &CancelToken) -> Result<IngestReport, IngestError> {
        let started_at = Utc::now();
        info!(table = %self.config.table, candidates = self.config.views.len(), "ingestion run started");

        let probe = probe_views(&self.source, &self.config.views, self.config.probe_size)?;
        let view = probe.view.as_deref();

        let fetcher = PageFetcher::new(&self.source, &self.config.fetch, cancel);
        let (fetched, partial) = match fetcher.fetch_all(view) {
            Ok(outcome) => (outcome, false),
            Err(failure) if self.config.keep_partial => {
                warn!(
                    records = failure.partial.len(),
                    "fetch stopped early, keeping partial data: {}",
                    failure.error
                );
                let outcome = FetchOutcome {
                    records: failure.partial,
                    pages: failure.pages,
                    capped: false,
                };
                (outcome, true)
            }
            Err(failure) => return Err(failure.error),
        };

        let report = self.build_report(view, fetched, partial, started_at);

        info!(
            raw = report.raw_count,
            valid = report.properties.len(),
            rejected = report.rejected.len(),
            partial = report.partial,
            capped = report.capped,
            quality = ?report.quality,
            "ingestion run finished"
        );

        Ok(report)
    }

    /// One record by id. `Ok(None)` when it does not exist or cannot be displayed.
    pub fn fetch_by_id(&self, record_id: &str) -> Result<Option<CanonicalProperty>, IngestError> {
        let record: RawRecord = match self.source.get_record(record_id) {
            Ok(record) => record,
            Err(UpstreamError::NotFound(_)) => return Ok(None),
            Err(source) => {
                return Err(IngestError::Record {
                    record_id: record_id.to_string(),
                    source,
                })
            }
        };

        match normalize_record(&record, &self.config.normalize) {
            Ok(property) => Ok(Some(property)),
            Err(rejected) => {
                warn!(%rejected, "requested record cannot be displayed");
                Ok(None)
            }
        }
    }

    fn build_report(
        &self,
        view: Option<&str>,
        fetched: FetchOutcome,
        partial: bool,
        started_at: DateTime<Utc>,
    ) -> IngestReport {
        let raw_count = fetched.records.len();
        let batch = normalize_all(&fetched.records, &self.config.normalize);
        let quality = quality_report(&batch.properties);
        let fingerprint = fingerprint(&batch.properties);

        IngestReport {
            working_view: view_label(view).to_string(),
            pages: fetched.pages,
            raw_count,
            properties: batch.properties,
            rejected: batch.rejected,
            partial,
            capped: fetched.capped,
            quality,
            fingerprint,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// The StatsAggregator entry point for callers holding a property list.
pub fn compute_summary(properties: &[CanonicalProperty]) -> StatsSummary {
    compute_stats(properties)
}

pub fn fingerprint(properties: &[CanonicalProperty]) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain structs and ordered maps cannot fail.
    if let Ok(bytes) = serde_json::to_vec(properties) {
        hasher.update(&bytes);
    }
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}
