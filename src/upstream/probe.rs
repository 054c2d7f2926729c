// probe.rs
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::IngestError;
use crate::upstream::client::{PageQuery, RecordSource};
use crate::upstream::models::{FieldValue, RawRecord};

/// The first view that actually returned rows, plus those rows.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub view: Option<String>,
    pub sample: Vec<RawRecord>,
}

pub fn view_label(view: Option<&str>) -> &str {
    view.unwrap_or("default view")
}

/// Tries each candidate once, in order, with a small page. No retries here.
pub fn probe_views<S: RecordSource + ?Sized>(
    source: &S,
    candidates: &[Option<String>],
    sample_size: u32,
) -> Result<ProbeOutcome, IngestError> {
    let mut attempted = Vec::with_capacity(candidates.len());
    let mut last_error = None;

    for candidate in candidates {
        let label = view_label(candidate.as_deref()).to_string();
        attempted.push(label.clone());

        let query = PageQuery::new(sample_size, candidate.as_deref());
        match source.list_records(&query) {
            Ok(page) if !page.records.is_empty() => {
                info!(view = %label, records = page.records.len(), "working view found");
                return Ok(ProbeOutcome {
                    view: candidate.clone(),
                    sample: page.records,
                });
            }
            Ok(_) => {
                warn!(view = %label, "view returned 0 records");
            }
            Err(e) => {
                warn!(view = %label, category = e.category(), "view probe failed: {e}");
                last_error = Some(e.to_string());
            }
        }
    }

    Err(IngestError::Connectivity {
        attempted,
        last_error,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub name: String,
    pub kind: &'static str,
    pub preview: String,
}

/// What the probe saw, for operators chasing upstream schema drift.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub working_view: String,
    pub sample_size: usize,
    pub fields: Vec<FieldSummary>,
}

const PREVIEW_CHARS: usize = 50;

impl ConnectionReport {
    pub fn from_probe(outcome: &ProbeOutcome) -> Self {
        let fields = outcome
            .sample
            .first()
            .map(|rec| {
                rec.fields
                    .iter()
                    .map(|(name, value)| FieldSummary {
                        name: name.to_string(),
                        kind: value.kind(),
                        preview: preview(value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            working_view: view_label(outcome.view.as_deref()).to_string(),
            sample_size: outcome.sample.len(),
            fields,
        }
    }
}

fn preview(value: &FieldValue) -> String {
    match value {
        FieldValue::Attachments(items) => format!("Array({})", items.len()),
        other => {
            let text = other.to_text();
            if text.chars().count() > PREVIEW_CHARS {
                let cut: String = text.chars().take(PREVIEW_CHARS).collect();
                format!("{cut}...")
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::models::Fields;

    #[test]
    fn preview_truncates_long_text() {
        let long = "あ".repeat(80);
        let p = preview(&FieldValue::Text(long));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn report_describes_first_record() {
        let fields: Fields = vec![
            ("物件名", FieldValue::Text("テストビル".into())),
            ("面積", FieldValue::Number(45.3)),
        ]
        .into_iter()
        .collect();

        let outcome = ProbeOutcome {
            view: None,
            sample: vec![RawRecord {
                id: "rec1".into(),
                fields,
            }],
        };

        let report = ConnectionReport::from_probe(&outcome);
        assert_eq!(report.working_view, "default view");
        assert_eq!(report.fields.len(), 2);
        assert_eq!(report.fields[1].kind, "number");
        assert_eq!(report.fields[1].preview, "45.3");
    }
}
