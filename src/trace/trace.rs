use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::scan::field_model::{SkippedCandidate, Snapshot};
use crate::sync::writeback::SyncReport;

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub kind: String,

    pub detail: Option<String>,
    pub count: Option<usize>,
    pub fingerprint: Option<String>,
    pub skipped: Vec<SkippedCandidate>,
    pub errors: Vec<String>,
}

impl TraceEvent {
    pub fn now(kind: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis(),
            kind: kind.to_string(),
            detail: None,
            count: None,
            fingerprint: None,
            skipped: vec![],
            errors: vec![],
        }
    }

    pub fn scan(snapshot: &Snapshot) -> Self {
        Self::now("scan")
            .with_count(snapshot.len())
            .with_fingerprint(&snapshot.fingerprint)
            .with_skipped(&snapshot.skipped)
    }

    pub fn sync(report: &SyncReport) -> Self {
        Self::now(if report.success { "sync" } else { "sync_failed" })
            .with_detail(&report.message)
            .with_errors(&report.errors)
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_skipped(mut self, skipped: &[SkippedCandidate]) -> Self {
        self.skipped = skipped.to_vec();
        self
    }

    pub fn with_errors(mut self, errors: &[String]) -> Self {
        self.errors = errors.to_vec();
        self
    }
}
