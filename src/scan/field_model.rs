use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::scan::types::TypeTag;
use crate::sync::sink::ControlHandle;

/// One discovered input row on the test-step page.
///
/// `control` points at the live value textarea and is only good until the
/// host framework re-renders the row; everything else is a plain value
/// captured at scan time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Stable identifier parsed from the row's id attribute. Unique within
    /// one scan.
    pub key: String,
    /// Human-readable label; falls back to `key`.
    pub name: String,
    pub field_type: TypeTag,
    pub mandatory: bool,
    pub control: ControlHandle,
    /// Control value at scan time (empty string if unset).
    pub current_value: String,
}

/// Why a candidate row was dropped from a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// No grid-row ancestor within the depth bound.
    NoContainer,
    /// Test-case sub-row or its textarea is missing.
    NoValueControl,
    /// The textarea exists but is not currently visible.
    ControlHidden,
    /// A previous candidate already claimed this key.
    DuplicateKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub key: String,
    pub reason: SkipReason,
}

/// Result of one locator pass: descriptors in document order plus the
/// candidates that were dropped along the way.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub fields: Vec<FieldDescriptor>,
    pub skipped: Vec<SkippedCandidate>,
}

/// One coherent pass's worth of field descriptors, as held by the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub fields: Vec<FieldDescriptor>,
    pub skipped: Vec<SkippedCandidate>,
    /// sha1 over key/type pairs; changes whenever the set of inputs (or
    /// their declared types) changes between scans.
    pub fingerprint: String,
}

impl Snapshot {
    pub fn from_report(report: ScanReport) -> Self {
        let fingerprint = fingerprint_fields(&report.fields);
        Snapshot {
            fields: report.fields,
            skipped: report.skipped,
            fingerprint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Keys in snapshot order.
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }

    pub fn mandatory_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.mandatory)
            .map(|f| f.key.as_str())
            .collect()
    }
}

fn fingerprint_fields(fields: &[FieldDescriptor]) -> String {
    let mut hasher = Sha1::new();
    for field in fields {
        hasher.update(field.key.as_bytes());
        hasher.update(b":");
        hasher.update(field.field_type.label().as_bytes());
        hasher.update(b";");
    }
    format!("{:x}", hasher.finalize())
}
