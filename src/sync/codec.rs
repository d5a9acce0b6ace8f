use std::fmt;

use serde_json::{Map, Number, Value};

use crate::scan::field_model::{FieldDescriptor, Snapshot};
use crate::scan::types::TypeTag;

// ============================================================================
// Snapshot -> JSON (typed decode of control values)
// ============================================================================

/// Render a snapshot as one JSON object: one entry per descriptor, key order
/// = snapshot order (serde_json is built with `preserve_order`).
pub fn snapshot_to_json(snapshot: &Snapshot) -> Map<String, Value> {
    let mut out = Map::new();
    for field in &snapshot.fields {
        out.insert(
            field.key.clone(),
            decode_value(field.field_type, &field.current_value),
        );
    }
    out
}

/// Convert one control's raw string per its declared type.
///
/// Empty/whitespace is always null. Structured tags parse as JSON and fall
/// back to the raw string when unparseable; a bad value in one control must
/// never poison the whole export. Boolean accepts "true" and "1". Numbers
/// that fail to parse become null.
pub fn decode_value(tag: TypeTag, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }

    match tag {
        TypeTag::Json | TypeTag::Array | TypeTag::Map | TypeTag::StructuredData => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        TypeTag::Boolean => Value::Bool(raw == "true" || raw == "1"),
        TypeTag::Number | TypeTag::Integer => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::String(raw.to_string()),
    }
}

// ============================================================================
// JSON -> sync plan (validate + route)
// ============================================================================

/// A fatal reason one sync attempt wrote nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The submitted text is not parseable JSON, or not an object.
    InvalidJson(String),
    /// The submitted JSON references fields absent from the snapshot.
    /// All-or-nothing: nothing is written.
    UnknownKeys {
        unknown: Vec<String>,
        available: Vec<String>,
    },
    /// No input rows exist on the page at sync time.
    NoFields,
}

impl SyncError {
    /// User-facing reason lines, matching what the editor surface renders.
    pub fn messages(&self) -> Vec<String> {
        match self {
            SyncError::InvalidJson(reason) => vec![format!("Invalid JSON: {}", reason)],
            SyncError::UnknownKeys { unknown, available } => vec![
                format!("Input(s) not found on page: {}", unknown.join(", ")),
                format!("Available inputs: {}", available.join(", ")),
            ],
            SyncError::NoFields => vec![
                "No inputs found on page. Make sure you are on the correct step.".to_string(),
            ],
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// One field write the synchronizer should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEntry {
    pub field: FieldDescriptor,
    pub value: Value,
}

/// Validated per-field updates, in the submitted object's entry order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    pub entries: Vec<SyncEntry>,
}

/// Parse submitted JSON text and resolve every entry against the snapshot.
///
/// Fails without producing any writes when the text is not a JSON object,
/// when the page has no inputs, or when any key is unknown (reporting both
/// the offending keys and the full valid set, to guide correction).
pub fn plan_sync(json_text: &str, snapshot: &Snapshot) -> Result<SyncPlan, SyncError> {
    let parsed: Value = serde_json::from_str(json_text)
        .map_err(|e| SyncError::InvalidJson(e.to_string()))?;

    let Value::Object(object) = parsed else {
        return Err(SyncError::InvalidJson(
            "JSON must be an object with key-value pairs".to_string(),
        ));
    };

    if snapshot.is_empty() {
        return Err(SyncError::NoFields);
    }

    let unknown: Vec<String> = object
        .keys()
        .filter(|key| snapshot.get(key).is_none())
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(SyncError::UnknownKeys {
            unknown,
            available: snapshot.keys().iter().map(|k| k.to_string()).collect(),
        });
    }

    let entries = object
        .into_iter()
        .map(|(key, value)| {
            // Unwrap is safe: unknown keys were rejected above.
            let field = snapshot.get(&key).cloned().unwrap();
            SyncEntry { field, value }
        })
        .collect();

    Ok(SyncPlan { entries })
}
