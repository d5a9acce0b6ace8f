use serde_json::Value;

use crate::designer::error::DesignerError;
use crate::scan::cache::{DomSource, SnapshotCache};
use crate::scan::field_model::FieldDescriptor;
use crate::sync::codec::plan_sync;
use crate::sync::sink::{ControlEvent, ControlSink};

// ============================================================================
// Write-back event protocol
// ============================================================================

/// One step of the write-back protocol: wait, then dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritebackStep {
    pub event: ControlEvent,
    pub delay_before_ms: u64,
}

/// The event sequence the host framework must observe after a programmatic
/// value change, in strict order. The duplicate input dispatch (generic event
/// then InputEvent) and the inter-step delays are a compatibility contract
/// with the host framework's change detection: it needs a tick to react to
/// each event before the next one is meaningful.
pub const WRITEBACK_SEQUENCE: &[WritebackStep] = &[
    WritebackStep { event: ControlEvent::Focus, delay_before_ms: 0 },
    WritebackStep { event: ControlEvent::Input, delay_before_ms: 10 },
    WritebackStep { event: ControlEvent::RichInput, delay_before_ms: 0 },
    WritebackStep { event: ControlEvent::Change, delay_before_ms: 10 },
    WritebackStep { event: ControlEvent::Blur, delay_before_ms: 10 },
];

/// String form a value takes inside the control, per the field's type.
/// Null becomes the empty string; structured tags pretty-print nested JSON
/// with 2-space indentation; everything else converts generically.
pub fn value_to_control_string(field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) if field.field_type.is_structured() => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write one value into a field's live control and replay the protocol.
///
/// Returns false (after logging) on any failure, typically a control the
/// host re-rendered since the scan. Never propagates: a bad control must not
/// abort the rest of a batch.
pub fn apply_value(sink: &mut dyn ControlSink, field: &FieldDescriptor, value: &Value) -> bool {
    let text = value_to_control_string(field, value);

    let outcome: Result<(), DesignerError> = (|| {
        sink.set_value(field.control, &text)?;
        for step in WRITEBACK_SEQUENCE {
            if step.delay_before_ms > 0 {
                sink.pause(step.delay_before_ms);
            }
            sink.dispatch(field.control, step.event)?;
        }
        Ok(())
    })();

    match outcome {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Warning: could not populate '{}': {}", field.key, e);
            false
        }
    }
}

// ============================================================================
// Batch sync
// ============================================================================

/// Terminal outcome of one sync attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// True when at least one field applied.
    pub success: bool,
    pub message: String,
    /// Fatal reasons (nothing written) or partial-failure warnings.
    pub errors: Vec<String>,
}

impl SyncReport {
    fn failed(errors: Vec<String>) -> Self {
        SyncReport {
            success: false,
            message: String::new(),
            errors,
        }
    }
}

/// Validate submitted JSON against a fresh scan and write every entry back.
///
/// Always forces a rescan: edits must apply against current DOM state, never
/// a cached snapshot. Validation failures write nothing. Individual write
/// failures (controls detached mid-batch) are collected as warnings; applied
/// fields are not rolled back, partial success is a valid terminal outcome.
pub fn sync_json_to_inputs<S>(
    json_text: &str,
    cache: &mut SnapshotCache,
    session: &mut S,
) -> SyncReport
where
    S: DomSource + ControlSink,
{
    let snapshot = match cache.snapshot(session, true) {
        Ok(snapshot) => snapshot,
        Err(e) => return SyncReport::failed(vec![format!("Could not scan inputs: {}", e)]),
    };

    let plan = match plan_sync(json_text, &snapshot) {
        Ok(plan) => plan,
        Err(e) => return SyncReport::failed(e.messages()),
    };

    let total = plan.entries.len();
    let mut applied = 0usize;
    let mut failed: Vec<String> = Vec::new();

    for entry in &plan.entries {
        if apply_value(session, &entry.field, &entry.value) {
            applied += 1;
        } else {
            failed.push(entry.field.key.clone());
        }
    }

    let mut errors = Vec::new();
    if !failed.is_empty() {
        errors.push(format!("Failed to populate: {}", failed.join(", ")));
    }

    SyncReport {
        success: applied > 0,
        message: format!("Populated {} of {} input(s)", applied, total),
        errors,
    }
}
