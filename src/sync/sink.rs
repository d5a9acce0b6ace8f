use std::collections::HashSet;

use crate::designer::error::DesignerError;

/// Remote element id assigned by the sidecar during one extraction pass.
///
/// Non-owning: the underlying element belongs to the host page and a handle
/// goes stale as soon as the host framework re-renders that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandle(pub u64);

/// Events replayed against a control so the host page's reactive framework
/// observes a programmatic value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Focus,
    /// Generic `input` event.
    Input,
    /// `InputEvent`-typed `input` event; some framework builds only listen
    /// for this richer variant.
    RichInput,
    Change,
    /// `blur` event followed by an actual blur of the element.
    Blur,
}

impl ControlEvent {
    /// Wire form: event name plus whether the sidecar should construct the
    /// richer `InputEvent` rather than a plain `Event`.
    pub fn wire_form(self) -> (&'static str, bool) {
        match self {
            ControlEvent::Focus => ("focus", false),
            ControlEvent::Input => ("input", false),
            ControlEvent::RichInput => ("input", true),
            ControlEvent::Change => ("change", false),
            ControlEvent::Blur => ("blur", false),
        }
    }
}

/// Write seam for the synchronizer. `BrowserSession` implements this against
/// the live page; tests use `RecordingSink`.
pub trait ControlSink {
    fn set_value(&mut self, handle: ControlHandle, value: &str) -> Result<(), DesignerError>;
    fn dispatch(&mut self, handle: ControlHandle, event: ControlEvent) -> Result<(), DesignerError>;
    fn pause(&mut self, ms: u64);
}

/// What a sink observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    SetValue(ControlHandle, String),
    Dispatch(ControlHandle, ControlEvent),
    Pause(u64),
}

/// In-memory sink for tests. Handles registered as detached fail every
/// operation, simulating a row the host re-rendered mid-batch.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
    pub detached: HashSet<ControlHandle>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detached(handles: impl IntoIterator<Item = ControlHandle>) -> Self {
        Self {
            ops: Vec::new(),
            detached: handles.into_iter().collect(),
        }
    }

    fn check(&self, handle: ControlHandle, command: &str) -> Result<(), DesignerError> {
        if self.detached.contains(&handle) {
            return Err(DesignerError::SessionProtocol {
                command: command.into(),
                error: format!("stale handle {}", handle.0),
            });
        }
        Ok(())
    }

    /// Final value written to a handle, if any.
    pub fn value_of(&self, handle: ControlHandle) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            SinkOp::SetValue(h, v) if *h == handle => Some(v.as_str()),
            _ => None,
        })
    }

    /// Events dispatched to a handle, in order.
    pub fn events_of(&self, handle: ControlHandle) -> Vec<ControlEvent> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Dispatch(h, e) if *h == handle => Some(*e),
                _ => None,
            })
            .collect()
    }
}

impl ControlSink for RecordingSink {
    fn set_value(&mut self, handle: ControlHandle, value: &str) -> Result<(), DesignerError> {
        self.check(handle, "set_value")?;
        self.ops.push(SinkOp::SetValue(handle, value.to_string()));
        Ok(())
    }

    fn dispatch(&mut self, handle: ControlHandle, event: ControlEvent) -> Result<(), DesignerError> {
        self.check(handle, "dispatch")?;
        self.ops.push(SinkOp::Dispatch(handle, event));
        Ok(())
    }

    fn pause(&mut self, ms: u64) {
        // No real sleeping in tests; the pause is still recorded so ordering
        // against events can be asserted.
        self.ops.push(SinkOp::Pause(ms));
    }
}
