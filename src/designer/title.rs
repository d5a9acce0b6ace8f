use crate::browser::dom::DomTree;
use crate::browser::session::BrowserSession;
use crate::designer::error::DesignerError;

/// Id of the method-name input on the test-step page.
pub const METHOD_INPUT_ID: &str = "SD1_MethodName";

/// Read the method name from the page, if present and non-empty.
pub fn extract_method_name(dom: &DomTree) -> Option<String> {
    let input = dom.find(dom.root(), |n| {
        n.tag == "input" && n.id.as_deref() == Some(METHOD_INPUT_ID)
    })?;
    let value = dom.node(input).value.as_deref()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Keeps the document title equal to the current method name.
///
/// Remembers the last value pushed so repeated polls are cheap no-ops while
/// the method name is unchanged.
#[derive(Debug, Default)]
pub struct TitleTracker {
    last_method_name: Option<String>,
}

impl TitleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the method name into the title if it changed. Returns the new
    /// name when a rewrite happened.
    pub fn refresh(
        &mut self,
        dom: &DomTree,
        session: &mut BrowserSession,
    ) -> Result<Option<String>, DesignerError> {
        let Some(method_name) = extract_method_name(dom) else {
            return Ok(None);
        };
        if self.last_method_name.as_deref() == Some(method_name.as_str()) {
            return Ok(None);
        }

        session.set_title(&method_name)?;
        self.last_method_name = Some(method_name.clone());
        Ok(Some(method_name))
    }

    pub fn last(&self) -> Option<&str> {
        self.last_method_name.as_deref()
    }
}
