use crate::browser::dom::{DomNode, DomTree, NodeId};
use crate::browser::session::BrowserSession;
use crate::designer::error::DesignerError;
use crate::sync::sink::ControlHandle;

/// Ways the host renders its Run Test exp-button, tried in order. The
/// misspelled `arialabel` attribute ships in some host builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunTestSelector {
    Id,
    Class,
    AriaLabel,
    AriaLabelMisspelled,
}

const RUN_TEST_SELECTORS: &[RunTestSelector] = &[
    RunTestSelector::Id,
    RunTestSelector::Class,
    RunTestSelector::AriaLabel,
    RunTestSelector::AriaLabelMisspelled,
];

fn matches_selector(node: &DomNode, selector: RunTestSelector) -> bool {
    if node.tag != "exp-button" {
        return false;
    }
    match selector {
        RunTestSelector::Id => node.id.as_deref() == Some("runTest"),
        RunTestSelector::Class => node.classes.iter().any(|c| c == "run_test_btn"),
        RunTestSelector::AriaLabel => node.attrs.get("aria-label").map(String::as_str) == Some("run Test"),
        RunTestSelector::AriaLabelMisspelled => {
            node.attrs.get("arialabel").map(String::as_str) == Some("run Test")
        }
    }
}

/// Find the clickable inner button of the page's Run Test control.
///
/// Walks the selector fallbacks in order, skipping hidden exp-buttons, and
/// returns the first visible one whose inner `<button>` is enabled.
pub fn find_run_test_button(dom: &DomTree) -> Option<ControlHandle> {
    for selector in RUN_TEST_SELECTORS {
        let candidates: Vec<NodeId> = dom.find_all(dom.root(), |n| matches_selector(n, *selector));
        for exp in candidates {
            if !dom.node(exp).visible {
                continue;
            }
            if let Some(button) = dom.find(exp, |n| n.tag == "button" && !n.disabled) {
                return Some(ControlHandle(dom.node(button).handle));
            }
        }
    }
    None
}

/// Click the Run Test button on the current page.
pub fn trigger_run_test(session: &mut BrowserSession) -> Result<(), DesignerError> {
    let (_title, dom) = session.extract()?;
    let button = find_run_test_button(&dom).ok_or_else(|| DesignerError::ElementNotFound {
        element: "Run Test button".into(),
        context: "no visible, enabled exp-button matched any known selector".into(),
    })?;
    session.click(button)
}
