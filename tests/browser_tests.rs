use serde_json::json;

use std::time::Duration;

use designer_step_editor::browser::dom::DomTree;
use designer_step_editor::browser::session::BrowserRequest;
use designer_step_editor::designer::error::DesignerError;
use designer_step_editor::designer::retry::{RetryPolicy, retry_until};
use designer_step_editor::designer::run_test::find_run_test_button;
use designer_step_editor::designer::title::extract_method_name;
use designer_step_editor::sync::sink::{ControlEvent, ControlHandle};

// =========================================================================
// Wire shapes
// =========================================================================

fn wire(request: &BrowserRequest) -> serde_json::Value {
    serde_json::to_value(request).unwrap()
}

#[test]
fn requests_serialize_with_cmd_discriminant() {
    assert_eq!(
        wire(&BrowserRequest::navigate("https://host/step/1")),
        json!({"cmd": "navigate", "url": "https://host/step/1"})
    );
    assert_eq!(wire(&BrowserRequest::extract()), json!({"cmd": "extract"}));
    assert_eq!(
        wire(&BrowserRequest::set_value(ControlHandle(7), "42.5")),
        json!({"cmd": "set_value", "handle": 7, "value": "42.5"})
    );
    assert_eq!(
        wire(&BrowserRequest::click(ControlHandle(9))),
        json!({"cmd": "click", "handle": 9})
    );
    assert_eq!(
        wire(&BrowserRequest::set_title("Create Order")),
        json!({"cmd": "set_title", "title": "Create Order"})
    );
    assert_eq!(
        wire(&BrowserRequest::wait(250)),
        json!({"cmd": "wait", "duration_ms": 250})
    );
    assert_eq!(wire(&BrowserRequest::quit()), json!({"cmd": "quit"}));
}

#[test]
fn plain_dispatch_omits_the_rich_flag() {
    assert_eq!(
        wire(&BrowserRequest::dispatch(ControlHandle(7), ControlEvent::Change)),
        json!({"cmd": "dispatch", "handle": 7, "event": "change"})
    );
}

#[test]
fn rich_input_dispatch_carries_the_flag() {
    assert_eq!(
        wire(&BrowserRequest::dispatch(ControlHandle(7), ControlEvent::RichInput)),
        json!({"cmd": "dispatch", "handle": 7, "event": "input", "rich": true})
    );
}

#[test]
fn both_input_variants_share_the_event_name() {
    assert_eq!(ControlEvent::Input.wire_form(), ("input", false));
    assert_eq!(ControlEvent::RichInput.wire_form(), ("input", true));
}

// =========================================================================
// DOM tree parsing and traversal
// =========================================================================

#[test]
fn tree_parses_from_extraction_payload() {
    let dom = DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [
            {
                "handle": 2,
                "tag": "div",
                "classes": ["outer"],
                "children": [
                    {"handle": 3, "tag": "span", "text": "hello"},
                    {"handle": 4, "tag": "span", "text": "world"},
                ],
            },
            {"handle": 5, "tag": "input", "value": "x", "visible": false},
        ],
    }))
    .expect("payload parses");

    assert_eq!(dom.node(dom.root()).tag, "body");
    assert_eq!(dom.iter().count(), 5);
    assert_eq!(dom.text_content(dom.root()), "hello world");

    let input = dom.find(dom.root(), |n| n.tag == "input").unwrap();
    assert!(!dom.node(input).visible, "Explicit visible:false survives");
    assert_eq!(dom.node(input).value.as_deref(), Some("x"));

    let span = dom.find(dom.root(), |n| n.text.as_deref() == Some("world")).unwrap();
    let ancestor_tags: Vec<&str> = dom
        .ancestors(span)
        .into_iter()
        .map(|id| dom.node(id).tag.as_str())
        .collect();
    assert_eq!(ancestor_tags, ["div", "body"], "Nearest ancestor first");
}

#[test]
fn visibility_defaults_to_true() {
    let dom = DomTree::from_value(json!({"handle": 1, "tag": "div"})).unwrap();
    assert!(dom.node(dom.root()).visible);
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(DomTree::from_value(json!({"tag": "div"})).is_err(), "Missing handle");
    assert!(DomTree::from_value(json!("not a node")).is_err());
}

// =========================================================================
// Run Test button discovery
// =========================================================================

fn exp_button(extra: serde_json::Value, inner_disabled: bool, visible: bool) -> serde_json::Value {
    let mut node = json!({
        "handle": 10,
        "tag": "exp-button",
        "visible": visible,
        "children": [{
            "handle": 11,
            "tag": "button",
            "disabled": inner_disabled,
        }],
    });
    node.as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    node
}

fn page_with(button: serde_json::Value) -> DomTree {
    DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [button],
    }))
    .unwrap()
}

#[test]
fn finds_button_by_id() {
    let dom = page_with(exp_button(json!({"id": "runTest"}), false, true));
    assert_eq!(find_run_test_button(&dom), Some(ControlHandle(11)));
}

#[test]
fn finds_button_by_class() {
    let dom = page_with(exp_button(json!({"classes": ["run_test_btn"]}), false, true));
    assert_eq!(find_run_test_button(&dom), Some(ControlHandle(11)));
}

#[test]
fn finds_button_by_aria_label() {
    let dom = page_with(exp_button(json!({"attrs": {"aria-label": "run Test"}}), false, true));
    assert_eq!(find_run_test_button(&dom), Some(ControlHandle(11)));
}

#[test]
fn finds_button_by_misspelled_aria_label() {
    let dom = page_with(exp_button(json!({"attrs": {"arialabel": "run Test"}}), false, true));
    assert_eq!(find_run_test_button(&dom), Some(ControlHandle(11)));
}

#[test]
fn hidden_exp_button_is_skipped() {
    let dom = page_with(exp_button(json!({"id": "runTest"}), false, false));
    assert_eq!(find_run_test_button(&dom), None);
}

#[test]
fn disabled_inner_button_is_skipped() {
    let dom = page_with(exp_button(json!({"id": "runTest"}), true, true));
    assert_eq!(find_run_test_button(&dom), None);
}

#[test]
fn id_match_wins_over_later_selectors() {
    // Two candidates: a class-matched button earlier in the document and an
    // id-matched one later. Selector priority beats document order.
    let dom = DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [
            {
                "handle": 20,
                "tag": "exp-button",
                "classes": ["run_test_btn"],
                "children": [{"handle": 21, "tag": "button"}],
            },
            {
                "handle": 30,
                "tag": "exp-button",
                "id": "runTest",
                "children": [{"handle": 31, "tag": "button"}],
            },
        ],
    }))
    .unwrap();
    assert_eq!(find_run_test_button(&dom), Some(ControlHandle(31)));
}

#[test]
fn plain_button_without_exp_wrapper_is_ignored() {
    let dom = DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [{"handle": 2, "tag": "button", "id": "runTest"}],
    }))
    .unwrap();
    assert_eq!(find_run_test_button(&dom), None);
}

// =========================================================================
// Bounded retry
// =========================================================================

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

#[test]
fn retry_stops_at_first_success() {
    let mut attempts = 0;
    let found = retry_until(fast_policy(5), || {
        attempts += 1;
        Ok(if attempts == 3 { Some("grid") } else { None })
    })
    .unwrap();

    assert_eq!(found, Some("grid"));
    assert_eq!(attempts, 3, "No attempts after the first success");
}

#[test]
fn retry_gives_up_after_max_attempts() {
    let mut attempts = 0;
    let found: Option<()> = retry_until(fast_policy(4), || {
        attempts += 1;
        Ok(None)
    })
    .unwrap();

    assert_eq!(found, None);
    assert_eq!(attempts, 4);
}

#[test]
fn retry_propagates_errors_immediately() {
    let mut attempts = 0;
    let result: Result<Option<()>, _> = retry_until(fast_policy(10), || {
        attempts += 1;
        Err(DesignerError::SessionIO("pipe closed".into()))
    });

    assert!(result.is_err());
    assert_eq!(attempts, 1, "Errors are not retried");
}

// =========================================================================
// Method name extraction
// =========================================================================

#[test]
fn method_name_comes_from_the_dedicated_input() {
    let dom = DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [{
            "handle": 2,
            "tag": "input",
            "id": "SD1_MethodName",
            "value": "  Create Order  ",
        }],
    }))
    .unwrap();
    assert_eq!(extract_method_name(&dom).as_deref(), Some("Create Order"));
}

#[test]
fn blank_method_name_is_absent() {
    let dom = DomTree::from_value(json!({
        "handle": 1,
        "tag": "body",
        "children": [{
            "handle": 2,
            "tag": "input",
            "id": "SD1_MethodName",
            "value": "   ",
        }],
    }))
    .unwrap();
    assert_eq!(extract_method_name(&dom), None);
}

#[test]
fn missing_method_input_is_absent() {
    let dom = DomTree::from_value(json!({"handle": 1, "tag": "body"})).unwrap();
    assert_eq!(extract_method_name(&dom), None);
}
