use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::browser::dom::{DomNode, DomTree, NodeId};
use crate::scan::field_model::{FieldDescriptor, ScanReport, SkipReason, SkippedCandidate};
use crate::scan::types::{TypeTag, normalize_type};
use crate::sync::sink::ControlHandle;

// ============================================================================
// Host DOM contract
// ============================================================================
//
// These selectors are reverse-engineered from the Service Designer's rendered
// markup. Any host-page redesign invalidates them; that fragility is accepted
// and the locator degrades by dropping rows rather than failing.

/// Element ids of input rows start with this; the suffix is the field key.
pub const INPUT_KEY_PREFIX: &str = "INPUT_LIST_";
/// Class of an input row's container.
pub const ROW_CLASS: &str = "service-designer__grid-row";
/// Class of a column inside a row.
pub const CELL_CLASS: &str = "service-designer__grid-cell";
/// Extra class of the nested sub-row holding the test value textarea.
pub const TEST_CASE_ROW_CLASS: &str = "_test-case-row";
/// Extra class of the cell carrying the explicit mandatory flag.
pub const MANDATORY_CELL_CLASS: &str = "_mandatory";
/// Class of the selected option text in the host's type dropdown.
pub const TYPE_SELECT_CLASS: &str = "ui-select-match-text";
/// Placeholder of the single-line input carrying the field's display name.
pub const NAME_PLACEHOLDER: &str = "Enter Here";
/// How many ancestors to walk when looking for the row container.
pub const MAX_CONTAINER_DEPTH: usize = 15;

static FIELD_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Field Code:\s*#\{([^}]+)\}").expect("field code regex"));

// ============================================================================
// Field location
// ============================================================================

/// Scan the page for input rows.
///
/// Walks every `INPUT_LIST_*` id, resolves each candidate's container, type,
/// display name, mandatory flag and live value control. A candidate that
/// cannot be fully resolved is recorded as skipped; one bad row never aborts
/// the scan. Descriptors come back in document order with unique keys.
pub fn locate_fields(dom: &DomTree) -> ScanReport {
    let mut report = ScanReport::default();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for (key, node) in find_input_keys(dom) {
        if !seen_keys.insert(key.clone()) {
            report.skipped.push(SkippedCandidate {
                key,
                reason: SkipReason::DuplicateKey,
            });
            continue;
        }

        let Some(container) = find_container(dom, node) else {
            report.skipped.push(SkippedCandidate {
                key,
                reason: SkipReason::NoContainer,
            });
            continue;
        };

        let field_type = extract_data_type(dom, container);

        let control = match find_value_control(dom, container) {
            Ok(control) => control,
            Err(reason) => {
                report.skipped.push(SkippedCandidate { key, reason });
                continue;
            }
        };

        let name = extract_input_name(dom, container, &key);
        let mandatory = is_mandatory(dom, container);
        let current_value = dom.node(control).value.clone().unwrap_or_default();

        report.fields.push(FieldDescriptor {
            key,
            name,
            field_type,
            mandatory,
            control: ControlHandle(dom.node(control).handle),
            current_value,
        });
    }

    report
}

/// Step 1: every node whose id carries the key prefix, paired with its key.
fn find_input_keys(dom: &DomTree) -> Vec<(String, NodeId)> {
    dom.iter()
        .filter_map(|id| {
            let node = dom.node(id);
            let elem_id = node.id.as_deref()?;
            let key = elem_id.strip_prefix(INPUT_KEY_PREFIX)?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), id))
        })
        .collect()
}

/// Step 2: nearest ancestor (or the node itself) carrying the row class,
/// within the depth bound.
fn find_container(dom: &DomTree, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .take(MAX_CONTAINER_DEPTH)
        .find(|id| dom.has_class(*id, ROW_CLASS))
}

/// Step 3: declared type from the second grid cell. Strategies in priority
/// order; anything unresolvable defaults to Text.
fn extract_data_type(dom: &DomTree, container: NodeId) -> TypeTag {
    let cells = dom.find_all(container, |n| n.classes.iter().any(|c| c == CELL_CLASS));
    if cells.len() < 2 {
        return TypeTag::Text;
    }
    let type_cell = cells[1];

    let label = type_label_from_span(dom, type_cell).or_else(|| type_label_from_select(dom, type_cell));
    normalize_type(label.as_deref())
}

/// First short, special-character-free span inside the type cell.
fn type_label_from_span(dom: &DomTree, type_cell: NodeId) -> Option<String> {
    for span in dom.find_all(type_cell, |n| n.tag == "span") {
        let text = dom.text_content(span);
        if !text.is_empty() && text.len() < 30 && !has_special_chars(&text) {
            return Some(text);
        }
    }
    None
}

/// Selected option text of the host's type dropdown.
fn type_label_from_select(dom: &DomTree, type_cell: NodeId) -> Option<String> {
    let select = dom.find(type_cell, |n| n.classes.iter().any(|c| c == TYPE_SELECT_CLASS))?;
    let text = dom.text_content(select);
    if text.is_empty() { None } else { Some(text) }
}

fn has_special_chars(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | '#' | '@'))
}

/// Step 4: the live value textarea inside the test-case sub-row. Rows whose
/// control is missing or hidden cannot be synchronized and are dropped.
fn find_value_control(dom: &DomTree, container: NodeId) -> Result<NodeId, SkipReason> {
    let test_case_row = dom
        .find(container, |n| {
            n.classes.iter().any(|c| c == ROW_CLASS)
                && n.classes.iter().any(|c| c == TEST_CASE_ROW_CLASS)
        })
        .ok_or(SkipReason::NoValueControl)?;

    let textarea = dom
        .find(test_case_row, |n| n.tag == "textarea")
        .ok_or(SkipReason::NoValueControl)?;

    if !dom.node(textarea).visible {
        return Err(SkipReason::ControlHidden);
    }
    Ok(textarea)
}

/// Step 5: display name. Name input in the first cell wins, then the field
/// code token anywhere in the container's text, then the key itself.
fn extract_input_name(dom: &DomTree, container: NodeId, key: &str) -> String {
    name_from_placeholder_input(dom, container)
        .or_else(|| name_from_field_code(dom, container))
        .unwrap_or_else(|| key.to_string())
}

fn name_from_placeholder_input(dom: &DomTree, container: NodeId) -> Option<String> {
    let cells = dom.find_all(container, |n| n.classes.iter().any(|c| c == CELL_CLASS));
    let name_cell = *cells.first()?;

    let input = dom.find(name_cell, |n| {
        n.tag == "input" && n.placeholder.as_deref() == Some(NAME_PLACEHOLDER)
    })?;
    let value = dom.node(input).value.as_deref()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn name_from_field_code(dom: &DomTree, container: NodeId) -> Option<String> {
    let text = dom.text_content(container);
    FIELD_CODE_RE
        .captures(&text)
        .map(|caps| caps[1].to_string())
}

/// Step 6: mandatory flag. The generic asterisk/mandatory/required pattern
/// implies mandatory, but an explicit `_mandatory` cell is authoritative:
/// only its own text "yes" counts.
fn is_mandatory(dom: &DomTree, container: NodeId) -> bool {
    let text = dom.text_content(container);
    let lower = text.to_lowercase();
    if !(text.contains('*') || lower.contains("mandatory") || lower.contains("required")) {
        return false;
    }

    let mandatory_cell = dom.find(container, |n: &DomNode| {
        n.classes.iter().any(|c| c == CELL_CLASS)
            && n.classes.iter().any(|c| c == MANDATORY_CELL_CLASS)
    });

    match mandatory_cell {
        Some(cell) => dom.text_content(cell).trim().eq_ignore_ascii_case("yes"),
        None => true,
    }
}
