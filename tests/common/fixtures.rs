use serde_json::{Value, json};

use designer_step_editor::browser::dom::DomTree;

/// Builder for one input row's DOM subtree, shaped like the Service
/// Designer's rendered grid markup.
pub struct RowFixture {
    key: String,
    base_handle: u64,
    type_span: Option<String>,
    type_select: Option<String>,
    name_value: Option<String>,
    extra_text: Option<String>,
    mandatory_cell: Option<String>,
    value: Option<String>,
    textarea_visible: bool,
    with_test_case_row: bool,
    with_container: bool,
}

impl RowFixture {
    pub fn new(key: &str, base_handle: u64) -> Self {
        Self {
            key: key.to_string(),
            base_handle,
            type_span: None,
            type_select: None,
            name_value: None,
            extra_text: None,
            mandatory_cell: None,
            value: None,
            textarea_visible: true,
            with_test_case_row: true,
            with_container: true,
        }
    }

    /// Handle of the row's value textarea.
    pub fn control_handle(&self) -> u64 {
        self.base_handle + 90
    }

    pub fn type_span(mut self, label: &str) -> Self {
        self.type_span = Some(label.to_string());
        self
    }

    pub fn type_select(mut self, label: &str) -> Self {
        self.type_select = Some(label.to_string());
        self
    }

    pub fn name_input(mut self, value: &str) -> Self {
        self.name_value = Some(value.to_string());
        self
    }

    /// Free text inside the container (field codes, asterisks, ...).
    pub fn extra_text(mut self, text: &str) -> Self {
        self.extra_text = Some(text.to_string());
        self
    }

    pub fn mandatory_cell(mut self, text: &str) -> Self {
        self.mandatory_cell = Some(text.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn hidden_textarea(mut self) -> Self {
        self.textarea_visible = false;
        self
    }

    pub fn without_test_case_row(mut self) -> Self {
        self.with_test_case_row = false;
        self
    }

    pub fn without_container(mut self) -> Self {
        self.with_container = false;
        self
    }

    pub fn build(&self) -> Value {
        let h = self.base_handle;

        // Key marker node carrying the INPUT_LIST_ id
        let marker = json!({
            "handle": h + 1,
            "tag": "span",
            "id": format!("INPUT_LIST_{}", self.key),
        });

        // Cell 1: display name input
        let mut name_cell_children = vec![json!({
            "handle": h + 11,
            "tag": "input",
            "placeholder": "Enter Here",
            "value": self.name_value.clone().unwrap_or_default(),
        })];
        if let Some(text) = &self.extra_text {
            name_cell_children.push(json!({
                "handle": h + 12,
                "tag": "span",
                "text": text,
            }));
        }
        let name_cell = json!({
            "handle": h + 10,
            "tag": "div",
            "classes": ["service-designer__grid-cell"],
            "children": name_cell_children,
        });

        // Cell 2: declared type
        let mut type_cell_children = Vec::new();
        if let Some(label) = &self.type_span {
            type_cell_children.push(json!({
                "handle": h + 21,
                "tag": "span",
                "text": label,
            }));
        }
        if let Some(label) = &self.type_select {
            type_cell_children.push(json!({
                "handle": h + 22,
                "tag": "div",
                "classes": ["ui-select-match-text"],
                "text": label,
            }));
        }
        let type_cell = json!({
            "handle": h + 20,
            "tag": "div",
            "classes": ["service-designer__grid-cell"],
            "children": type_cell_children,
        });

        let mut container_children = vec![marker, name_cell, type_cell];

        if let Some(text) = &self.mandatory_cell {
            container_children.push(json!({
                "handle": h + 30,
                "tag": "div",
                "classes": ["service-designer__grid-cell", "_mandatory"],
                "text": text,
            }));
        }

        if self.with_test_case_row {
            let mut test_case_children = Vec::new();
            test_case_children.push(json!({
                "handle": self.control_handle(),
                "tag": "textarea",
                "value": self.value.clone().unwrap_or_default(),
                "visible": self.textarea_visible,
            }));
            container_children.push(json!({
                "handle": h + 40,
                "tag": "div",
                "classes": ["service-designer__grid-row", "_test-case-row"],
                "children": test_case_children,
            }));
        }

        if !self.with_container {
            // Marker floats outside any grid row: deep, row-less wrapper chain
            return json!({
                "handle": h,
                "tag": "div",
                "children": [json!({
                    "handle": h + 1,
                    "tag": "span",
                    "id": format!("INPUT_LIST_{}", self.key),
                })],
            });
        }

        json!({
            "handle": h,
            "tag": "div",
            "classes": ["service-designer__grid-row"],
            "children": container_children,
        })
    }
}

/// Wrap rows into a page tree.
pub fn page(rows: Vec<Value>) -> DomTree {
    let raw = json!({
        "handle": 1,
        "tag": "body",
        "children": [{
            "handle": 2,
            "tag": "div",
            "classes": ["service-designer__inputs"],
            "children": rows,
        }],
    });
    DomTree::from_value(raw).expect("fixture tree parses")
}

/// A typical two-field step: a mandatory Number "amount" and a Json "payload".
pub fn two_field_page() -> DomTree {
    page(vec![
        RowFixture::new("amount", 100)
            .type_span("Number")
            .name_input("Amount")
            .extra_text("*")
            .value("42.5")
            .build(),
        RowFixture::new("payload", 200)
            .type_span("Json")
            .value(r#"{"a": 1}"#)
            .build(),
    ])
}
