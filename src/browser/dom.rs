use std::collections::HashMap;

use serde::Deserialize;

use crate::designer::error::DesignerError;

/// One node of the DOM subtree as extracted by designer_server.js.
///
/// `handle` is a remote element id assigned by the sidecar for this
/// extraction pass; it stays valid until the host framework re-renders the
/// element, at which point commands against it fail and the caller rescans.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub handle: u64,
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    /// Direct text of this node (not including descendants).
    #[serde(default)]
    pub text: Option<String>,
    /// Current value for form controls.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// offsetParent != null at extraction time.
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

fn default_visible() -> bool {
    true
}

/// Index of a node within a `DomTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct DomNode {
    pub handle: u64,
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub placeholder: Option<String>,
    pub disabled: bool,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parent-linked arena over one extraction pass. Node order is document
/// (preorder) order, which every scan in this crate relies on.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Flatten a raw extraction payload into an arena.
    pub fn from_raw(root: RawNode) -> Self {
        let mut tree = DomTree { nodes: Vec::new() };
        tree.insert(root, None);
        tree
    }

    /// Parse the `dom` field of an extract response.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DesignerError> {
        let raw: RawNode =
            serde_json::from_value(value).map_err(|e| DesignerError::JsonParse {
                context: "extracted DOM tree".into(),
                source: e,
            })?;
        Ok(Self::from_raw(raw))
    }

    fn insert(&mut self, raw: RawNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            handle: raw.handle,
            tag: raw.tag,
            id: raw.id,
            classes: raw.classes,
            attrs: raw.attrs,
            text: raw.text,
            value: raw.value,
            placeholder: raw.placeholder,
            disabled: raw.disabled,
            visible: raw.visible,
            parent,
            children: Vec::new(),
        });
        for child in raw.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Descendants of `id` (excluding `id` itself) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            for child in self.nodes[next.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            out.push(p);
            current = self.nodes[p.0].parent;
        }
        out
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes[id.0].classes.iter().any(|c| c == class)
    }

    /// Visible text of the subtree rooted at `id`, space-joined.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = &self.nodes[id.0].text {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        }
        for child in &self.nodes[id.0].children {
            self.collect_text(*child, out);
        }
    }

    /// First descendant of `scope` matching `pred`, in document order.
    pub fn find(&self, scope: NodeId, pred: impl Fn(&DomNode) -> bool) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| pred(self.node(*id)))
    }

    /// All descendants of `scope` matching `pred`, in document order.
    pub fn find_all(&self, scope: NodeId, pred: impl Fn(&DomNode) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| pred(self.node(*id)))
            .collect()
    }
}
