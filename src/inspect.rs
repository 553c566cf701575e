use crate::fields::FieldValue;
use crate::tree::{BoxTree, NodeId};
use serde::Serialize;

/// A generic labeled node for display or debugging.
///
/// Serializes to the same JSON shape the original browser widget consumed:
/// `{ "label": ..., "children": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectNode {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InspectNode>,
}

impl InspectNode {
    fn leaf(label: String) -> Self {
        Self { label, children: Vec::new() }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Project a [`BoxTree`] into a labeled display tree.
///
/// Per box: a `"Box - <type>"` node, a `size:` child, an `extended_type:`
/// child for user-type boxes, one `<field>:<value>` child per scalar field,
/// and for table fields a `<name>:<len> entries` node with one
/// `<i> - <row summary>` child per recognized row. Read-only projection; the
/// tree is never mutated.
pub fn export_inspection_tree(tree: &BoxTree) -> InspectNode {
    export_node(tree, tree.root())
}

fn export_node(tree: &BoxTree, id: NodeId) -> InspectNode {
    let node = tree.node(id);
    let mut out = InspectNode::leaf(format!("Box - {}", node.typ));

    out.children.push(InspectNode::leaf(format!("size:{}", node.size)));
    if let Some(ext) = node.extended_type {
        out.children
            .push(InspectNode::leaf(format!("extended_type:{}", hex::encode(ext))));
    }

    for (name, value) in node.fields.entries() {
        match value {
            FieldValue::Scalar(v) => {
                out.children.push(InspectNode::leaf(format!("{name}:{v}")));
            }
            FieldValue::Table { len, entries } => {
                let mut field_node = InspectNode::leaf(format!("{name}:{len} entries"));
                for (i, summary) in entries.iter().enumerate() {
                    field_node.children.push(InspectNode::leaf(format!("{i} - {summary}")));
                }
                out.children.push(field_node);
            }
        }
    }

    for child in tree.children(id) {
        out.children.push(export_node(tree, child));
    }
    out
}
