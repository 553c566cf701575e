use crate::boxes::FourCC;
use crate::fields::BoxFields;

/// Synthetic type of the tree root, representing the file itself.
pub const ROOT_TYPE: FourCC = FourCC(*b"isom");

/// Index of a node in a [`BoxTree`] arena.
///
/// The parent relation is stored as an index rather than a reference, so the
/// tree has strictly hierarchical ownership with no cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One parsed box.
#[derive(Debug)]
pub struct BoxNode {
    pub typ: FourCC,
    /// Total byte length including the header.
    pub size: u64,
    /// Extended type for `uuid` boxes.
    pub extended_type: Option<[u8; 16]>,
    /// Decoded fields; `Opaque` for unrecognized leaf types.
    pub fields: BoxFields,
    /// Enclosing box; `None` only for the root.
    pub parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl BoxNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The parse result: an arena of [`BoxNode`]s rooted at a synthetic `isom`
/// node. Immutable once [`crate::parser::parse`] returns.
#[derive(Debug)]
pub struct BoxTree {
    nodes: Vec<BoxNode>,
}

impl BoxTree {
    pub(crate) fn new(total_size: u64) -> Self {
        Self {
            nodes: vec![BoxNode {
                typ: ROOT_TYPE,
                size: total_size,
                extended_type: None,
                fields: BoxFields::Container,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &BoxNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    pub(crate) fn push(
        &mut self,
        parent: NodeId,
        typ: FourCC,
        size: u64,
        extended_type: Option<[u8; 16]>,
        fields: BoxFields,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(BoxNode {
            typ,
            size,
            extended_type,
            fields,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Pre-order (document order) traversal of the subtree under `id`,
    /// excluding `id` itself.
    pub fn pre_order(&self, id: NodeId) -> PreOrder<'_> {
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.clone();
        stack.reverse();
        PreOrder { tree: self, stack }
    }
}

pub struct PreOrder<'a> {
    tree: &'a BoxTree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        for &child in self.tree.node(id).children().iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
