//! Node hierarchy stored as an arena

use super::SourceMatrix;

/// Index of a node in its [`NodeTree`]
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent node
    pub transform: SourceMatrix,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Scene node tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    pub const ROOT: NodeId = 0;

    pub fn new(root_name: impl Into<String>, transform: SourceMatrix) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.into(),
                transform,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append a node under `parent` and return its id
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a node of this tree.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: SourceMatrix,
    ) -> NodeId {
        assert!(parent < self.nodes.len(), "parent node {parent} does not exist");
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.into(),
            transform,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in depth-first pre-order, starting at the root
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![Self::ROOT],
        }
    }

    /// First node named `name` in depth-first pre-order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first().find(|&id| self.nodes[id].name == name)
    }
}

/// Pre-order traversal, children visited in insertion order
pub struct DepthFirst<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}
