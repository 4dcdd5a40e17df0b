//! Name -> node lookup built once per scene

use hashbrown::HashMap;

use super::{NodeId, NodeTree};

/// Maps node names to node ids
///
/// When several nodes share a name the first one in depth-first pre-order is
/// kept, which is the node a recursive search from the root would return.
/// The shadowed names are listed in [`NodeIndex::duplicates`].
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    by_name: HashMap<String, NodeId>,
    duplicates: Vec<String>,
}

impl NodeIndex {
    pub fn build(tree: &NodeTree) -> Self {
        let mut by_name = HashMap::with_capacity(tree.len());
        let mut duplicates = Vec::new();

        for id in tree.depth_first() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if by_name.contains_key(node.name.as_str()) {
                if !duplicates.contains(&node.name) {
                    duplicates.push(node.name.clone());
                }
                continue;
            }
            by_name.insert(node.name.clone(), id);
        }

        if !duplicates.is_empty() {
            tracing::warn!(
                "Scene has {} duplicated node name(s), first match wins: {:?}",
                duplicates.len(),
                duplicates
            );
        }

        Self {
            by_name,
            duplicates,
        }
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Names carried by more than one node
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
