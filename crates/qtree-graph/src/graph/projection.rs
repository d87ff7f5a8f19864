//! Tree → node/link projection
//!
//! The graph never owns the tree. Each time the tree changes it is flattened
//! again into a node list (pre-order) and one parent→child link per tree
//! edge, so `links.len() == nodes.len() - 1` for any non-empty tree.

use std::collections::HashMap;

use qtree_types::{NodeId, ViewData};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub id: NodeId,
    /// Question text shown under the node
    pub label: String,
    /// Root = 0
    pub depth: usize,
    pub child_count: usize,
    /// Index of the parent in [`GraphProjection::nodes`]
    pub parent: Option<usize>,
}

impl ProjectedNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Directed link by node index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectedLink {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphProjection {
    pub nodes: Vec<ProjectedNode>,
    pub links: Vec<ProjectedLink>,
    /// First index of each id (ids repeat only for placeholder nodes)
    index: HashMap<NodeId, usize>,
}

impl GraphProjection {
    pub fn from_tree(root: &ViewData) -> Self {
        let mut projection = Self::default();
        projection.nodes.reserve(root.node_count());
        projection.visit(root, 0, None);
        projection
    }

    fn visit(&mut self, node: &ViewData, depth: usize, parent: Option<usize>) {
        let idx = self.nodes.len();
        self.nodes.push(ProjectedNode {
            id: node.id.clone(),
            label: node.question_text.clone(),
            depth,
            child_count: node.children.len(),
            parent,
        });
        if let Some(source) = parent {
            self.links.push(ProjectedLink {
                source,
                target: idx,
            });
        }
        self.index.entry(node.id.clone()).or_insert(idx);

        for child in &node.children {
            self.visit(child, depth + 1, Some(idx));
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&ProjectedNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ViewData {
        ViewData::new("t1", "DB", "root").with_children(vec![
            ViewData::new("q1", "Normalization?", "")
                .with_children(vec![ViewData::new("q3", "3NF?", "")]),
            ViewData::new("q2", "Indexes?", ""),
        ])
    }

    #[test]
    fn test_projection_mirrors_tree() {
        let projection = GraphProjection::from_tree(&tree());
        assert_eq!(projection.len(), 4);
        assert_eq!(projection.links.len(), 3);

        let q3 = projection.node("q3").unwrap();
        assert_eq!(q3.depth, 2);
        assert_eq!(projection.nodes[q3.parent.unwrap()].id, "q1");

        let root = projection.node("t1").unwrap();
        assert!(root.is_root());
        assert_eq!(root.child_count, 2);
    }

    #[test]
    fn test_links_point_parent_to_child() {
        let projection = GraphProjection::from_tree(&tree());
        for link in &projection.links {
            assert_eq!(projection.nodes[link.target].parent, Some(link.source));
        }
    }

    #[test]
    fn test_single_node_has_no_links() {
        let projection = GraphProjection::from_tree(&ViewData::new("t1", "DB", ""));
        assert_eq!(projection.len(), 1);
        assert!(projection.links.is_empty());
    }
}
