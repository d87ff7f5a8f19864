//! Recursive view model shared by the chat view and the graph view.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// One node of the client-side view tree.
///
/// Built fresh from a [`crate::TopicTreeResponse`] on every load; after that
/// the owning store is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewData {
    pub id: NodeId,
    pub question_text: String,
    pub answer_text: String,
    #[serde(default)]
    pub children: Vec<ViewData>,
}

impl ViewData {
    /// Create a childless node
    pub fn new(
        id: impl Into<NodeId>,
        question_text: impl Into<String>,
        answer_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question_text: question_text.into(),
            answer_text: answer_text.into(),
            children: Vec::new(),
        }
    }

    /// Builder: set children
    pub fn with_children(mut self, children: Vec<ViewData>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ViewData::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&ViewData> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Mutable depth-first search for a node by id
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ViewData> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Direct child by id
    pub fn child(&self, id: &str) -> Option<&ViewData> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Pre-order walk with depth (root = 0) and parent id
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a ViewData, usize, Option<&'a ViewData>),
    {
        fn go<'a, F>(node: &'a ViewData, depth: usize, parent: Option<&'a ViewData>, visit: &mut F)
        where
            F: FnMut(&'a ViewData, usize, Option<&'a ViewData>),
        {
            visit(node, depth, parent);
            for child in &node.children {
                go(child, depth + 1, Some(node), visit);
            }
        }
        go(self, 0, None, visit);
    }

    /// All ids in pre-order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::with_capacity(self.node_count());
        self.walk(&mut |node, _, _| ids.push(node.id.as_str()));
        ids
    }
}
