//! In-place edits of the view tree used by the store's mutation protocol.

use qtree_types::{NodeId, ViewData};

/// A subtree taken out of the tree, with enough context to put it back
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedSubtree {
    pub parent_id: NodeId,
    pub index: usize,
    pub subtree: ViewData,
}

/// Replace a node's question text, returning the previous text
pub fn set_question_text(root: &mut ViewData, id: &str, text: &str) -> Option<String> {
    let node = root.find_mut(id)?;
    Some(std::mem::replace(&mut node.question_text, text.to_string()))
}

/// Append (or insert at `index`, clamped) a child under `parent_id`.
/// Returns false if the parent is not in the tree.
pub fn insert_child(
    root: &mut ViewData,
    parent_id: &str,
    child: ViewData,
    index: Option<usize>,
) -> bool {
    let Some(parent) = root.find_mut(parent_id) else {
        return false;
    };
    match index {
        Some(i) => {
            let i = i.min(parent.children.len());
            parent.children.insert(i, child);
        }
        None => parent.children.push(child),
    }
    true
}

/// Remove a node and its whole subtree. The root itself cannot be detached.
pub fn detach_subtree(root: &mut ViewData, id: &str) -> Option<DetachedSubtree> {
    if root.id == id {
        return None;
    }
    if let Some(index) = root.children.iter().position(|c| c.id == id) {
        let subtree = root.children.remove(index);
        return Some(DetachedSubtree {
            parent_id: root.id.clone(),
            index,
            subtree,
        });
    }
    root.children
        .iter_mut()
        .find_map(|child| detach_subtree(child, id))
}
