//! Root-to-node path resolution over the view tree.

use qtree_types::{NodeId, ViewData};

/// Depth-first pre-order search for the path from `root` to `target_id`.
///
/// Returns `None` when the node is not in the tree. Under unique parentage
/// at most one path exists; the first one found is returned.
pub fn find_path<'a>(root: &'a ViewData, target_id: &str) -> Option<Vec<&'a ViewData>> {
    let mut path = Vec::new();
    if descend(root, target_id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn descend<'a>(node: &'a ViewData, target_id: &str, path: &mut Vec<&'a ViewData>) -> bool {
    path.push(node);
    if node.id == target_id {
        return true;
    }
    for child in &node.children {
        if descend(child, target_id, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Same as [`find_path`], returning ids only
pub fn find_path_ids(root: &ViewData, target_id: &str) -> Option<Vec<NodeId>> {
    find_path(root, target_id).map(|path| path.into_iter().map(|n| n.id.clone()).collect())
}

/// Follow a sequence of ids from the root, checking each step is a child of
/// the previous one. `None` if the sequence is empty, does not start at the
/// root, or breaks anywhere.
pub fn resolve_ids<'a>(root: &'a ViewData, ids: &[NodeId]) -> Option<Vec<&'a ViewData>> {
    let (first, rest) = ids.split_first()?;
    if root.id != *first {
        return None;
    }
    let mut nodes = Vec::with_capacity(ids.len());
    nodes.push(root);
    let mut current = root;
    for id in rest {
        current = current.child(id)?;
        nodes.push(current);
    }
    Some(nodes)
}
