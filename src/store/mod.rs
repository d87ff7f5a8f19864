//! Question Tree Store
//!
//! The single mutable owner of the view tree, the navigation path and the
//! view mode. Readers (breadcrumb, chat view, graph widget) borrow from it;
//! every write goes through the methods here.
//!
//! ## Mutation protocol
//!
//! Remote writes are split into `begin_*` and `complete_*` halves so several
//! can be in flight at once:
//!
//! - **Add** is write-then-read: `begin_add` only records the parent, and the
//!   tree changes in `complete_add` once the server has answered.
//! - **Edit** and **Delete** are optimistic: `begin_*` applies the change and
//!   returns a ticket holding the inverse; `complete_*` with a failed result
//!   applies that inverse.
//!
//! Every [`load_response`](QuestionTreeStore::load_response) bumps the tree
//! generation. Completions carrying an older generation are discarded with
//! [`StoreError::Stale`] and touch nothing.

mod mutate;
mod pending;
mod ticket;

pub use ticket::{AddTicket, DeleteTicket, EditTarget, EditTicket, TopicDeleteTicket};

use std::collections::HashMap;

use qtree_graph::GraphAction;
use qtree_types::{NodeId, TopicTreeResponse, ViewData};

use crate::error::{StoreError, StoreResult};
use crate::tree::{find_path_ids, resolve_ids, transform};
use pending::{EditLedger, PendingDeletes};

// =============================================================================
// VIEW MODE & NOTIFICATIONS
// =============================================================================

/// Which of the two tree views is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Breadcrumb + focused question
    #[default]
    Chat,
    /// Whole tree as a force-directed graph
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// User-facing message queued by the store (rendered as a toast by the UI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct QuestionTreeStore {
    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------
    tree: Option<ViewData>,

    /// Incremented on every load; tickets from an older generation are stale
    generation: u64,

    /// Incremented on every change to the tree's content or shape
    revision: u64,

    // -------------------------------------------------------------------------
    // In-flight mutations
    // -------------------------------------------------------------------------
    /// Orders tickets by invocation
    next_seq: u64,
    edits: HashMap<NodeId, EditLedger>,
    deletes: PendingDeletes,

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------
    /// Root-to-focus ids. Always resolves against `tree` when one is loaded.
    path: Vec<NodeId>,

    view_mode: ViewMode,

    // -------------------------------------------------------------------------
    // Follow-up prompt
    // -------------------------------------------------------------------------
    prompt: String,
    adds_in_flight: usize,

    notifications: Vec<Notification>,
}

impl QuestionTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Replace the tree with a freshly transformed server response and reset
    /// the path to the root.
    pub fn load_response(&mut self, response: &TopicTreeResponse) {
        let tree = transform(response);
        tracing::debug!(
            topic_id = %tree.id,
            nodes = tree.node_count(),
            "loaded topic tree"
        );
        self.path = vec![tree.id.clone()];
        self.tree = Some(tree);
        self.forget_in_flight();
    }

    /// Drop the current tree. In-flight tickets become stale.
    pub fn unload(&mut self) {
        self.tree = None;
        self.path.clear();
        self.forget_in_flight();
    }

    /// Every outstanding ticket belonged to the tree just replaced
    fn forget_in_flight(&mut self) {
        self.generation += 1;
        self.revision += 1;
        self.edits.clear();
        self.deletes.clear();
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn tree(&self) -> Option<&ViewData> {
        self.tree.as_ref()
    }

    /// Id of the loaded topic (the tree root)
    pub fn topic_id(&self) -> Option<&str> {
        self.tree.as_ref().map(|t| t.id.as_str())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Navigation path as nodes, root first. Empty when nothing is loaded.
    pub fn current_path(&self) -> Vec<&ViewData> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        resolve_ids(tree, &self.path).unwrap_or_else(|| vec![tree])
    }

    pub fn path_ids(&self) -> &[NodeId] {
        &self.path
    }

    /// Focused node (last element of the path)
    pub fn active_node(&self) -> Option<&ViewData> {
        self.current_path().last().copied()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_loading(&self) -> bool {
        self.adds_in_flight > 0
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Breadcrumb click: keep the path up to and including `path_index`.
    pub fn navigate(&mut self, node_id: &str, path_index: usize) -> StoreResult<()> {
        self.require_tree()?;
        match self.path.get(path_index) {
            Some(id) if id == node_id => {
                self.path.truncate(path_index + 1);
                tracing::debug!(node_id, depth = path_index, "navigated via breadcrumb");
                Ok(())
            }
            _ => Err(StoreError::NodeNotFound(node_id.to_string())),
        }
    }

    /// Drill into a direct child of the focused node.
    pub fn descend(&mut self, child_id: &str) -> StoreResult<()> {
        let active = self
            .active_node()
            .ok_or(StoreError::NoTopicLoaded)?;
        if active.child(child_id).is_none() {
            return Err(StoreError::NotAChild {
                parent: active.id.clone(),
                child: child_id.to_string(),
            });
        }
        self.path.push(child_id.to_string());
        tracing::debug!(node_id = child_id, depth = self.path.len() - 1, "descended");
        Ok(())
    }

    /// Back to `[root]`
    pub fn go_home(&mut self) {
        self.path.truncate(1);
    }

    /// Switching to the graph shows the whole tree, so the path collapses to
    /// the root.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == ViewMode::Graph && self.path.len() > 1 {
            self.path.truncate(1);
        }
        self.view_mode = mode;
    }

    /// Focus an arbitrary node (graph click, search jump) and switch to chat.
    ///
    /// If the node is not in the tree the path falls back to `[root]` and
    /// [`StoreError::NodeNotFound`] is returned.
    pub fn focus_node(&mut self, node_id: &str) -> StoreResult<()> {
        let tree = self.require_tree()?;
        let found = find_path_ids(tree, node_id);
        let root_id = tree.id.clone();
        self.view_mode = ViewMode::Chat;
        match found {
            Some(ids) => {
                tracing::debug!(node_id, depth = ids.len() - 1, "focused node");
                self.path = ids;
                Ok(())
            }
            None => {
                tracing::warn!(node_id, "focus target is no longer in the tree; showing root");
                self.path = vec![root_id];
                Err(StoreError::NodeNotFound(node_id.to_string()))
            }
        }
    }

    /// Apply a graph widget event. Rewires are layout-only and leave the tree alone.
    pub fn apply_graph_action(&mut self, action: &GraphAction) -> StoreResult<()> {
        match action {
            GraphAction::NodeClicked(node_id) => self.focus_node(node_id),
            GraphAction::LinkRewired {
                node, attached_to, ..
            } => {
                tracing::debug!(%node, %attached_to, "graph link rewired; tree unchanged");
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Prompt
    // -------------------------------------------------------------------------

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn require_tree(&self) -> StoreResult<&ViewData> {
        self.tree.as_ref().ok_or(StoreError::NoTopicLoaded)
    }

    fn require_tree_mut(&mut self) -> StoreResult<&mut ViewData> {
        self.tree.as_mut().ok_or(StoreError::NoTopicLoaded)
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn check_generation(&self, ticket_generation: u64, what: &str) -> StoreResult<()> {
        if ticket_generation == self.generation {
            return Ok(());
        }
        tracing::warn!(
            ticket_generation,
            current_generation = self.generation,
            "discarding stale {what} completion"
        );
        Err(StoreError::Stale)
    }

    /// Cut the path back to its longest prefix that still resolves
    fn repair_path(&mut self) {
        let Some(tree) = self.tree.as_ref() else {
            self.path.clear();
            return;
        };
        if self.path.first() != Some(&tree.id) {
            self.path = vec![tree.id.clone()];
            return;
        }
        let mut current = tree;
        let mut keep = 1;
        for id in &self.path[1..] {
            match current.child(id) {
                Some(next) => {
                    current = next;
                    keep += 1;
                }
                None => break,
            }
        }
        self.path.truncate(keep);
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(super) fn sample_response() -> TopicTreeResponse {
        serde_json::from_value(json!({
            "topic": "t1",
            "nodes": {
                "t1": { "topicId": "t1", "topicName": "DB", "children": ["q1", "q2"] },
                "q1": { "questionId": "q1", "questionText": "Normalization?", "answerText": "a1",
                        "level": 1, "children": ["q3"] },
                "q2": { "questionId": "q2", "questionText": "Indexes?", "answerText": "a2", "level": 1 },
                "q3": { "questionId": "q3", "questionText": "3NF?", "answerText": "a3", "level": 2,
                        "children": ["q4"] },
                "q4": { "questionId": "q4", "questionText": "BCNF?", "answerText": "a4", "level": 3 }
            }
        }))
        .unwrap()
    }

    pub(super) fn loaded_store() -> QuestionTreeStore {
        let mut store = QuestionTreeStore::new();
        store.load_response(&sample_response());
        store
    }

    fn path(store: &QuestionTreeStore) -> Vec<&str> {
        store.current_path().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_load_resets_path_and_bumps_generation() {
        let mut store = loaded_store();
        store.descend("q1").unwrap();
        let generation = store.generation();

        store.load_response(&sample_response());
        assert_eq!(path(&store), vec!["t1"]);
        assert_eq!(store.generation(), generation + 1);
    }

    #[test]
    fn test_empty_store() {
        let mut store = QuestionTreeStore::new();
        assert!(store.current_path().is_empty());
        assert!(store.active_node().is_none());
        assert_eq!(store.descend("q1"), Err(StoreError::NoTopicLoaded));
    }

    #[test]
    fn test_descend_and_navigate() {
        let mut store = loaded_store();
        store.descend("q1").unwrap();
        store.descend("q3").unwrap();
        store.descend("q4").unwrap();
        assert_eq!(path(&store), vec!["t1", "q1", "q3", "q4"]);

        store.navigate("q1", 1).unwrap();
        assert_eq!(path(&store), vec!["t1", "q1"]);
        assert_eq!(store.active_node().unwrap().id, "q1");
    }

    #[test]
    fn test_descend_rejects_non_child() {
        let mut store = loaded_store();
        assert!(matches!(
            store.descend("q3"),
            Err(StoreError::NotAChild { .. })
        ));
        assert_eq!(path(&store), vec!["t1"]);
    }

    #[test]
    fn test_navigate_rejects_mismatched_index() {
        let mut store = loaded_store();
        store.descend("q1").unwrap();
        assert!(store.navigate("q1", 0).is_err());
        assert!(store.navigate("q1", 5).is_err());
        assert_eq!(path(&store), vec!["t1", "q1"]);
    }

    #[test]
    fn test_graph_mode_collapses_path() {
        let mut store = loaded_store();
        store.descend("q1").unwrap();
        store.set_view_mode(ViewMode::Graph);
        assert_eq!(path(&store), vec!["t1"]);
        assert_eq!(store.view_mode(), ViewMode::Graph);

        store.set_view_mode(ViewMode::Chat);
        assert_eq!(path(&store), vec!["t1"]);
    }

    #[test]
    fn test_focus_node_switches_to_chat() {
        let mut store = loaded_store();
        store.set_view_mode(ViewMode::Graph);
        store.focus_node("q4").unwrap();
        assert_eq!(store.view_mode(), ViewMode::Chat);
        assert_eq!(path(&store), vec!["t1", "q1", "q3", "q4"]);
    }

    #[test]
    fn test_focus_missing_node_falls_back_to_root() {
        let mut store = loaded_store();
        store.descend("q2").unwrap();
        assert_eq!(
            store.focus_node("gone"),
            Err(StoreError::NodeNotFound("gone".into()))
        );
        assert_eq!(path(&store), vec!["t1"]);
    }

    #[test]
    fn test_graph_actions() {
        let mut store = loaded_store();
        store.set_view_mode(ViewMode::Graph);
        let before = store.tree().cloned();

        store
            .apply_graph_action(&GraphAction::LinkRewired {
                node: "q4".into(),
                attached_to: "q2".into(),
                detached_from: vec!["q3".into()],
            })
            .unwrap();
        assert_eq!(store.tree().cloned(), before);
        assert_eq!(store.view_mode(), ViewMode::Graph);

        store
            .apply_graph_action(&GraphAction::NodeClicked("q3".into()))
            .unwrap();
        assert_eq!(store.view_mode(), ViewMode::Chat);
        assert_eq!(path(&store), vec!["t1", "q1", "q3"]);
    }

    #[test]
    fn test_go_home() {
        let mut store = loaded_store();
        store.descend("q1").unwrap();
        store.go_home();
        assert_eq!(path(&store), vec!["t1"]);
    }
}
