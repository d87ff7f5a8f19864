//! Mutation tickets.
//!
//! A ticket is handed out when a mutation begins and handed back with the
//! remote result when it completes. It carries everything the store needs to
//! commit or undo that one mutation, independent of what happened to the
//! tree in between.

use qtree_types::NodeId;

/// Which rename endpoint an edit goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Root node: `PATCH /topics/{id}`
    Topic,
    /// Any other node: `PATCH /questions/{id}`
    Question,
}

/// Pending follow-up question
#[derive(Debug, Clone)]
#[must_use = "a ticket must be completed with the remote result"]
pub struct AddTicket {
    pub(crate) generation: u64,
    pub(crate) parent_id: NodeId,
    pub(crate) parent_is_root: bool,
    pub(crate) prompt: String,
}

impl AddTicket {
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn parent_is_root(&self) -> bool {
        self.parent_is_root
    }

    /// Prompt text as it was when the request was made
    pub fn question_text(&self) -> &str {
        &self.prompt
    }
}

/// Pending rename, already applied to the tree
#[derive(Debug, Clone)]
#[must_use = "a ticket must be completed with the remote result"]
pub struct EditTicket {
    pub(crate) generation: u64,
    pub(crate) node_id: NodeId,
    pub(crate) seq: u64,
    pub(crate) target: EditTarget,
    pub(crate) new_text: String,
}

impl EditTicket {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }
}

/// Pending question delete, already applied to the tree
#[derive(Debug, Clone)]
#[must_use = "a ticket must be completed with the remote result"]
pub struct DeleteTicket {
    pub(crate) generation: u64,
    pub(crate) seq: u64,
    pub(crate) node_id: NodeId,
    pub(crate) removed_count: usize,
    pub(crate) path_before: Vec<NodeId>,
}

impl DeleteTicket {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Number of nodes removed with this delete
    pub fn removed_count(&self) -> usize {
        self.removed_count
    }
}

/// Pending topic delete. Nothing is applied until the server confirms.
#[derive(Debug, Clone)]
#[must_use = "a ticket must be completed with the remote result"]
pub struct TopicDeleteTicket {
    pub(crate) generation: u64,
    pub(crate) topic_id: NodeId,
}

impl TopicDeleteTicket {
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }
}
