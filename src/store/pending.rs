//! Ledgers for optimistic mutations that have not settled yet.
//!
//! Completions arrive in any order, so undo is never computed from the tree
//! as it looks when a response lands. Edits keep, per node, the last text the
//! server confirmed plus every rename stacked on top of it. Deletes keep the
//! subtrees they took out, so a failed inner delete whose parent is itself
//! pending can be grafted back once that parent returns.

use std::collections::BTreeMap;

use qtree_types::{NodeId, ViewData};

use crate::tree::{insert_child, DetachedSubtree};

// =============================================================================
// EDITS
// =============================================================================

/// What a node shows: its question text and, for the topic root, the answer
/// derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeText {
    pub question: String,
    pub answer: Option<String>,
}

impl NodeText {
    /// Write onto a node. Returns true if anything changed.
    pub fn apply_to(&self, node: &mut ViewData) -> bool {
        let mut changed = false;
        if node.question_text != self.question {
            node.question_text = self.question.clone();
            changed = true;
        }
        if let Some(answer) = &self.answer {
            if node.answer_text != *answer {
                node.answer_text = answer.clone();
                changed = true;
            }
        }
        changed
    }
}

/// Renames of one node, oldest first, on top of the last confirmed text
#[derive(Debug, Clone)]
pub(crate) struct EditLedger {
    base: NodeText,
    entries: Vec<(u64, NodeText)>,
}

impl EditLedger {
    pub fn new(base: NodeText) -> Self {
        Self {
            base,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, seq: u64, text: NodeText) {
        self.entries.push((seq, text));
    }

    /// The server accepted `seq`. Renames invoked before it can no longer
    /// show through, whatever their outcome.
    pub fn confirm(&mut self, seq: u64) {
        let Some(pos) = self.entries.iter().position(|(s, _)| *s == seq) else {
            return;
        };
        if let Some((_, text)) = self.entries.drain(..=pos).last() {
            self.base = text;
        }
    }

    /// The server rejected `seq`
    pub fn discard(&mut self, seq: u64) {
        self.entries.retain(|(s, _)| *s != seq);
    }

    /// Newest surviving rename, else the confirmed text
    pub fn shown(&self) -> &NodeText {
        self.entries.last().map_or(&self.base, |(_, text)| text)
    }

    pub fn is_settled(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// DELETES
// =============================================================================

/// A failed delete waiting for its parent to come back
#[derive(Debug, Clone)]
struct Parked {
    detached: DetachedSubtree,
    path_before: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PendingDeletes {
    in_flight: BTreeMap<u64, DetachedSubtree>,
    parked: BTreeMap<u64, Parked>,
}

impl PendingDeletes {
    pub fn begin(&mut self, seq: u64, detached: DetachedSubtree) {
        self.in_flight.insert(seq, detached);
    }

    pub fn take(&mut self, seq: u64) -> Option<DetachedSubtree> {
        self.in_flight.remove(&seq)
    }

    /// Whether `id` is inside a removed subtree that may still be restored
    pub fn may_return(&self, id: &str) -> bool {
        self.in_flight.values().any(|d| d.subtree.contains(id))
            || self.parked.values().any(|p| p.detached.subtree.contains(id))
    }

    pub fn park(&mut self, seq: u64, detached: DetachedSubtree, path_before: Vec<NodeId>) {
        self.parked.insert(
            seq,
            Parked {
                detached,
                path_before,
            },
        );
    }

    /// A delete of `removed` was confirmed: parked subtrees hanging below it,
    /// directly or through other parked subtrees, are gone for good.
    pub fn forget_under(&mut self, removed: &ViewData) -> usize {
        let mut dropped: Vec<ViewData> = Vec::new();
        loop {
            let next = self
                .parked
                .iter()
                .find(|(_, p)| {
                    let parent = p.detached.parent_id.as_str();
                    removed.contains(parent) || dropped.iter().any(|d| d.contains(parent))
                })
                .map(|(seq, _)| *seq);
            let Some(seq) = next else { break };
            if let Some(parked) = self.parked.remove(&seq) {
                dropped.push(parked.detached.subtree);
            }
        }
        dropped.len()
    }

    /// Put back every parked subtree whose parent is in `tree` again, newest
    /// delete first so siblings regain their original order. Returns the
    /// grafted deletes' sequence numbers and pre-delete paths.
    pub fn graft_into(&mut self, tree: &mut ViewData) -> Vec<(u64, Vec<NodeId>)> {
        let mut grafted = Vec::new();
        loop {
            let ready = self
                .parked
                .iter()
                .rev()
                .find(|(_, p)| tree.contains(&p.detached.parent_id))
                .map(|(seq, _)| *seq);
            let Some(seq) = ready else { break };
            let Some(Parked {
                detached,
                path_before,
            }) = self.parked.remove(&seq)
            else {
                break;
            };
            if tree.contains(&detached.subtree.id) {
                continue;
            }
            if insert_child(tree, &detached.parent_id, detached.subtree, Some(detached.index)) {
                grafted.push((seq, path_before));
            }
        }
        grafted
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
        self.parked.clear();
    }
}
