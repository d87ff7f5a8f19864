//! Add / edit / delete halves of the store's mutation protocol.

use qtree_types::{parse_timestamp, NodeId, QuestionNode, TopicTreeResponse, ViewData};

use super::pending::{EditLedger, NodeText};
use super::ticket::{AddTicket, DeleteTicket, EditTarget, EditTicket, TopicDeleteTicket};
use super::{Notification, QuestionTreeStore};
use crate::error::{ApiResult, StoreError, StoreResult};
use crate::tree::transform::topic_root_answer;
use crate::tree::{detach_subtree, insert_child, resolve_ids, set_question_text};

impl QuestionTreeStore {
    // =========================================================================
    // ADD FOLLOW-UP
    // =========================================================================

    /// Start asking the current prompt under the focused node.
    ///
    /// Nothing changes in the tree until [`complete_add`](Self::complete_add).
    pub fn begin_add(&mut self) -> StoreResult<AddTicket> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(StoreError::EmptyPrompt);
        }
        let parent_is_root = self.path.len() == 1;
        let parent_id = self
            .active_node()
            .map(|n| n.id.clone())
            .ok_or(StoreError::NoTopicLoaded)?;

        self.adds_in_flight += 1;
        Ok(AddTicket {
            generation: self.generation,
            parent_id,
            parent_is_root,
            prompt,
        })
    }

    /// Apply the server's answer to a follow-up question.
    ///
    /// On success the new node is appended under the ticket's parent and, if
    /// the parent is not the root and is still focused, pushed onto the path.
    /// On failure the tree is untouched and the prompt is kept for a retry.
    pub fn complete_add(
        &mut self,
        ticket: AddTicket,
        result: ApiResult<TopicTreeResponse>,
    ) -> StoreResult<NodeId> {
        self.adds_in_flight = self.adds_in_flight.saturating_sub(1);
        self.check_generation(ticket.generation, "add")?;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(parent_id = %ticket.parent_id, error = %err, "follow-up question failed");
                self.notify(Notification::error(format!("Could not add question: {err}")));
                return Err(StoreError::Remote(err));
            }
        };

        let Some(tree) = self.tree.as_mut() else {
            return Err(StoreError::NoTopicLoaded);
        };
        let Some(node) = discover_new_question(&response, &ticket.parent_id, tree) else {
            tracing::error!(parent_id = %ticket.parent_id, "new question missing from server response");
            self.notify(Notification::error("Could not add question: server did not return it"));
            return Err(StoreError::NewNodeMissing);
        };
        let new_id = node.id.clone();

        if !insert_child(tree, &ticket.parent_id, node, None) {
            tracing::warn!(parent_id = %ticket.parent_id, "parent vanished before follow-up arrived");
            return Err(StoreError::NodeNotFound(ticket.parent_id));
        }
        self.revision += 1;

        let still_focused = self.path.last() == Some(&ticket.parent_id);
        if !ticket.parent_is_root && still_focused {
            self.path.push(new_id.clone());
        }
        if self.prompt.trim() == ticket.prompt {
            self.prompt.clear();
        }

        tracing::info!(parent_id = %ticket.parent_id, node_id = %new_id, "added follow-up question");
        Ok(new_id)
    }

    // =========================================================================
    // EDIT
    // =========================================================================

    /// Rewrite a node's question text immediately and return the ticket that
    /// settles it.
    pub fn begin_edit(&mut self, node_id: &str, new_text: &str) -> StoreResult<EditTicket> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let tree = self.require_tree_mut()?;
        let is_root = tree.id == node_id;

        let old_text = set_question_text(tree, node_id, new_text)
            .ok_or_else(|| StoreError::NodeNotFound(node_id.to_string()))?;
        let old_answer = if is_root {
            Some(std::mem::replace(
                &mut tree.answer_text,
                topic_root_answer(new_text),
            ))
        } else {
            None
        };
        self.revision += 1;

        let seq = self.next_seq();
        self.edits
            .entry(node_id.to_string())
            .or_insert_with(|| {
                EditLedger::new(NodeText {
                    question: old_text,
                    answer: old_answer,
                })
            })
            .push(
                seq,
                NodeText {
                    question: new_text.to_string(),
                    answer: is_root.then(|| topic_root_answer(new_text)),
                },
            );

        tracing::debug!(node_id, seq, "applied optimistic edit");
        Ok(EditTicket {
            generation: self.generation,
            node_id: node_id.to_string(),
            seq,
            target: if is_root {
                EditTarget::Topic
            } else {
                EditTarget::Question
            },
            new_text: new_text.to_string(),
        })
    }

    /// Settle an edit.
    ///
    /// A failure drops only this ticket's rename: the node then shows the
    /// newest rename still pending, or else the text the server last
    /// confirmed. A confirmed rename outranks every rename invoked before it.
    pub fn complete_edit(&mut self, ticket: EditTicket, result: ApiResult<()>) -> StoreResult<()> {
        self.check_generation(ticket.generation, "edit")?;

        let err = match result {
            Ok(()) => {
                let settled = self.edits.get_mut(&ticket.node_id).map(|ledger| {
                    ledger.confirm(ticket.seq);
                    ledger.is_settled()
                });
                if settled == Some(true) {
                    self.edits.remove(&ticket.node_id);
                }
                tracing::info!(node_id = %ticket.node_id, "edit confirmed");
                return Ok(());
            }
            Err(err) => err,
        };

        tracing::error!(node_id = %ticket.node_id, error = %err, "edit failed; rolling back");
        let shown = self.edits.get_mut(&ticket.node_id).map(|ledger| {
            ledger.discard(ticket.seq);
            (ledger.shown().clone(), ledger.is_settled())
        });
        match shown {
            Some((text, settled)) => {
                if settled {
                    self.edits.remove(&ticket.node_id);
                }
                let node = self.tree.as_mut().and_then(|t| t.find_mut(&ticket.node_id));
                if node.is_some_and(|node| text.apply_to(node)) {
                    self.revision += 1;
                }
            }
            None => {
                tracing::warn!(node_id = %ticket.node_id, "a newer edit was confirmed; keeping its text");
            }
        }
        self.notify(Notification::error(format!("Could not save edit: {err}")));
        Err(StoreError::Remote(err))
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Remove a question and its subtree immediately. If the focus was inside
    /// the removed subtree the path collapses to the nearest survivor.
    pub fn begin_delete(&mut self, node_id: &str) -> StoreResult<DeleteTicket> {
        let tree = self.require_tree_mut()?;
        if tree.id == node_id {
            return Err(StoreError::CannotDeleteRoot);
        }
        let detached = detach_subtree(tree, node_id)
            .ok_or_else(|| StoreError::NodeNotFound(node_id.to_string()))?;

        let path_before = self.path.clone();
        if let Some(index) = self.path.iter().position(|id| id == node_id) {
            self.path.truncate(index);
        }
        self.revision += 1;

        let seq = self.next_seq();
        let removed_count = detached.subtree.node_count();
        self.deletes.begin(seq, detached);

        tracing::debug!(node_id, seq, removed = removed_count, "applied optimistic delete");
        Ok(DeleteTicket {
            generation: self.generation,
            seq,
            node_id: node_id.to_string(),
            removed_count,
            path_before,
        })
    }

    /// Settle a delete.
    ///
    /// A failure puts the subtree back where it was, along with any failed
    /// deletes nested inside it, and restores the oldest of their previous
    /// paths that resolves again. If the parent is itself removed by a delete
    /// still in flight, the subtree waits for that delete to settle; if the
    /// parent's delete was confirmed, the subtree stays gone.
    pub fn complete_delete(
        &mut self,
        ticket: DeleteTicket,
        result: ApiResult<()>,
    ) -> StoreResult<()> {
        self.check_generation(ticket.generation, "delete")?;
        let Some(detached) = self.deletes.take(ticket.seq) else {
            return Err(StoreError::Stale);
        };

        let err = match result {
            Ok(()) => {
                let forgotten = self.deletes.forget_under(&detached.subtree);
                tracing::info!(node_id = %ticket.node_id, forgotten, "delete confirmed");
                return Ok(());
            }
            Err(err) => err,
        };

        let DeleteTicket {
            seq,
            node_id,
            path_before,
            ..
        } = ticket;
        tracing::error!(node_id = %node_id, error = %err, "delete failed; rolling back");

        let Some(tree) = self.tree.as_mut() else {
            return Err(StoreError::NoTopicLoaded);
        };
        if tree.contains(&node_id) {
            tracing::warn!(node_id = %node_id, "node already back in the tree; skipping restore");
        } else if tree.contains(&detached.parent_id) {
            insert_child(tree, &detached.parent_id, detached.subtree, Some(detached.index));
            let mut paths = self.deletes.graft_into(tree);
            paths.push((seq, path_before));
            paths.sort_by_key(|(seq, _)| *seq);
            self.revision += 1;
            let tree = &*tree;
            if let Some((_, path)) = paths
                .into_iter()
                .find(|(_, path)| resolve_ids(tree, path).is_some())
            {
                self.path = path;
            }
        } else if self.deletes.may_return(&detached.parent_id) {
            tracing::debug!(
                node_id = %node_id,
                parent_id = %detached.parent_id,
                "parent delete still pending; holding subtree until it settles"
            );
            self.deletes.park(seq, detached, path_before);
        } else {
            tracing::warn!(
                node_id = %node_id,
                parent_id = %detached.parent_id,
                "parent delete was confirmed; subtree stays deleted"
            );
        }
        self.repair_path();

        self.notify(Notification::error(format!("Could not delete question: {err}")));
        Err(StoreError::Remote(err))
    }

    // =========================================================================
    // DELETE TOPIC
    // =========================================================================

    /// Start deleting the whole topic. Not optimistic.
    pub fn begin_topic_delete(&self) -> StoreResult<TopicDeleteTicket> {
        let topic_id = self.topic_id().ok_or(StoreError::NoTopicLoaded)?;
        Ok(TopicDeleteTicket {
            generation: self.generation,
            topic_id: topic_id.to_string(),
        })
    }

    /// Unload on success; on failure keep everything and report.
    pub fn complete_topic_delete(
        &mut self,
        ticket: TopicDeleteTicket,
        result: ApiResult<()>,
    ) -> StoreResult<()> {
        self.check_generation(ticket.generation, "topic delete")?;
        match result {
            Ok(()) => {
                tracing::info!(topic_id = %ticket.topic_id, "topic deleted");
                self.unload();
                self.notify(Notification::info("Topic deleted"));
                Ok(())
            }
            Err(err) => {
                tracing::error!(topic_id = %ticket.topic_id, error = %err, "topic delete failed");
                self.notify(Notification::error(format!("Could not delete topic: {err}")));
                Err(StoreError::Remote(err))
            }
        }
    }
}

/// Find the question the server just created for `parent_id`.
///
/// Candidates are questions absent from the current tree. Those declared
/// under the parent (via `parentId` or the parent's `children`) win; among
/// equals the newest `createdAt` wins, then the last key.
fn discover_new_question(
    response: &TopicTreeResponse,
    parent_id: &str,
    tree: &ViewData,
) -> Option<ViewData> {
    let listed_under_parent = |q: &QuestionNode| {
        q.parent_id.as_deref() == Some(parent_id)
            || response
                .get(parent_id)
                .is_some_and(|p| p.children().iter().any(|c| *c == q.question_id))
    };

    response
        .questions()
        .filter(|q| !tree.contains(&q.question_id))
        .max_by_key(|q| (listed_under_parent(q), parse_timestamp(&q.created_at)))
        .map(|q| ViewData::new(q.question_id.clone(), q.question_text.clone(), q.answer_text.clone()))
}
