//! Async controller
//!
//! Sequences the store's `begin_*` / `complete_*` halves around calls to a
//! [`QuestionApi`]. Each method here is one user intent. UIs that need more
//! than one mutation in flight can drive the ticket API on the store directly.

use std::sync::Arc;

use qtree_types::{sort_history_newest_first, NodeId, SearchHit, TopicHistoryItem};

use crate::api::QuestionApi;
use crate::error::{StoreError, StoreResult};
use crate::store::{EditTarget, QuestionTreeStore};

pub struct TreeController {
    api: Arc<dyn QuestionApi>,
    store: QuestionTreeStore,
}

impl TreeController {
    pub fn new(api: Arc<dyn QuestionApi>) -> Self {
        Self {
            api,
            store: QuestionTreeStore::new(),
        }
    }

    pub fn store(&self) -> &QuestionTreeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut QuestionTreeStore {
        &mut self.store
    }

    pub fn api(&self) -> &Arc<dyn QuestionApi> {
        &self.api
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Fetch and load a topic. On failure the current tree is kept.
    pub async fn load(&mut self, topic_id: &str) -> StoreResult<()> {
        match self.api.get_topic_tree(topic_id).await {
            Ok(response) => {
                self.store.load_response(&response);
                Ok(())
            }
            Err(err) => {
                tracing::error!(topic_id, error = %err, "failed to load topic");
                Err(StoreError::Remote(err))
            }
        }
    }

    /// Ask a first question, creating a new topic, and load it.
    pub async fn start_topic(&mut self, question_text: &str) -> StoreResult<NodeId> {
        let question_text = question_text.trim();
        if question_text.is_empty() {
            return Err(StoreError::EmptyPrompt);
        }
        let response = self.api.ask_question(question_text, None).await?;
        self.store.load_response(&response);
        tracing::info!(topic_id = %response.topic, "started new topic");
        Ok(response.topic)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Ask the store's current prompt as a follow-up of the focused node
    pub async fn add_follow_up(&mut self) -> StoreResult<NodeId> {
        let ticket = self.store.begin_add()?;
        let result = self
            .api
            .ask_question(ticket.question_text(), Some(ticket.parent_id()))
            .await;
        self.store.complete_add(ticket, result)
    }

    /// Set the prompt and ask it
    pub async fn ask(&mut self, prompt: &str) -> StoreResult<NodeId> {
        self.store.set_prompt(prompt);
        self.add_follow_up().await
    }

    /// Rename a question, or the topic when `node_id` is the root
    pub async fn edit_question_text(&mut self, node_id: &str, new_text: &str) -> StoreResult<()> {
        let ticket = self.store.begin_edit(node_id, new_text)?;
        let result = match ticket.target() {
            EditTarget::Topic => self.api.patch_topic(ticket.node_id(), ticket.new_text()).await,
            EditTarget::Question => {
                self.api
                    .patch_question(ticket.node_id(), ticket.new_text())
                    .await
            }
        };
        self.store.complete_edit(ticket, result.map(|_| ()))
    }

    pub async fn delete_question(&mut self, node_id: &str) -> StoreResult<()> {
        let ticket = self.store.begin_delete(node_id)?;
        let result = self.api.delete_question(ticket.node_id()).await;
        self.store.complete_delete(ticket, result)
    }

    pub async fn delete_topic(&mut self) -> StoreResult<()> {
        let ticket = self.store.begin_topic_delete()?;
        let result = self.api.delete_topic(ticket.topic_id()).await;
        self.store.complete_topic_delete(ticket, result)
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// Topics, newest first
    pub async fn history(&self) -> StoreResult<Vec<TopicHistoryItem>> {
        let mut items = self.api.topics_history().await?;
        sort_history_newest_first(&mut items);
        Ok(items)
    }

    /// Every question matching `keyword`, across topics
    pub async fn search(&self, keyword: &str) -> StoreResult<Vec<SearchHit>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let trees = self.api.search_questions(keyword).await?;
        let hits: Vec<SearchHit> = trees.iter().flat_map(|t| t.search_hits()).collect();
        tracing::debug!(keyword, hits = hits.len(), "search finished");
        Ok(hits)
    }

    /// Focus a search hit, loading its topic first if another one is showing
    pub async fn jump_to(&mut self, hit: &SearchHit) -> StoreResult<()> {
        if self.store.topic_id() != Some(hit.topic_id.as_str()) {
            self.load(&hit.topic_id).await?;
        }
        self.store.focus_node(&hit.node_id)
    }
}
