//! Request/response bodies for the question service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tree::{TopicTreeResponse, TreeNode};
use crate::NodeId;

// ============================================================================
// QUESTIONS
// ============================================================================

/// `POST /questions` body. No parent means "start a new topic".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskQuestionRequest {
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_question_id: Option<NodeId>,
}

/// `PATCH /questions/{id}` and `PATCH /topics/{id}` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchNodeRequest {
    pub new_node_name: String,
}

/// Acknowledgement for a rename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchNodeResponse {
    pub node_id: NodeId,
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub node_data: String,
}

// ============================================================================
// HISTORY
// ============================================================================

/// One row of `GET /topics/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicHistoryItem {
    pub topic_id: NodeId,
    pub topic_name: String,
    #[serde(default)]
    pub created_at: String,
}

impl TopicHistoryItem {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Sort history newest first. Rows with unparseable timestamps sink to the end.
pub fn sort_history_newest_first(items: &mut [TopicHistoryItem]) {
    items.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
}

/// Parse the server's `createdAt`, which is RFC 3339 or a bare local timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// FLATTENED VIEWS
// ============================================================================

/// A question/answer row, flattened out of a tree response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question_id: NodeId,
    pub question_text: String,
    pub level: u32,
    #[serde(default)]
    pub answer_id: Option<String>,
    pub answer_text: String,
    pub created_at: String,
}

impl TopicTreeResponse {
    /// All questions of the tree, oldest first
    pub fn question_answers(&self) -> Vec<QuestionAnswer> {
        let mut rows: Vec<QuestionAnswer> = self
            .questions()
            .map(|q| QuestionAnswer {
                question_id: q.question_id.clone(),
                question_text: q.question_text.clone(),
                level: q.level,
                answer_id: q.answer_id.clone(),
                answer_text: q.answer_text.clone(),
                created_at: q.created_at.clone(),
            })
            .collect();
        rows.sort_by_key(|row| parse_timestamp(&row.created_at));
        rows
    }

    /// Every question of this (partial) tree as a search hit
    pub fn search_hits(&self) -> Vec<SearchHit> {
        let topic_name = self
            .root_topic()
            .map(|t| t.topic_name.clone())
            .unwrap_or_default();
        self.nodes
            .values()
            .filter_map(TreeNode::as_question)
            .map(|q| SearchHit {
                topic_id: self.topic.clone(),
                topic_name: topic_name.clone(),
                node_id: q.question_id.clone(),
                question_text: q.question_text.clone(),
            })
            .collect()
    }
}

/// A question matched by `GET /questions/search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub topic_id: NodeId,
    pub topic_name: String,
    pub node_id: NodeId,
    pub question_text: String,
}
