//! Flat topic tree as served by `GET /topics/{id}/tree` and `POST /questions`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::NodeId;

// ============================================================================
// NODE KIND
// ============================================================================

/// Discriminant for [`TreeNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Question,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Topic => "topic",
            NodeKind::Question => "question",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "topic" => Ok(NodeKind::Topic),
            "question" => Ok(NodeKind::Question),
            other => Err(format!("unknown node kind `{other}`")),
        }
    }
}

// ============================================================================
// NODE VARIANTS
// ============================================================================

/// Root of a topic tree. Exactly one per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    pub topic_id: NodeId,
    pub topic_name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

/// A question/answer pair somewhere below the topic root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionNode {
    pub question_id: NodeId,
    /// Older servers send this as `question`
    #[serde(alias = "question")]
    pub question_text: String,
    /// Older servers send this as `answer`
    #[serde(alias = "answer", default)]
    pub answer_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<String>,
    /// Depth below the topic, starting at 1
    pub level: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
}

/// One entry of the server node map.
///
/// The wire format carries no tag; decoding looks for an explicit `kind`
/// first and otherwise for the `topicName` / `questionId` fields.
/// Serialization writes the untagged server shape back out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Topic(TopicNode),
    Question(QuestionNode),
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;

        let kind = match value.get("kind").and_then(|k| k.as_str()) {
            Some(tag) => tag.parse::<NodeKind>().map_err(D::Error::custom)?,
            None if value.get("topicName").is_some() => NodeKind::Topic,
            None if value.get("questionId").is_some() => NodeKind::Question,
            None => {
                return Err(D::Error::custom(
                    "tree node has neither `topicName` nor `questionId`",
                ))
            }
        };

        match kind {
            NodeKind::Topic => serde_json::from_value(value)
                .map(TreeNode::Topic)
                .map_err(D::Error::custom),
            NodeKind::Question => serde_json::from_value(value)
                .map(TreeNode::Question)
                .map_err(D::Error::custom),
        }
    }
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Topic(_) => NodeKind::Topic,
            TreeNode::Question(_) => NodeKind::Question,
        }
    }

    /// Identifier carried inside the node itself
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Topic(t) => &t.topic_id,
            TreeNode::Question(q) => &q.question_id,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            TreeNode::Topic(t) => &t.children,
            TreeNode::Question(q) => &q.children,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            TreeNode::Topic(t) => &t.created_at,
            TreeNode::Question(q) => &q.created_at,
        }
    }

    pub fn as_question(&self) -> Option<&QuestionNode> {
        match self {
            TreeNode::Question(q) => Some(q),
            TreeNode::Topic(_) => None,
        }
    }

    pub fn as_topic(&self) -> Option<&TopicNode> {
        match self {
            TreeNode::Topic(t) => Some(t),
            TreeNode::Question(_) => None,
        }
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Flat node map keyed by node id, with the root named by `topic`.
///
/// `nodes` is ordered by key so every iteration over it is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicTreeResponse {
    /// Root node id
    pub topic: NodeId,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, TreeNode>,
}

impl TopicTreeResponse {
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// The declared root, if present and actually a topic
    pub fn root_topic(&self) -> Option<&TopicNode> {
        self.nodes.get(&self.topic).and_then(TreeNode::as_topic)
    }

    /// All question nodes in key order
    pub fn questions(&self) -> impl Iterator<Item = &QuestionNode> {
        self.nodes.values().filter_map(TreeNode::as_question)
    }
}
