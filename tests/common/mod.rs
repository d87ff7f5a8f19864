//! In-memory question service for integration tests.
//!
//! Keeps one flat `TopicTreeResponse` per topic and answers like the real
//! service: `ask_question` returns the whole updated tree, deletes remove
//! subtrees, search returns one partial tree per matching topic. Any
//! operation can be told to fail or to wait before answering.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use qtree::types::{
    NodeId, PatchNodeResponse, QuestionNode, TopicHistoryItem, TopicNode, TopicTreeResponse,
    TreeNode,
};
use qtree::{ApiError, ApiResult, QuestionApi};

/// Ids of the [`FakeApi::seeded`] topic
#[derive(Debug, Clone)]
pub struct Seeded {
    pub topic: NodeId,
    pub normalization: NodeId,
    pub indexes: NodeId,
    pub third_nf: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Ask,
    GetTree,
    PatchQuestion,
    PatchTopic,
    DeleteQuestion,
    DeleteTopic,
    Search,
    History,
}

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    Fail,
    Delay(Duration),
    DelayThenFail(Duration),
}

#[derive(Default)]
struct FakeState {
    topics: BTreeMap<NodeId, TopicTreeResponse>,
    next_id: u64,
    clock: i64,
    scripted: HashMap<Op, VecDeque<Behaviour>>,
    calls: Vec<Op>,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> NodeId {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn now(&mut self) -> String {
        self.clock += 1;
        chrono::DateTime::from_timestamp(1_700_000_000 + self.clock, 0)
            .unwrap()
            .to_rfc3339()
    }

    fn topic_containing(&self, node_id: &str) -> Option<NodeId> {
        self.topics
            .iter()
            .find(|(_, tree)| tree.nodes.contains_key(node_id))
            .map(|(id, _)| id.clone())
    }

    fn not_found(what: &str, id: &str) -> ApiError {
        ApiError::Http {
            status: 404,
            body: format!("{what} `{id}` not found"),
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// One topic "Databases" with two questions under the root and one
    /// follow-up under the first
    pub fn seeded() -> (Self, Seeded) {
        let api = Self::new();
        let topic = api.create_topic("Databases");
        let normalization =
            api.insert_question(&topic, "What is normalization?", "Organising tables.");
        let indexes = api.insert_question(&topic, "What are indexes?", "Lookup structures.");
        let third_nf = api.insert_question(&normalization, "What is 3NF?", "Third normal form.");
        let ids = Seeded {
            topic,
            normalization,
            indexes,
            third_nf,
        };
        (api, ids)
    }

    pub fn create_topic(&self, name: &str) -> NodeId {
        let mut state = self.state.lock().unwrap();
        let topic_id = state.next_id("t");
        let created_at = state.now();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            topic_id.clone(),
            TreeNode::Topic(TopicNode {
                topic_id: topic_id.clone(),
                topic_name: name.to_string(),
                created_at,
                children: Vec::new(),
            }),
        );
        state.topics.insert(
            topic_id.clone(),
            TopicTreeResponse {
                topic: topic_id.clone(),
                nodes,
            },
        );
        topic_id
    }

    /// Add a question under `parent_id` (topic or question) directly
    pub fn insert_question(&self, parent_id: &str, text: &str, answer: &str) -> NodeId {
        let mut state = self.state.lock().unwrap();
        insert_question(&mut state, parent_id, text, answer).unwrap()
    }

    /// The next call of `op` fails with HTTP 500
    pub fn fail_next(&self, op: Op) {
        self.script(op, Behaviour::Fail);
    }

    /// The next call of `op` waits before answering
    pub fn delay_next(&self, op: Op, delay: Duration) {
        self.script(op, Behaviour::Delay(delay));
    }

    /// The next call of `op` waits, then fails with HTTP 500
    pub fn delay_then_fail_next(&self, op: Op, delay: Duration) {
        self.script(op, Behaviour::DelayThenFail(delay));
    }

    fn script(&self, op: Op, behaviour: Behaviour) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry(op)
            .or_default()
            .push_back(behaviour);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn tree(&self, topic_id: &str) -> Option<TopicTreeResponse> {
        self.state.lock().unwrap().topics.get(topic_id).cloned()
    }

    pub fn question_text(&self, node_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let topic = state.topic_containing(node_id)?;
        match state.topics[&topic].get(node_id)? {
            TreeNode::Question(q) => Some(q.question_text.clone()),
            TreeNode::Topic(t) => Some(t.topic_name.clone()),
        }
    }

    /// Record the call and apply any scripted behaviour
    async fn enter(&self, op: Op) -> ApiResult<()> {
        let behaviour = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(op);
            state.scripted.get_mut(&op).and_then(VecDeque::pop_front)
        };
        match behaviour {
            None => Ok(()),
            Some(Behaviour::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Behaviour::Fail) => Err(server_error()),
            Some(Behaviour::DelayThenFail(delay)) => {
                tokio::time::sleep(delay).await;
                Err(server_error())
            }
        }
    }
}

fn server_error() -> ApiError {
    ApiError::Http {
        status: 500,
        body: "internal error".into(),
    }
}

fn insert_question(
    state: &mut FakeState,
    parent_id: &str,
    text: &str,
    answer: &str,
) -> ApiResult<NodeId> {
    let topic_id = state
        .topic_containing(parent_id)
        .ok_or_else(|| FakeState::not_found("parent", parent_id))?;
    let question_id = state.next_id("q");
    let created_at = state.now();
    let tree = state
        .topics
        .get_mut(&topic_id)
        .ok_or_else(|| FakeState::not_found("topic", &topic_id))?;

    let level = match tree.nodes.get_mut(parent_id) {
        Some(TreeNode::Topic(t)) => {
            t.children.push(question_id.clone());
            1
        }
        Some(TreeNode::Question(q)) => {
            q.children.push(question_id.clone());
            q.level + 1
        }
        None => return Err(FakeState::not_found("parent", parent_id)),
    };
    tree.nodes.insert(
        question_id.clone(),
        TreeNode::Question(QuestionNode {
            question_id: question_id.clone(),
            question_text: text.to_string(),
            answer_text: answer.to_string(),
            answer_id: None,
            level,
            created_at,
            children: Vec::new(),
            parent_id: Some(parent_id.to_string()),
        }),
    );
    Ok(question_id)
}

fn remove_subtree(tree: &mut TopicTreeResponse, node_id: &str) {
    if let Some(node) = tree.nodes.remove(node_id) {
        for child in node.children().to_vec() {
            remove_subtree(tree, &child);
        }
    }
}

fn patch_response(node_id: &str, node_type: &str, text: &str) -> PatchNodeResponse {
    PatchNodeResponse {
        node_id: node_id.to_string(),
        node_type: node_type.to_string(),
        node_data: text.to_string(),
    }
}

#[async_trait]
impl QuestionApi for FakeApi {
    async fn ask_question(
        &self,
        question_text: &str,
        parent_question_id: Option<&str>,
    ) -> ApiResult<TopicTreeResponse> {
        self.enter(Op::Ask).await?;
        let answer = format!("Answer to: {question_text}");
        match parent_question_id {
            Some(parent) => {
                let mut state = self.state.lock().unwrap();
                insert_question(&mut state, parent, question_text, &answer)?;
                let topic = state
                    .topic_containing(parent)
                    .ok_or_else(|| FakeState::not_found("parent", parent))?;
                Ok(state.topics[&topic].clone())
            }
            None => {
                let topic = self.create_topic(question_text);
                let mut state = self.state.lock().unwrap();
                insert_question(&mut state, &topic, question_text, &answer)?;
                Ok(state.topics[&topic].clone())
            }
        }
    }

    async fn get_topic_tree(&self, topic_id: &str) -> ApiResult<TopicTreeResponse> {
        self.enter(Op::GetTree).await?;
        self.tree(topic_id)
            .ok_or_else(|| FakeState::not_found("topic", topic_id))
    }

    async fn patch_question(
        &self,
        question_id: &str,
        new_text: &str,
    ) -> ApiResult<PatchNodeResponse> {
        self.enter(Op::PatchQuestion).await?;
        let mut state = self.state.lock().unwrap();
        let topic = state
            .topic_containing(question_id)
            .ok_or_else(|| FakeState::not_found("question", question_id))?;
        match state.topics.get_mut(&topic).and_then(|t| t.nodes.get_mut(question_id)) {
            Some(TreeNode::Question(q)) => {
                q.question_text = new_text.to_string();
                Ok(patch_response(question_id, "question", new_text))
            }
            _ => Err(FakeState::not_found("question", question_id)),
        }
    }

    async fn patch_topic(&self, topic_id: &str, new_name: &str) -> ApiResult<PatchNodeResponse> {
        self.enter(Op::PatchTopic).await?;
        let mut state = self.state.lock().unwrap();
        match state.topics.get_mut(topic_id).and_then(|t| t.nodes.get_mut(topic_id)) {
            Some(TreeNode::Topic(t)) => {
                t.topic_name = new_name.to_string();
                Ok(patch_response(topic_id, "topic", new_name))
            }
            _ => Err(FakeState::not_found("topic", topic_id)),
        }
    }

    async fn delete_question(&self, question_id: &str) -> ApiResult<()> {
        self.enter(Op::DeleteQuestion).await?;
        let mut state = self.state.lock().unwrap();
        let topic = state
            .topic_containing(question_id)
            .ok_or_else(|| FakeState::not_found("question", question_id))?;
        let Some(tree) = state.topics.get_mut(&topic) else {
            return Err(FakeState::not_found("topic", &topic));
        };
        remove_subtree(tree, question_id);
        for node in tree.nodes.values_mut() {
            match node {
                TreeNode::Topic(t) => t.children.retain(|c| c != question_id),
                TreeNode::Question(q) => q.children.retain(|c| c != question_id),
            }
        }
        Ok(())
    }

    async fn delete_topic(&self, topic_id: &str) -> ApiResult<()> {
        self.enter(Op::DeleteTopic).await?;
        self.state
            .lock()
            .unwrap()
            .topics
            .remove(topic_id)
            .map(|_| ())
            .ok_or_else(|| FakeState::not_found("topic", topic_id))
    }

    async fn search_questions(&self, keyword: &str) -> ApiResult<Vec<TopicTreeResponse>> {
        self.enter(Op::Search).await?;
        let needle = keyword.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .topics
            .values()
            .filter_map(|tree| {
                let nodes: BTreeMap<NodeId, TreeNode> = tree
                    .nodes
                    .iter()
                    .filter(|(id, node)| {
                        **id == tree.topic
                            || node
                                .as_question()
                                .is_some_and(|q| q.question_text.to_lowercase().contains(&needle))
                    })
                    .map(|(id, node)| (id.clone(), node.clone()))
                    .collect();
                (nodes.len() > 1).then(|| TopicTreeResponse {
                    topic: tree.topic.clone(),
                    nodes,
                })
            })
            .collect())
    }

    async fn topics_history(&self) -> ApiResult<Vec<TopicHistoryItem>> {
        self.enter(Op::History).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .topics
            .values()
            .filter_map(TopicTreeResponse::root_topic)
            .map(|t| TopicHistoryItem {
                topic_id: t.topic_id.clone(),
                topic_name: t.topic_name.clone(),
                created_at: t.created_at.clone(),
            })
            .collect())
    }
}
