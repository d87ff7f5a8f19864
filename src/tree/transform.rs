//! Flat server node map → recursive view tree.
//!
//! The transform never fails. Dangling child references and cycles become
//! placeholder nodes (logged at `error!`), and level-1 questions the server
//! forgot to list under the topic are re-attached to the root.

use std::collections::HashSet;

use qtree_types::{NodeId, TopicTreeResponse, TreeNode, ViewData};

/// Question text of the placeholder for a dangling reference
pub const MISSING_NODE_QUESTION: &str = "Error: Node not found";
/// Answer text of the placeholder for a dangling reference
pub const MISSING_NODE_ANSWER: &str = "This node could not be loaded due to missing data.";

/// Question text of the placeholder for a reference back to an ancestor
pub const CYCLE_NODE_QUESTION: &str = "Error: Circular reference";
/// Answer text of the placeholder for a reference back to an ancestor
pub const CYCLE_NODE_ANSWER: &str = "This node already appears above itself in the topic tree.";

/// Answer text shown for the topic root
pub fn topic_root_answer(topic_name: &str) -> String {
    format!("This is the root of the topic: {topic_name}")
}

/// Build the view tree for a server response.
pub fn transform(response: &TopicTreeResponse) -> ViewData {
    let mut builder = TreeBuilder {
        response,
        ancestors: Vec::new(),
    };
    let mut root = builder.build(&response.topic);

    let mut reached = reachable_from(response, &response.topic);
    for (key, node) in &response.nodes {
        let is_orphan_level_one = matches!(node, TreeNode::Question(q) if q.level == 1);
        if !is_orphan_level_one || reached.contains(key.as_str()) {
            continue;
        }
        tracing::debug!(node_id = %key, "re-attaching unreferenced level-1 question to topic root");
        reached.extend(reachable_from(response, key));
        root.children.push(builder.build(key));
    }

    root
}

struct TreeBuilder<'a> {
    response: &'a TopicTreeResponse,
    ancestors: Vec<NodeId>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, id: &str) -> ViewData {
        if self.ancestors.iter().any(|a| a == id) {
            tracing::error!(node_id = %id, "node is its own ancestor; substituting placeholder");
            return ViewData::new(id, CYCLE_NODE_QUESTION, CYCLE_NODE_ANSWER);
        }

        let response = self.response;
        let Some(node) = response.get(id) else {
            tracing::error!(
                node_id = %id,
                "node referenced as a child but missing from the response; substituting placeholder"
            );
            return ViewData::new(id, MISSING_NODE_QUESTION, MISSING_NODE_ANSWER);
        };

        self.ancestors.push(id.to_string());
        let children = node
            .children()
            .iter()
            .map(|child| self.build(child))
            .collect();
        self.ancestors.pop();

        match node {
            TreeNode::Topic(topic) => ViewData {
                id: topic.topic_id.clone(),
                question_text: topic.topic_name.clone(),
                answer_text: topic_root_answer(&topic.topic_name),
                children,
            },
            TreeNode::Question(question) => ViewData {
                id: question.question_id.clone(),
                question_text: question.question_text.clone(),
                answer_text: question.answer_text.clone(),
                children,
            },
        }
    }
}

/// Keys reachable from `start` through declared `children` arrays
fn reachable_from<'a>(response: &'a TopicTreeResponse, start: &'a str) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = response.get(id) {
            stack.extend(node.children().iter().map(String::as_str));
        }
    }
    seen
}
