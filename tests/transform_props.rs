//! Property tests for the flat-map → view-tree transform and path lookup.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use proptest::sample::Index;

use qtree::tree::transform::CYCLE_NODE_QUESTION;
use qtree::types::{QuestionNode, TopicNode, TopicTreeResponse, TreeNode, ViewData};
use qtree::{find_path, transform};

const TOPIC: &str = "t0";

/// A random tree shape: `parents[i]` is the parent of question `i`, where 0
/// is the topic and `k > 0` is question `k - 1`.
#[derive(Debug, Clone)]
struct Shape {
    parents: Vec<usize>,
}

impl Shape {
    fn len(&self) -> usize {
        self.parents.len()
    }

    fn node_id(slot: usize) -> String {
        if slot == 0 {
            TOPIC.to_string()
        } else {
            format!("q{}", slot - 1)
        }
    }

    /// Children of every slot, in insertion order
    fn children(&self) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); self.len() + 1];
        for (i, parent) in self.parents.iter().enumerate() {
            children[*parent].push(i + 1);
        }
        children
    }

    fn depth(&self, slot: usize) -> u32 {
        let mut depth = 0;
        let mut cursor = slot;
        while cursor != 0 {
            cursor = self.parents[cursor - 1];
            depth += 1;
        }
        depth
    }

    fn response(&self) -> TopicTreeResponse {
        let children = self.children();
        let ids = |slot: usize| -> Vec<String> {
            children[slot].iter().map(|c| Shape::node_id(*c)).collect()
        };

        let mut nodes = BTreeMap::new();
        nodes.insert(
            TOPIC.to_string(),
            TreeNode::Topic(TopicNode {
                topic_id: TOPIC.to_string(),
                topic_name: "Topic".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
                children: ids(0),
            }),
        );
        for slot in 1..=self.len() {
            let id = Shape::node_id(slot);
            nodes.insert(
                id.clone(),
                TreeNode::Question(QuestionNode {
                    question_id: id.clone(),
                    question_text: format!("Question {id}"),
                    answer_text: format!("Answer {id}"),
                    answer_id: None,
                    level: self.depth(slot),
                    created_at: "2024-01-01T00:00:00Z".into(),
                    children: ids(slot),
                    parent_id: Some(Shape::node_id(self.parents[slot - 1])),
                }),
            );
        }
        TopicTreeResponse {
            topic: TOPIC.to_string(),
            nodes,
        }
    }

    fn expected_view(&self) -> ViewData {
        fn build(slot: usize, children: &[Vec<usize>]) -> ViewData {
            let id = Shape::node_id(slot);
            let node = if slot == 0 {
                ViewData::new(&id, "Topic", "This is the root of the topic: Topic")
            } else {
                ViewData::new(&id, format!("Question {id}"), format!("Answer {id}"))
            };
            node.with_children(children[slot].iter().map(|c| build(*c, children)).collect())
        }
        build(0, &self.children())
    }
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(any::<Index>(), 1..40).prop_map(|picks| Shape {
        parents: picks
            .iter()
            .enumerate()
            .map(|(i, pick)| pick.index(i + 1))
            .collect(),
    })
}

proptest! {
    #[test]
    fn transform_preserves_shape_and_order(shape in arb_shape()) {
        let tree = transform(&shape.response());
        prop_assert_eq!(tree.node_count(), shape.len() + 1);
        prop_assert_eq!(tree, shape.expected_view());
    }

    #[test]
    fn transform_twice_gives_equal_trees(shape in arb_shape()) {
        let response = shape.response();
        prop_assert_eq!(transform(&response), transform(&response));
    }

    #[test]
    fn path_runs_from_root_to_target(shape in arb_shape()) {
        let tree = transform(&shape.response());

        for slot in 1..=shape.len() {
            let id = Shape::node_id(slot);
            let path = find_path(&tree, &id);
            prop_assert!(path.is_some(), "no path to {}", id);
            let path = path.unwrap_or_default();

            prop_assert_eq!(path.len() as u32, shape.depth(slot) + 1);
            prop_assert_eq!(path[0].id.as_str(), TOPIC);
            prop_assert_eq!(path[path.len() - 1].id.as_str(), id.as_str());
            for pair in path.windows(2) {
                prop_assert!(pair[0].child(&pair[1].id).is_some());
            }
            let distinct: HashSet<&str> = path.iter().map(|n| n.id.as_str()).collect();
            prop_assert_eq!(distinct.len(), path.len());
        }
        prop_assert!(find_path(&tree, "missing").is_none());
    }

    #[test]
    fn unlisted_level_one_questions_are_reattached(
        shape in arb_shape(),
        drops in prop::collection::vec(any::<bool>(), 40),
    ) {
        let mut response = shape.response();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        for (i, slot) in shape.children()[0].iter().enumerate() {
            if drops[i] {
                dropped.push(*slot);
            } else {
                kept.push(*slot);
            }
        }

        if let Some(TreeNode::Topic(topic)) = response.nodes.get_mut(TOPIC) {
            topic.children = kept.iter().map(|slot| Shape::node_id(*slot)).collect();
        }

        let tree = transform(&response);
        prop_assert_eq!(tree.node_count(), shape.len() + 1);

        // listed children first, then the re-attached ones in key order
        let mut reattached: Vec<String> = dropped.iter().map(|s| Shape::node_id(*s)).collect();
        reattached.sort();
        let expected: Vec<String> = kept
            .iter()
            .map(|s| Shape::node_id(*s))
            .chain(reattached)
            .collect();
        let actual: Vec<String> = tree.children.iter().map(|c| c.id.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn back_edge_to_parent_terminates_with_placeholder(shape in arb_shape(), pick in any::<Index>()) {
        let slot = pick.index(shape.len()) + 1;
        let id = Shape::node_id(slot);
        let parent_id = Shape::node_id(shape.parents[slot - 1]);

        let mut response = shape.response();
        if let Some(TreeNode::Question(question)) = response.nodes.get_mut(&id) {
            question.children.push(parent_id.clone());
        }

        let tree = transform(&response);
        prop_assert_eq!(tree.node_count(), shape.len() + 2);

        let node = tree.find(&id);
        prop_assert!(node.is_some());
        let placeholder = node.and_then(|n| n.children.last());
        prop_assert_eq!(placeholder.map(|p| p.id.as_str()), Some(parent_id.as_str()));
        prop_assert_eq!(
            placeholder.map(|p| p.question_text.as_str()),
            Some(CYCLE_NODE_QUESTION)
        );
    }
}
