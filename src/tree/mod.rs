//! View tree construction, navigation and editing

pub mod edit;
pub mod path;
pub mod transform;

pub use edit::{detach_subtree, insert_child, set_question_text, DetachedSubtree};
pub use path::{find_path, find_path_ids, resolve_ids};
pub use transform::transform;
