//! qtree - question tree client core
//!
//! Turns the question service's flat node map into a navigable view tree and
//! keeps it in sync with the service:
//!
//! - [`tree`]: transform the server map, find paths, edit subtrees
//! - [`store`]: the single owner of the tree, the navigation path and the view mode
//! - [`api`]: the [`QuestionApi`](api::QuestionApi) boundary and its HTTP client
//! - [`controller`]: async glue driving the store against an API
//!
//! The graph view lives in the `qtree-graph` crate and only reads the tree.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod store;
pub mod tree;

pub use api::{HttpQuestionApi, QuestionApi};
pub use config::ClientConfig;
pub use controller::TreeController;
pub use error::{ApiError, ApiResult, StoreError, StoreResult};
pub use store::{Notification, NotificationLevel, QuestionTreeStore, ViewMode};
pub use tree::{find_path, transform};

pub use qtree_types as types;
