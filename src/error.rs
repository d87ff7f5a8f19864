//! Error types for the remote collaborator and the store boundary

use qtree_types::NodeId;
use thiserror::Error;

/// Failure talking to the question service
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Result type for remote calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the question tree store
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("no topic is loaded")]
    NoTopicLoaded,

    #[error("node `{0}` is not in the current tree")]
    NodeNotFound(NodeId),

    #[error("`{child}` is not a child of `{parent}`")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("question text cannot be empty")]
    EmptyText,

    #[error("the topic root cannot be deleted as a question")]
    CannotDeleteRoot,

    #[error("server response did not contain the new question")]
    NewNodeMissing,

    #[error("response belongs to a tree that has since been reloaded")]
    Stale,

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
