//! QuestionApi trait: the only boundary between the client core and the
//! question service. The store never sees HTTP; the controller talks to an
//! implementation of this trait and feeds results back into the store.

pub mod http;

pub use http::HttpQuestionApi;

use async_trait::async_trait;
use qtree_types::{PatchNodeResponse, TopicHistoryItem, TopicTreeResponse};

use crate::error::ApiResult;

#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// `POST /questions`. `None` parent starts a new topic. Returns the whole
    /// updated tree.
    async fn ask_question(
        &self,
        question_text: &str,
        parent_question_id: Option<&str>,
    ) -> ApiResult<TopicTreeResponse>;

    /// `GET /topics/{id}/tree`
    async fn get_topic_tree(&self, topic_id: &str) -> ApiResult<TopicTreeResponse>;

    /// `PATCH /questions/{id}`
    async fn patch_question(&self, question_id: &str, new_text: &str)
        -> ApiResult<PatchNodeResponse>;

    /// `PATCH /topics/{id}`
    async fn patch_topic(&self, topic_id: &str, new_name: &str) -> ApiResult<PatchNodeResponse>;

    /// `DELETE /questions/{id}`
    async fn delete_question(&self, question_id: &str) -> ApiResult<()>;

    /// `DELETE /topics/{id}`
    async fn delete_topic(&self, topic_id: &str) -> ApiResult<()>;

    /// `GET /questions/search?keyword=`. One partial tree per matching topic.
    async fn search_questions(&self, keyword: &str) -> ApiResult<Vec<TopicTreeResponse>>;

    /// `GET /topics/history`, in server order
    async fn topics_history(&self) -> ApiResult<Vec<TopicHistoryItem>>;
}
