//! HTTP implementation of [`QuestionApi`] over reqwest.

use async_trait::async_trait;
use qtree_types::{
    AskQuestionRequest, PatchNodeRequest, PatchNodeResponse, TopicHistoryItem, TopicTreeResponse,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::QuestionApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Question service client
#[derive(Clone)]
pub struct HttpQuestionApi {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpQuestionApi {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url,
            bearer_token: config.bearer_token,
        })
    }

    /// Build from `QTREE_*` environment variables
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as needed
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("`{}` cannot carry endpoint paths", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "question service returned an error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QuestionApi for HttpQuestionApi {
    async fn ask_question(
        &self,
        question_text: &str,
        parent_question_id: Option<&str>,
    ) -> ApiResult<TopicTreeResponse> {
        let body = AskQuestionRequest {
            question_text: question_text.to_string(),
            parent_question_id: parent_question_id.map(str::to_string),
        };
        let url = self.endpoint(&["questions"])?;
        tracing::debug!(%url, parent = ?parent_question_id, "POST question");
        self.send_json(self.request(Method::POST, url).json(&body))
            .await
    }

    async fn get_topic_tree(&self, topic_id: &str) -> ApiResult<TopicTreeResponse> {
        let url = self.endpoint(&["topics", topic_id, "tree"])?;
        tracing::debug!(%url, "GET topic tree");
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn patch_question(
        &self,
        question_id: &str,
        new_text: &str,
    ) -> ApiResult<PatchNodeResponse> {
        let url = self.endpoint(&["questions", question_id])?;
        let body = PatchNodeRequest {
            new_node_name: new_text.to_string(),
        };
        self.send_json(self.request(Method::PATCH, url).json(&body))
            .await
    }

    async fn patch_topic(&self, topic_id: &str, new_name: &str) -> ApiResult<PatchNodeResponse> {
        let url = self.endpoint(&["topics", topic_id])?;
        let body = PatchNodeRequest {
            new_node_name: new_name.to_string(),
        };
        self.send_json(self.request(Method::PATCH, url).json(&body))
            .await
    }

    async fn delete_question(&self, question_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["questions", question_id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn delete_topic(&self, topic_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["topics", topic_id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn search_questions(&self, keyword: &str) -> ApiResult<Vec<TopicTreeResponse>> {
        let mut url = self.endpoint(&["questions", "search"])?;
        url.query_pairs_mut().append_pair("keyword", keyword);
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn topics_history(&self) -> ApiResult<Vec<TopicHistoryItem>> {
        let url = self.endpoint(&["topics", "history"])?;
        self.send_json(self.request(Method::GET, url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpQuestionApi {
        HttpQuestionApi::new(ClientConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let api = api("http://localhost:8080/api");
        assert_eq!(
            api.endpoint(&["topics", "t1", "tree"]).unwrap().as_str(),
            "http://localhost:8080/api/topics/t1/tree"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let api = api("http://localhost:8080/api/");
        assert_eq!(
            api.endpoint(&["questions"]).unwrap().as_str(),
            "http://localhost:8080/api/questions"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = api("http://localhost:8080/api");
        assert_eq!(
            api.endpoint(&["questions", "a b/c"]).unwrap().as_str(),
            "http://localhost:8080/api/questions/a%20b%2Fc"
        );
    }
}
