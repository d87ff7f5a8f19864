//! Client configuration loaded from the environment

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

/// Default service root when `QTREE_API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for the question service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root; endpoint paths are appended to it
    pub base_url: Url,
    /// Attached as `Authorization: Bearer ...` when present
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            bearer_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Builder: set bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Builder: set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `QTREE_API_URL`, `QTREE_API_TOKEN` and `QTREE_TIMEOUT_SECS`.
    ///
    /// A `.env` file in the working directory is honoured if present.
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("QTREE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(token) = std::env::var("QTREE_API_TOKEN") {
            if !token.trim().is_empty() {
                config.bearer_token = Some(token);
            }
        }

        if let Ok(raw) = std::env::var("QTREE_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| ApiError::Config(format!("QTREE_TIMEOUT_SECS=`{raw}` is not a number")))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw).map_err(|e| ApiError::Config(format!("`{raw}`: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!("`{raw}` is not an http(s) URL")));
    }
    if url.cannot_be_a_base() {
        return Err(ApiError::Config(format!("`{raw}` cannot carry endpoint paths")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_timeout() {
        let config = ClientConfig::new("https://example.test/api").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            ClientConfig::new("mailto:someone@example.test"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(ClientConfig::new("not a url"), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            ClientConfig::new("ftp://example.test/api"),
            Err(ApiError::Config(_))
        ));
        assert!(ClientConfig::new("http://localhost:8080/api").is_ok());
    }
}
