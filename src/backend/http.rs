//! HTTP implementation of the tutoring backend
//!
//! Talks JSON to `GET /api/history` and `POST /api/chat` with `reqwest`.

use crate::backend::{ChatBackend, ChatReply, ChatRequest, ChatResponseBody, HistoryResponse};
use crate::config::ServerConfig;
use crate::error::{NoduError, Result};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::time::Duration;

/// Backend reached over HTTP
///
/// # Examples
///
/// ```
/// use nodu::backend::HttpBackend;
/// use nodu::config::ServerConfig;
///
/// let backend = HttpBackend::new(&ServerConfig::default());
/// assert!(backend.is_ok());
/// ```
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client from server configuration
    ///
    /// # Errors
    ///
    /// Returns error if the cookie is not a valid header value or the
    /// HTTP client cannot be built
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| NoduError::Config(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("nodu/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(NoduError::Http)?;

        tracing::info!("Initialized HTTP backend: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn fetch_history(&self) -> Result<HistoryResponse> {
        let url = self.endpoint("/api/history");
        tracing::debug!("Fetching history from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("History request failed: {}", e);
            NoduError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NoduError::Backend(format!(
                "History endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let history: HistoryResponse = response.json().await.map_err(|e| {
            NoduError::Backend(format!("Failed to parse history response: {}", e))
        })?;

        Ok(history)
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = self.endpoint("/api/chat");
        tracing::debug!(
            "Sending chat message: tutor={}, chars={}, attachment={}",
            request.tutor_type,
            request.message.len(),
            request.has_attachment()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                NoduError::Http(e)
            })?;

        // Error payloads arrive with 4xx/5xx statuses, so the body decides.
        let status = response.status();
        let text = response.text().await.map_err(NoduError::Http)?;

        let body: ChatResponseBody = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Chat endpoint returned {} with unparseable body", status);
            NoduError::Backend(format!("Failed to parse chat response ({}): {}", status, e))
        })?;

        body.into_reply().ok_or_else(|| {
            NoduError::Backend(format!(
                "Chat response ({}) carried neither reply nor error",
                status
            ))
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ServerConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..Default::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(
            backend.endpoint("/api/chat"),
            "http://localhost:5000/api/chat"
        );
    }

    #[test]
    fn test_invalid_cookie_is_config_error() {
        let config = ServerConfig {
            session_cookie: Some("bad\ncookie".to_string()),
            ..Default::default()
        };
        let err = HttpBackend::new(&config).err().unwrap();
        assert!(err.to_string().contains("Invalid session cookie"));
    }
}
