use async_trait::async_trait;
use serde::Serialize;

use crate::db::models::ChatMessage;
use crate::db::{repos::settings, settings_keys, DbPool};
use crate::engine::sse::{self, DeltaStream};
use crate::error::AppError;

use super::ChatProvider;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// OpenRouter chat-completions client (OpenAI-compatible SSE).
pub struct OpenRouterProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    /// Resolve configuration from the settings table, falling back to env
    /// (`OPENROUTER_API_KEY`, `OPENROUTER_BASE_URL`, `OPENROUTER_MODEL`).
    pub fn from_settings(pool: &DbPool) -> Result<Self, AppError> {
        let api_key = settings::get(pool, settings_keys::COMPLETION_API_KEY)?
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
            .unwrap_or_default();
        let base_url = settings::get(pool, settings_keys::COMPLETION_BASE_URL)?
            .or_else(|| std::env::var("OPENROUTER_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings::get(pool, settings_keys::COMPLETION_MODEL)?
            .or_else(|| std::env::var("OPENROUTER_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        if api_key.is_empty() {
            tracing::warn!("No completion API key configured — generations will fail until one is set");
        }

        Ok(Self::new(base_url, api_key, model))
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "OpenRouter"
    }

    async fn open_stream(&self, messages: &[ChatMessage]) -> Result<DeltaStream, AppError> {
        let body = CompletionBody {
            model: &self.model,
            messages,
            stream: true,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "https://pageforge.app")
            .header("X-Title", "Pageforge")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Completion(format!(
                "completion endpoint returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        Ok(sse::delta_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sse::StreamDelta;
    use futures_util::StreamExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenRouterProvider {
        OpenRouterProvider::new(server.uri(), "sk-or-test".into(), "test/model".into())
    }

    #[tokio::test]
    async fn test_streams_deltas_from_endpoint() {
        let server = MockServer::start().await;
        let sse_body = "data: {\"choices\":[{\"delta\":{\"content\":\"<div>hi\"}}]}\n\ndata: [DONE]\n\n";

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let mut stream = provider
            .open_stream(&[ChatMessage::user("create a page")])
            .await
            .unwrap();

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamDelta::Content("<div>hi".into())
        );
        assert_eq!(stream.next().await.unwrap().unwrap(), StreamDelta::Done);
    }

    #[tokio::test]
    async fn test_non_success_status_is_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.open_stream(&[ChatMessage::user("hi")]).await;

        match result {
            Err(AppError::Completion(msg)) => assert!(msg.contains("500")),
            other => panic!("expected Completion error, got {:?}", other.map(|_| ())),
        }
    }
}
