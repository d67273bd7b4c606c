//! OpenAI-compatible chat completion client
//!
//! Talks to any `/chat/completions` endpoint that follows the OpenAI wire
//! format (the default configuration points at xAI's Grok API).

use crate::config::FileCompletionConfig;
use crate::http::{HttpClientError, build_client, join_segments, parse_base_url};
use async_trait::async_trait;
use council_application::ports::completion_client::{CompletionClient, CompletionError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// [`CompletionClient`] over an OpenAI-compatible HTTP API
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    /// Named in the error when no key is configured
    api_key_env: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, HttpClientError> {
        Ok(Self {
            http: build_client(None)?,
            endpoint: join_segments(&parse_base_url(base_url)?, ["chat", "completions"]),
            model: model.into(),
            api_key,
            api_key_env: "API key".to_string(),
            temperature: 0.7,
            max_tokens: None,
        })
    }

    /// Build from the `[completion]` config section, reading the key from
    /// its environment variable.
    pub fn from_config(config: &FileCompletionConfig) -> Result<Self, HttpClientError> {
        let mut client = Self::new(&config.base_url, &config.model, config.resolve_api_key())?
            .with_temperature(config.temperature);
        client.api_key_env = config.api_key_env.clone();
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(
        &'a self,
        prompt: &'a str,
        system_prompt: Option<&'a str>,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionError::Unavailable(format!(
                "{} not set",
                self.api_key_env
            )));
        };

        debug!("POST {} (model {})", self.endpoint, self.model);

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&self.request_body(prompt, system_prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Unavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream {
                status_code: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Malformed(format!("could not read body: {}", e))
            }
        })?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(format!("invalid JSON: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                CompletionError::Malformed("missing choices[0].message.content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(
            &format!("{}/v1", server.uri()),
            "grok-3",
            key.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_matches_openai_format() {
        let client = OpenAiCompatibleClient::new("https://api.x.ai/v1", "grok-3", None)
            .unwrap()
            .with_temperature(0.5)
            .with_max_tokens(256);

        let body = serde_json::to_value(client.request_body("Hello", Some("Be brief."))).unwrap();
        assert_eq!(body["model"], "grok-3");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Be brief.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");

        let body = serde_json::to_value(client.request_body("Hello", None)).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "grok-3" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, Some("test-key"))
            .complete("Hello", Some("system"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None)
            .complete("Hello", None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_non_2xx_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .complete("Hello", None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompletionError::Upstream {
                status_code: 429,
                body: "rate limited".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .complete("Hello", None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .complete("Hello", None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({
                        "choices": [{ "message": { "content": "late" } }]
                    })),
            )
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .complete("Hello", None, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err, CompletionError::Timeout);
    }

    #[test]
    fn test_malformed_base_url_is_rejected_up_front() {
        for bad in ["http://exa mple.com", "https://host:notaport", "api.x.ai/v1"] {
            assert!(matches!(
                OpenAiCompatibleClient::new(bad, "grok-3", None),
                Err(HttpClientError::InvalidBaseUrl { .. })
            ));
        }
    }

    #[test]
    fn test_from_config_uses_direct_key() {
        let config = FileCompletionConfig {
            api_key: Some("direct".into()),
            api_key_env: "COUNCIL_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        let client = OpenAiCompatibleClient::from_config(&config).unwrap();
        assert!(client.has_api_key());
        assert_eq!(client.model(), "grok-3");
        assert_eq!(client.endpoint.as_str(), "https://api.x.ai/v1/chat/completions");
    }
}
