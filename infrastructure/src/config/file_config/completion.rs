//! Completion backend configuration from TOML (`[completion]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompletionConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for FileCompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.x.ai/v1".to_string(),
            model: "grok-3".to_string(),
            api_key_env: "GROK_API_KEY".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

impl FileCompletionConfig {
    /// The direct key if set, otherwise the value of `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}
