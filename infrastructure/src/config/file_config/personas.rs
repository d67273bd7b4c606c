//! Persona source configuration from TOML (`[personas]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonasConfig {
    /// Base URL of the persona service; `/api/personas/{id}` is appended.
    pub base_url: String,
    /// Environment variable holding the bearer token.
    pub api_token_env: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FilePersonasConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_token_env: "API_TOKEN".to_string(),
            api_token: None,
            timeout_secs: 10,
        }
    }
}

impl FilePersonasConfig {
    pub fn resolve_api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(&self.api_token_env).ok())
            .filter(|token| !token.trim().is_empty())
    }
}
