//! HTTP persona source
//!
//! Fetches persona attributes from `GET {base_url}/api/personas/{id}`.

use crate::config::FilePersonasConfig;
use crate::http::{HttpClientError, build_client, join_segments, parse_base_url};
use async_trait::async_trait;
use council_application::ports::persona_lookup::{LookupError, PersonaLookup};
use council_domain::PersonaAttributes;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::debug;

/// [`PersonaLookup`] backed by the persona service's REST API
pub struct HttpPersonaLookup {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpPersonaLookup {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        Ok(Self {
            http: build_client(Some(timeout))?,
            base_url: parse_base_url(base_url)?,
            api_token,
        })
    }

    pub fn from_config(config: &FilePersonasConfig) -> Result<Self, HttpClientError> {
        Self::new(
            &config.base_url,
            config.resolve_api_token(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, persona_id: &str) -> Url {
        join_segments(&self.base_url, ["api", "personas", persona_id])
    }
}

#[async_trait]
impl PersonaLookup for HttpPersonaLookup {
    async fn get(&self, persona_id: &str) -> Result<PersonaAttributes, LookupError> {
        let url = self.url(persona_id);
        debug!("GET {}", url);

        let mut request = self.http.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(persona_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Upstream {
                status_code: status.as_u16(),
                body,
            });
        }

        response
            .json::<PersonaAttributes>()
            .await
            .map_err(|e| LookupError::Transport(format!("invalid persona payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(server: &MockServer, token: Option<&str>) -> HttpPersonaLookup {
        HttpPersonaLookup::new(&server.uri(), token.map(String::from), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_persona() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/personas/p-42"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p-42",
                "name": "Maya",
                "background": "Nurse for 20 years",
                "occupation": "Nurse",
                "location": "Leeds",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let persona = lookup(&server, Some("secret")).get("p-42").await.unwrap();
        assert_eq!(persona.name.as_deref(), Some("Maya"));
        assert_eq!(persona.occupation.as_deref(), Some("Nurse"));
        assert_eq!(persona.extra.get("id"), Some(&json!("p-42")));
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "Persona not found"
            })))
            .mount(&server)
            .await;

        let err = lookup(&server, None).get("ghost").await.unwrap_err();
        assert_eq!(err, LookupError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_other_status_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Access denied"))
            .mount(&server)
            .await;

        let err = lookup(&server, None).get("p").await.unwrap_err();
        assert_eq!(
            err,
            LookupError::Upstream {
                status_code: 403,
                body: "Access denied".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let lookup =
            HttpPersonaLookup::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let err = lookup.get("p").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }

    #[test]
    fn test_persona_id_is_encoded() {
        let lookup =
            HttpPersonaLookup::new("http://localhost:3000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            lookup.url("a b/c").as_str(),
            "http://localhost:3000/api/personas/a%20b%2Fc"
        );
        // A path prefix on the base URL is kept
        let lookup =
            HttpPersonaLookup::new("http://gateway/people", None, Duration::from_secs(1)).unwrap();
        assert_eq!(lookup.url("p-1").as_str(), "http://gateway/people/api/personas/p-1");
    }
}
