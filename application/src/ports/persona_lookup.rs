//! Persona lookup port

use async_trait::async_trait;
use council_domain::PersonaAttributes;
use thiserror::Error;

/// Errors that can occur while fetching a persona
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Persona not found: {0}")]
    NotFound(String),

    #[error("Persona source error (HTTP {status_code}): {body}")]
    Upstream { status_code: u16, body: String },

    #[error("Persona source unreachable: {0}")]
    Transport(String),
}

/// Source of persona attributes by id
#[async_trait]
pub trait PersonaLookup: Send + Sync {
    async fn get(&self, persona_id: &str) -> Result<PersonaAttributes, LookupError>;
}
