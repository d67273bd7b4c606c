//! Query value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The question every worker in a session answers (Value Object)
///
/// Immutable once the session starts. Whitespace-only content is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a query, rejecting empty or whitespace-only content
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::try_new("Should we ship on Fridays?").unwrap();
        assert_eq!(q.content(), "Should we ship on Fridays?");
        assert_eq!(q.to_string(), "Should we ship on Fridays?");
    }

    #[test]
    fn test_blank_query_rejected() {
        assert!(matches!(
            Query::try_new(""),
            Err(DomainError::InvalidQuery(_))
        ));
        assert!(Query::try_new("  \n\t").is_err());
    }

    #[test]
    fn test_query_serializes_as_plain_string() {
        let q = Query::try_new("why?").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"why?\"");
    }
}
