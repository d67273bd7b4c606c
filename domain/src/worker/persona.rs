//! Persona attributes as returned by the persona source.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Background a persona worker speaks from.
///
/// The well-known fields feed the persona prompt directly. Anything else the
/// persona source returns is kept in [`extra`](Self::extra) so no data is lost
/// on the way through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PersonaAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_perspective(mut self, perspective: impl Into<String>) -> Self {
        self.perspective = Some(perspective.into());
        self
    }

    pub fn with_values(mut self, values: impl Into<String>) -> Self {
        self.values = Some(values.into());
        self
    }

    /// Labelled, non-empty well-known fields in prompt order.
    pub fn described_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Background", &self.background),
            ("Perspective", &self.perspective),
            ("Values", &self.values),
            ("Occupation", &self.occupation),
            ("Location", &self.location),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let attrs: PersonaAttributes = serde_json::from_value(json!({
            "id": "p-9",
            "name": "Jordan",
            "occupation": "Nurse",
            "age": 41
        }))
        .unwrap();

        assert_eq!(attrs.name.as_deref(), Some("Jordan"));
        assert_eq!(attrs.occupation.as_deref(), Some("Nurse"));
        assert_eq!(attrs.extra.get("age"), Some(&json!(41)));
        assert_eq!(attrs.extra.get("id"), Some(&json!("p-9")));
    }

    #[test]
    fn test_described_fields_skips_blank() {
        let attrs = PersonaAttributes::named("Jordan")
            .with_background("ER nurse")
            .with_values("   ");
        assert_eq!(attrs.described_fields(), vec![("Background", "ER nurse")]);
    }
}
