//! Worker identity (Value Objects)

use super::persona::PersonaAttributes;
use serde::{Deserialize, Serialize};

/// Role a worker plays in a session
///
/// The role decides where the plan builder schedules the worker:
/// personas fan out together, the synthesizer runs last, and coordinators
/// are registered but never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    Persona,
    Synthesizer,
    Coordinator,
}

impl WorkerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerRole::Persona => "persona",
            WorkerRole::Synthesizer => "synthesizer",
            WorkerRole::Coordinator => "coordinator",
        }
    }
}

impl std::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "persona" => Ok(WorkerRole::Persona),
            "synthesizer" => Ok(WorkerRole::Synthesizer),
            "coordinator" => Ok(WorkerRole::Coordinator),
            other => Err(format!("unknown worker role: {}", other)),
        }
    }
}

/// Immutable identity of one worker in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Unique within a session
    pub id: String,
    pub display_name: String,
    pub role: WorkerRole,
    /// Persona background used to build the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<PersonaAttributes>,
}

impl WorkerSpec {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: WorkerRole) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            attributes: None,
        }
    }

    /// A persona worker; the display name falls back to the id when the
    /// attributes carry no name.
    pub fn persona(id: impl Into<String>, attributes: PersonaAttributes) -> Self {
        let id = id.into();
        let display_name = attributes.name.clone().unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            role: WorkerRole::Persona,
            attributes: Some(attributes),
        }
    }

    pub fn synthesizer(id: impl Into<String>) -> Self {
        Self::new(id, "Synthesizer", WorkerRole::Synthesizer)
    }

    pub fn with_attributes(mut self, attributes: PersonaAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }
}
