//! Prompt templates for persona, synthesis and coordinator workers

use crate::session::results::ResultSet;
use crate::worker::persona::PersonaAttributes;
use crate::worker::result::WorkerOutcome;
use crate::worker::spec::WorkerSpec;
use serde_json::{Map, Value, json};

/// Templates for generating prompts for each worker role
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a persona worker
    pub fn persona_system(display_name: &str) -> String {
        format!(
            "You are {}. Stay in character and answer from your own background, \
values and experience. Provide thoughtful, persona-appropriate responses.",
            display_name
        )
    }

    /// User prompt for a persona worker
    pub fn persona_prompt(spec: &WorkerSpec, query: &str) -> String {
        let mut prompt = format!("You are {}.\n", spec.display_name);

        if let Some(attrs) = &spec.attributes {
            prompt.push_str(&Self::persona_context(attrs));
        }

        prompt.push_str(&format!(
            r#"
Respond to this query from your unique perspective:

{}

Consider your background, your values and any relevant personal experience.
Be authentic to your persona and keep the answer focused and actionable."#,
            query
        ));

        prompt
    }

    fn persona_context(attrs: &PersonaAttributes) -> String {
        attrs
            .described_fields()
            .into_iter()
            .map(|(label, value)| format!("{}: {}\n", label, value))
            .collect()
    }

    /// System prompt for the synthesis step
    pub fn synthesis_system() -> &'static str {
        r#"You are an expert at synthesizing diverse perspectives into coherent insights.
Your task is to:
1. Highlight key insights from each perspective
2. Identify areas of agreement and disagreement
3. Provide actionable recommendations
4. Preserve the distinct voice of each persona

Be balanced and objective."#
    }

    /// User prompt for the synthesis step
    pub fn synthesis_prompt(query: &str, peer_results: &ResultSet) -> String {
        format!(
            r#"Original query: {}

Persona responses:
{}

Synthesize these responses into one comprehensive, well-structured analysis
with clear sections."#,
            query,
            Self::serialize_results(peer_results)
        )
    }

    /// JSON view of the results collected so far, keyed by worker id
    pub fn serialize_results(results: &ResultSet) -> String {
        let mut map = Map::new();
        for result in results {
            let entry = match &result.outcome {
                WorkerOutcome::Success { text } => json!({ "response": text }),
                WorkerOutcome::Failure {
                    error_kind,
                    message,
                } => json!({ "error": error_kind.as_str(), "message": message }),
            };
            map.insert(result.worker_id.clone(), entry);
        }
        serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
    }

    /// System prompt for a coordinator run directly through `Worker::execute`
    pub fn coordinator_system(spec: &WorkerSpec) -> String {
        format!(
            "You are {}, an expert {}. Provide a thoughtful analysis.",
            spec.display_name, spec.role
        )
    }

    /// User prompt for a coordinator; plans never schedule one
    pub fn coordinator_prompt(spec: &WorkerSpec, query: &str) -> String {
        format!(
            "You are {}, a {}.\n\nAnalyze this query and provide your expert perspective:\n\n{}",
            spec.display_name, spec.role, query
        )
    }
}
