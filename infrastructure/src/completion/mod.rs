//! Completion backend adapters.

mod openai;

pub use openai::OpenAiCompatibleClient;
