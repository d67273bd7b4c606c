//! Prompt domain
//!
//! Templates for building each worker role's completion request.

mod template;

pub use template::PromptTemplate;
