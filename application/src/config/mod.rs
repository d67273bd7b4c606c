//! Application-level configuration.
//!
//! - [`EngineConfig`]: worker timeout, concurrency bound, synthesis fallback

pub mod engine_config;

pub use engine_config::{DEFAULT_SYNTHESIS_FALLBACK, EngineConfig};
