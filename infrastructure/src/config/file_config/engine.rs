//! Engine configuration from TOML (`[engine]` section)

use council_application::{DEFAULT_SYNTHESIS_FALLBACK, EngineConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Budget for one worker's completion call, in seconds
    pub worker_timeout_secs: u64,
    /// Workers running at once within a batch (0 = unbounded)
    pub max_concurrency: usize,
    /// Synthesis text used when the synthesizer fails
    pub synthesis_fallback: String,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            worker_timeout_secs: 30,
            max_concurrency: 8,
            synthesis_fallback: DEFAULT_SYNTHESIS_FALLBACK.to_string(),
        }
    }
}

impl FileEngineConfig {
    /// Convert to the application-layer [`EngineConfig`]
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_worker_timeout(Duration::from_secs(self.worker_timeout_secs))
            .with_max_concurrency(self.max_concurrency)
            .with_synthesis_fallback(self.synthesis_fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_engine_config() {
        let file = FileEngineConfig {
            worker_timeout_secs: 5,
            max_concurrency: 0,
            synthesis_fallback: "none".to_string(),
        };
        let config = file.to_engine_config();
        assert_eq!(config.worker_timeout, Duration::from_secs(5));
        assert!(config.max_concurrency.is_none());
        assert_eq!(config.synthesis_fallback, "none");
    }

    #[test]
    fn test_defaults_bound_concurrency() {
        let config = FileEngineConfig::default().to_engine_config();
        assert_eq!(config.max_concurrency, Some(8));
        assert_eq!(config.worker_timeout, Duration::from_secs(30));
    }
}
