//! Coordination trace configuration from TOML (`[trace]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTraceConfig {
    /// Directory for per-session JSONL traces; tracing is off when unset.
    /// A leading `~/` is expanded to the home directory.
    pub dir: Option<String>,
}

impl FileTraceConfig {
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?.trim();
        if dir.is_empty() {
            return None;
        }
        match dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(dir)),
        }
    }
}
