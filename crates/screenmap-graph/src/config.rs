//! Navigator configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Longest route `goto` will replay (default: 256 hops).
    pub max_route_hops: usize,
    /// Maximum back-stack depth; oldest entries are evicted. None = unbounded.
    pub history_limit: Option<usize>,
    /// Whether to keep a [`NavigationTrace`](crate::traversal::trace::NavigationTrace).
    pub record_trace: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            max_route_hops: 256,
            history_limit: None,
            record_trace: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_config(json: &str) -> Result<NavigatorConfig, ConfigError> {
    Ok(serde_json::from_str(json)?)
}
