use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub settle_delay_ms: u64,
    pub auto_trigger_enabled: bool,
    pub include_suggestions_with_references: bool,
    pub request_timeout_ms: u64,
    pub max_context_chars: usize,
    pub max_results: usize,
    pub allow_key_based_connections: bool,
    pub decision_history_limit: usize,
}

impl Settings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 30,
            auto_trigger_enabled: true,
            include_suggestions_with_references: true,
            request_timeout_ms: 5_000,
            max_context_chars: 10_240,
            max_results: 5,
            allow_key_based_connections: false,
            decision_history_limit: 256,
        }
    }
}
