//! Driver configuration with environment overrides.

use std::env;

use serde::{Deserialize, Serialize};

use interaction_engine::InteractPolicy;

/// Pacing and observability knobs. Every field can be overridden through a
/// `VIEWDRIVER_*` environment variable of the same name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    pub settle_ms: u64,
    pub phase_delay_ms: u64,
    pub key_delay_ms: u64,
    pub after_action_ms: u64,
    pub highlight: bool,
    pub max_text_len: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let policy = InteractPolicy::default();
        Self {
            settle_ms: policy.settle_ms,
            phase_delay_ms: policy.phase_delay_ms,
            key_delay_ms: policy.key_delay_ms,
            after_action_ms: policy.after_action_ms,
            highlight: policy.highlight,
            max_text_len: policy.max_text_len,
        }
    }
}

impl DriverConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_u64("VIEWDRIVER_SETTLE_MS") {
            config.settle_ms = value;
        }
        if let Some(value) = env_u64("VIEWDRIVER_PHASE_DELAY_MS") {
            config.phase_delay_ms = value;
        }
        if let Some(value) = env_u64("VIEWDRIVER_KEY_DELAY_MS") {
            config.key_delay_ms = value;
        }
        if let Some(value) = env_u64("VIEWDRIVER_AFTER_ACTION_MS") {
            config.after_action_ms = value;
        }
        if let Ok(raw) = env::var("VIEWDRIVER_HIGHLIGHT") {
            config.highlight = !matches!(
                raw.to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        config
    }

    pub fn interact_policy(&self) -> InteractPolicy {
        InteractPolicy {
            settle_ms: self.settle_ms,
            phase_delay_ms: self.phase_delay_ms,
            key_delay_ms: self.key_delay_ms,
            after_action_ms: self.after_action_ms,
            highlight: self.highlight,
            max_text_len: self.max_text_len,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
