use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for interaction pacing and observability.
///
/// Delays exist to emulate human timing and to give framework listeners a
/// chance to process each step before the next one reads geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractPolicy {
    /// Wait after scroll-into-view before geometry is re-read.
    pub settle_ms: u64,
    /// Gap between synthetic event phases (hover, press, release, ...).
    pub phase_delay_ms: u64,
    /// Gap between individual keystrokes while typing.
    pub key_delay_ms: u64,
    /// Wait after the final dispatch before post signals are collected.
    pub after_action_ms: u64,
    /// Draw a temporary outline around the target while dispatching.
    pub highlight: bool,
    pub max_text_len: usize,
}

impl Default for InteractPolicy {
    fn default() -> Self {
        Self {
            settle_ms: 400,
            phase_delay_ms: 40,
            key_delay_ms: 20,
            after_action_ms: 250,
            highlight: true,
            max_text_len: 4096,
        }
    }
}

impl InteractPolicy {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    pub fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }

    pub fn after_action(&self) -> Duration {
        Duration::from_millis(self.after_action_ms)
    }
}
