//! Canvas engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::history::DEFAULT_HISTORY_LIMIT;

/// Tunables for the editor and its synchronization controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Maximum number of undo snapshots kept per step
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Quiet period before an auto-save fires, in milliseconds
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
    /// Use element lists already present on a loaded funnel instead of
    /// fetching them from storage on step switch
    #[serde(default = "default_use_cached_steps")]
    pub use_cached_steps: bool,
    /// Buffered notifications per subscriber
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_autosave_debounce_ms() -> u64 {
    500
}

fn default_use_cached_steps() -> bool {
    true
}

fn default_event_capacity() -> usize {
    256
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
            use_cached_steps: default_use_cached_steps(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl CanvasConfig {
    /// Auto-save debounce window
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(Error::invalid_config("history_limit must be at least 1"));
        }
        if self.event_capacity == 0 {
            return Err(Error::invalid_config("event_capacity must be at least 1"));
        }
        Ok(())
    }
}
