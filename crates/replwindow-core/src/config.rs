//! Construction-time configuration for a REPL window.

use std::collections::HashSet;
use std::time::Duration;

use crate::command_filter::KeyBinding;
use crate::error::{ReplError, ReplResult};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::options::{is_valid_prompt, ReplOptions};

/// Largest history limit accepted by [`ReplConfig::validate`].
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Configuration for a [`ReplWindow`](crate::window::ReplWindow).
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Line break inserted by the window. Either `"\n"` or `"\r\n"`.
    pub newline: String,
    /// Maximum number of history entries to keep.
    pub max_history: usize,
    /// How long execution must run before the busy indicator shows.
    pub busy_delay: Duration,
    /// Key bindings that override the defaults of the command filter.
    pub key_bindings: Vec<KeyBinding>,
    /// Initial option values.
    pub options: ReplOptions,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            newline: "\n".to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            busy_delay: Duration::from_millis(250),
            key_bindings: Vec::new(),
            options: ReplOptions::default(),
        }
    }
}

impl ReplConfig {
    pub fn validate(&self) -> ReplResult<()> {
        if self.newline != "\n" && self.newline != "\r\n" {
            return Err(ReplError::InvalidConfiguration(format!(
                "Newline must be \\n or \\r\\n, got {:?}",
                self.newline
            )));
        }

        if self.max_history == 0 || self.max_history > MAX_HISTORY_LIMIT {
            return Err(ReplError::InvalidConfiguration(format!(
                "History size must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }

        if self.options.command_prefix.trim().is_empty() {
            return Err(ReplError::InvalidConfiguration(
                "Command prefix cannot be empty".to_string(),
            ));
        }

        let prompts = [
            &self.options.primary_prompt,
            &self.options.secondary_prompt,
            &self.options.standard_input_prompt,
        ];
        if !prompts.iter().all(|prompt| is_valid_prompt(prompt)) {
            return Err(ReplError::InvalidConfiguration(
                "Prompts cannot contain control characters (except tab)".to_string(),
            ));
        }

        let mut seen_keys = HashSet::new();
        for binding in &self.key_bindings {
            if !seen_keys.insert(binding.key) {
                return Err(ReplError::InvalidConfiguration(format!(
                    "Duplicate key binding for key: {:?}",
                    binding.key
                )));
            }
        }

        Ok(())
    }
}
