//! Builder for configured REPL windows.

use std::rc::Rc;
use std::time::Duration;

use replwindow_core::{
    EditorCommand, KeyBinding, ReplCommand, ReplConfig, ReplEvaluator, ReplKey, ReplOptions,
    ReplResult, ReplWindow,
};

use crate::commands::default_commands;

/// Builder for creating [`ReplWindow`] instances.
///
/// The built window has the built-in commands registered (unless disabled)
/// and has not been started yet.
///
/// # Examples
///
/// ```
/// use replwindow::ReplWindowBuilder;
///
/// let builder = ReplWindowBuilder::new()
///     .with_title("Python")
///     .with_prompt(">>> ")
///     .with_secondary_prompt("... ")
///     .with_max_history(100);
/// assert_eq!(builder.config().max_history, 100);
/// ```
pub struct ReplWindowBuilder {
    title: String,
    config: ReplConfig,
    commands: Vec<Rc<dyn ReplCommand>>,
    default_commands: bool,
}

impl Default for ReplWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplWindowBuilder {
    pub fn new() -> Self {
        Self {
            title: "REPL".to_string(),
            config: ReplConfig::default(),
            commands: Vec::new(),
            default_commands: true,
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// Starts from a complete configuration.
    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_options(mut self, options: ReplOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.config.options.primary_prompt = prompt.into();
        self
    }

    pub fn with_secondary_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.config.options.secondary_prompt = prompt.into();
        self
    }

    pub fn with_standard_input_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.config.options.standard_input_prompt = prompt.into();
        self
    }

    pub fn with_command_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.options.command_prefix = prefix.into();
        self
    }

    /// Line break used by the window, `"\n"` or `"\r\n"`.
    pub fn with_newline<S: Into<String>>(mut self, newline: S) -> Self {
        self.config.newline = newline.into();
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.config.max_history = max_history;
        self
    }

    pub fn with_busy_delay(mut self, delay: Duration) -> Self {
        self.config.busy_delay = delay;
        self
    }

    pub fn with_key_binding(mut self, key: ReplKey, command: EditorCommand) -> Self {
        self.config.key_bindings.push(KeyBinding { key, command });
        self
    }

    /// Registers an additional command. Commands named like a built-in one
    /// replace it.
    pub fn with_command(mut self, command: Rc<dyn ReplCommand>) -> Self {
        self.commands.push(command);
        self
    }

    /// Leaves out `cls`, `echo`, `load` and `reset`.
    pub fn without_default_commands(mut self) -> Self {
        self.default_commands = false;
        self
    }

    pub fn config(&self) -> &ReplConfig {
        &self.config
    }

    /// Validates the configuration and creates the window.
    pub fn build<E>(self, evaluator: E) -> ReplResult<ReplWindow>
    where
        E: ReplEvaluator + 'static,
    {
        let mut window = ReplWindow::new(self.title, Box::new(evaluator), self.config)?;
        let custom: Vec<_> = self
            .commands
            .iter()
            .map(|command| command.command().to_string())
            .collect();
        if self.default_commands {
            for command in default_commands() {
                if !custom.iter().any(|name| name == command.command()) {
                    window.register_command(command);
                }
            }
        }
        for command in self.commands {
            window.register_command(command);
        }
        log::debug!(
            "built REPL window '{}' with {} commands",
            window.title(),
            window.commands().len()
        );
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replwindow_core::{ExecutionCompletion, ExecutionResult, ReplError, WindowHandle};

    struct Idle;

    impl ReplEvaluator for Idle {
        fn initialize(&mut self, _window: WindowHandle) -> ExecutionResult {
            ExecutionResult::SUCCESS
        }

        fn can_execute_text(&self, _text: &str) -> bool {
            true
        }

        fn execute_text(&mut self, _text: &str, completion: ExecutionCompletion) -> bool {
            completion.complete(ExecutionResult::SUCCESS);
            true
        }

        fn reset(&mut self) -> ExecutionResult {
            ExecutionResult::SUCCESS
        }

        fn abort_command(&mut self) {}
    }

    #[test]
    fn test_build_registers_default_commands() {
        let window = ReplWindowBuilder::new().build(Idle).unwrap();
        let mut names: Vec<_> = window.commands().iter().map(|c| c.command().to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["cls", "echo", "load", "reset"]);
        assert_eq!(window.title(), "REPL");
    }

    #[test]
    fn test_build_without_default_commands() {
        let window = ReplWindowBuilder::new()
            .without_default_commands()
            .build(Idle)
            .unwrap();
        assert!(window.commands().is_empty());
    }

    #[test]
    fn test_build_applies_options() {
        let mut window = ReplWindowBuilder::new()
            .with_prompt("$ ")
            .with_command_prefix("#")
            .build(Idle)
            .unwrap();
        window.start();
        assert_eq!(window.text(), "$ ");
        assert_eq!(window.options().command_prefix, "#");
    }

    #[test]
    fn test_build_rejects_invalid_configuration() {
        let result = ReplWindowBuilder::new().with_max_history(0).build(Idle);
        assert!(matches!(result, Err(ReplError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_duplicate_key_binding_is_rejected() {
        let result = ReplWindowBuilder::new()
            .with_key_binding(ReplKey::Escape, EditorCommand::Abort)
            .with_key_binding(ReplKey::Escape, EditorCommand::Cancel)
            .build(Idle);
        assert!(matches!(result, Err(ReplError::InvalidConfiguration(_))));
    }
}
