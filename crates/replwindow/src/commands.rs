//! Built-in REPL commands.
//!
//! `help` is answered by the command router itself; the commands here are
//! registered by [`ReplWindowBuilder`](crate::ReplWindowBuilder) unless it is
//! told otherwise.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use replwindow_core::{ExecutionResult, ReplCommand, ReplOption, ReplWindow};

/// The built-in commands, sorted by name.
pub fn default_commands() -> Vec<Rc<dyn ReplCommand>> {
    vec![
        Rc::new(ClearScreenCommand),
        Rc::new(EchoCommand),
        Rc::new(LoadCommand),
        Rc::new(ResetCommand),
    ]
}

/// `cls`: clears the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearScreenCommand;

impl ReplCommand for ClearScreenCommand {
    fn command(&self) -> &str {
        "cls"
    }

    fn description(&self) -> &str {
        "Clears the contents of the REPL editor window"
    }

    fn execute(&self, window: &mut ReplWindow, _arguments: &str) -> ExecutionResult {
        window.clear_screen();
        ExecutionResult::SUCCESS
    }
}

/// `echo [on|off]`: shows or changes whether evaluator output is displayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCommand;

impl ReplCommand for EchoCommand {
    fn command(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Suppress or unsuppress output to the buffer"
    }

    fn execute(&self, window: &mut ReplWindow, arguments: &str) -> ExecutionResult {
        let show = match arguments.trim().to_ascii_lowercase().as_str() {
            "" => {
                let state = if window.options().show_output { "on" } else { "off" };
                window.write_line(&format!("ECHO is {state}"));
                return ExecutionResult::SUCCESS;
            }
            "on" => true,
            "off" => false,
            other => {
                window.write_line(&format!("Unknown echo argument '{other}', expected on or off"));
                return ExecutionResult::FAILURE;
            }
        };
        match window.set_option_value(ReplOption::ShowOutput, show) {
            Ok(()) => ExecutionResult::SUCCESS,
            Err(err) => {
                log::error!("echo failed: {err}");
                ExecutionResult::FAILURE
            }
        }
    }
}

/// `load <file>`: submits a file's lines as if they were typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadCommand;

impl ReplCommand for LoadCommand {
    fn command(&self) -> &str {
        "load"
    }

    fn description(&self) -> &str {
        "Loads commands from file and executes until complete"
    }

    fn execute(&self, window: &mut ReplWindow, arguments: &str) -> ExecutionResult {
        let path = arguments.trim().trim_matches('"');
        if path.is_empty() {
            window.write_line("Usage: load <file>");
            return ExecutionResult::FAILURE;
        }
        let mut contents = match fs::read_to_string(Path::new(path)) {
            Ok(contents) => contents,
            Err(err) => {
                log::warn!("cannot load '{path}': {err}");
                window.write_error(&format!("Cannot load '{path}': {err}\n"));
                return ExecutionResult::FAILURE;
            }
        };
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        log::debug!("loading {} lines from '{path}'", contents.lines().count());
        match window.paste_text(&contents) {
            Ok(()) => ExecutionResult::SUCCESS,
            Err(err) => {
                window.write_error(&format!("Cannot load '{path}': {err}\n"));
                ExecutionResult::FAILURE
            }
        }
    }
}

/// `reset`: resets the evaluator, keeping history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetCommand;

impl ReplCommand for ResetCommand {
    fn command(&self) -> &str {
        "reset"
    }

    fn description(&self) -> &str {
        "Reset to an empty execution engine, but keep REPL history"
    }

    fn execute(&self, window: &mut ReplWindow, _arguments: &str) -> ExecutionResult {
        window.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_names_are_sorted_and_unique() {
        let names: Vec<_> = default_commands()
            .iter()
            .map(|command| command.command().to_string())
            .collect();
        assert_eq!(names, vec!["cls", "echo", "load", "reset"]);
    }

    #[test]
    fn test_default_commands_have_descriptions() {
        for command in default_commands() {
            assert!(!command.description().is_empty(), "{}", command.command());
        }
    }
}
