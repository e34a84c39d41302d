//! REPL meta-commands and their dispatch.

use std::fmt;
use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

use crate::evaluator::ExecutionResult;
use crate::window::ReplWindow;

/// A command run by typing the command prefix followed by its name.
pub trait ReplCommand {
    /// Name used to invoke the command.
    fn command(&self) -> &str;

    /// One-line description shown by help.
    fn description(&self) -> &str;

    fn execute(&self, window: &mut ReplWindow, arguments: &str) -> ExecutionResult;
}

/// How a command line should be handled.
pub enum CommandDispatch {
    Help,
    /// A comment line: the prefix repeated. Does nothing.
    Comment,
    Execute {
        command: Rc<dyn ReplCommand>,
        arguments: String,
    },
    Unknown {
        name: String,
    },
}

impl fmt::Debug for CommandDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandDispatch::Help => f.write_str("Help"),
            CommandDispatch::Comment => f.write_str("Comment"),
            CommandDispatch::Execute { command, arguments } => f
                .debug_struct("Execute")
                .field("command", &command.command())
                .field("arguments", arguments)
                .finish(),
            CommandDispatch::Unknown { name } => {
                f.debug_struct("Unknown").field("name", name).finish()
            }
        }
    }
}

const HELP_NAME: &str = "help";
const HELP_DESCRIPTION: &str = "Show a list of REPL commands";
const HELP_NAME_WIDTH: usize = 16;

/// Registered commands, looked up by exact name.
///
/// # Examples
///
/// ```
/// use replwindow_core::commands::{CommandDispatch, CommandRouter};
///
/// let router = CommandRouter::new();
/// assert!(matches!(router.route("help", "%"), CommandDispatch::Help));
/// assert!(matches!(router.route("% a note", "%"), CommandDispatch::Comment));
/// assert!(matches!(router.route("nope", "%"), CommandDispatch::Unknown { .. }));
/// ```
#[derive(Clone, Default)]
pub struct CommandRouter {
    commands: Vec<Rc<dyn ReplCommand>>,
}

impl fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|command| command.command()))
            .finish()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command. A command whose name is already taken is ignored
    /// and `false` returned.
    pub fn register(&mut self, command: Rc<dyn ReplCommand>) -> bool {
        if self.get(command.command()).is_some() {
            log::warn!("duplicate REPL command '{}' ignored", command.command());
            return false;
        }
        self.commands.push(command);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Rc<dyn ReplCommand>> {
        self.commands.iter().find(|command| command.command() == name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<dyn ReplCommand>> {
        self.commands.iter()
    }

    /// Decides what to do with `line`, the text following the command prefix.
    pub fn route(&self, line: &str, prefix: &str) -> CommandDispatch {
        let line = line.trim();
        if line.is_empty() || line == HELP_NAME {
            return CommandDispatch::Help;
        }
        if !prefix.is_empty() && line.starts_with(prefix) {
            return CommandDispatch::Comment;
        }
        let (name, arguments) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim_start()),
            None => (line, ""),
        };
        match self.get(name) {
            Some(command) => CommandDispatch::Execute {
                command: Rc::clone(command),
                arguments: arguments.to_string(),
            },
            None => CommandDispatch::Unknown {
                name: name.to_string(),
            },
        }
    }

    /// Help listing, one line per command, sorted by name after `help` itself.
    pub fn help_lines(&self) -> Vec<String> {
        let mut commands: Vec<_> = self
            .commands
            .iter()
            .map(|command| (command.command(), command.description()))
            .collect();
        commands.sort_by(|a, b| a.0.cmp(b.0));
        std::iter::once((HELP_NAME, HELP_DESCRIPTION))
            .chain(commands)
            .map(|(name, description)| {
                let padding = HELP_NAME_WIDTH.saturating_sub(name.width());
                format!("  {name}{}  {description}", " ".repeat(padding))
            })
            .collect()
    }

    pub fn unknown_message(name: &str, prefix: &str) -> String {
        format!("Unknown command '{name}', use \"{prefix}help\" for help")
    }
}
