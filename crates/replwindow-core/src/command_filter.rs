//! Key handling for the REPL window.
//!
//! Keys are translated to [`EditorCommand`]s through a table of default
//! bindings that custom bindings override. Printable characters with no
//! binding are typed into the window.

use std::collections::HashMap;

use crate::error::{ReplError, ReplResult};
use crate::window::ReplWindow;

/// A key press as seen by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplKey {
    Enter,
    ControlEnter,
    ShiftEnter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    AltUp,
    AltDown,
    ControlAltUp,
    ControlAltDown,
    Home,
    End,
    ControlBreak,
    ControlL,
    ControlV,
    Char(char),
}

/// An editing action the window knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Return,
    SmartExecute,
    BreakLine,
    Cancel,
    Backspace,
    Delete,
    SmartUp,
    SmartDown,
    HistoryPrevious,
    HistoryNext,
    SearchHistoryPrevious,
    SearchHistoryNext,
    Home,
    End,
    Abort,
    Reset,
    ClearScreen,
    PasteClipboard,
}

/// Associates a key with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: ReplKey,
    pub command: EditorCommand,
}

/// Result of processing a key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// The key was handled.
    Handled,
    /// The key was bound but its edit hit protected text.
    Rejected(ReplError),
    /// Nothing is bound to the key.
    Ignored,
}

/// Maps keys to editor commands.
#[derive(Debug, Clone)]
pub struct CommandFilter {
    custom_bindings: HashMap<ReplKey, EditorCommand>,
    default_bindings: HashMap<ReplKey, EditorCommand>,
}

impl Default for CommandFilter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CommandFilter {
    /// Creates a filter with `custom_bindings` layered over the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use replwindow_core::command_filter::{CommandFilter, EditorCommand, KeyBinding, ReplKey};
    ///
    /// let filter = CommandFilter::new(vec![KeyBinding {
    ///     key: ReplKey::Up,
    ///     command: EditorCommand::HistoryPrevious,
    /// }]);
    /// assert_eq!(filter.command_for(ReplKey::Up), Some(EditorCommand::HistoryPrevious));
    /// assert_eq!(filter.command_for(ReplKey::Enter), Some(EditorCommand::Return));
    /// ```
    pub fn new(custom_bindings: Vec<KeyBinding>) -> Self {
        let custom_bindings = custom_bindings
            .into_iter()
            .map(|binding| (binding.key, binding.command))
            .collect();
        Self {
            custom_bindings,
            default_bindings: Self::create_default_bindings(),
        }
    }

    fn create_default_bindings() -> HashMap<ReplKey, EditorCommand> {
        use EditorCommand::*;
        HashMap::from([
            (ReplKey::Enter, Return),
            (ReplKey::ControlEnter, SmartExecute),
            (ReplKey::ShiftEnter, BreakLine),
            (ReplKey::Escape, Cancel),
            (ReplKey::Backspace, Backspace),
            (ReplKey::Delete, Delete),
            (ReplKey::Up, SmartUp),
            (ReplKey::Down, SmartDown),
            (ReplKey::AltUp, HistoryPrevious),
            (ReplKey::AltDown, HistoryNext),
            (ReplKey::ControlAltUp, SearchHistoryPrevious),
            (ReplKey::ControlAltDown, SearchHistoryNext),
            (ReplKey::Home, Home),
            (ReplKey::End, End),
            (ReplKey::ControlBreak, Abort),
            (ReplKey::ControlL, ClearScreen),
            (ReplKey::ControlV, PasteClipboard),
        ])
    }

    /// The command bound to `key`, custom bindings first.
    pub fn command_for(&self, key: ReplKey) -> Option<EditorCommand> {
        self.custom_bindings
            .get(&key)
            .or_else(|| self.default_bindings.get(&key))
            .copied()
    }

    pub fn register_binding(&mut self, key: ReplKey, command: EditorCommand) {
        self.custom_bindings.insert(key, command);
    }

    /// Removes a custom binding. Returns `true` if one existed.
    pub fn remove_binding(&mut self, key: ReplKey) -> bool {
        self.custom_bindings.remove(&key).is_some()
    }
}

impl ReplWindow {
    /// Handles a key press through the window's key bindings.
    pub fn process_key(&mut self, key: ReplKey) -> KeyResult {
        let outcome = match (self.key_filter().command_for(key), key) {
            (Some(command), _) => self.execute_editor_command(command),
            (None, ReplKey::Char(c)) if !c.is_control() => self.type_text(c.encode_utf8(&mut [0; 4])),
            (None, _) => return KeyResult::Ignored,
        };
        match outcome {
            Ok(()) => KeyResult::Handled,
            Err(err) => {
                log::debug!("{key:?} rejected: {err}");
                KeyResult::Rejected(err)
            }
        }
    }

    pub fn execute_editor_command(&mut self, command: EditorCommand) -> ReplResult<()> {
        match command {
            EditorCommand::Return => self.return_key()?,
            EditorCommand::SmartExecute => self.smart_execute(),
            EditorCommand::BreakLine => self.break_line(),
            EditorCommand::Cancel => self.cancel(),
            EditorCommand::Backspace => self.backspace()?,
            EditorCommand::Delete => self.delete_forward()?,
            EditorCommand::SmartUp => self.smart_up_arrow(),
            EditorCommand::SmartDown => self.smart_down_arrow(),
            EditorCommand::HistoryPrevious => self.history_previous(),
            EditorCommand::HistoryNext => self.history_next(),
            EditorCommand::SearchHistoryPrevious => self.search_history_previous(),
            EditorCommand::SearchHistoryNext => self.search_history_next(),
            EditorCommand::Home => self.home(),
            EditorCommand::End => self.move_to_end(),
            EditorCommand::Abort => self.abort_command(),
            EditorCommand::Reset => {
                self.reset();
            }
            EditorCommand::ClearScreen => self.clear_screen(),
            EditorCommand::PasteClipboard => self.paste_clipboard()?,
        }
        Ok(())
    }
}
