//! # Replwindow: Interactive REPL Window
//!
//! Replwindow models the window of an interactive interpreter: prompts, the
//! code typed for each submission, standard input answered for a running
//! program and that program's output are composed into one editable
//! document, of which only the active input can be changed. Submissions are
//! handed to a pluggable [`ReplEvaluator`] and the window returns to
//! accepting input when the evaluator reports completion.
//!
//! ## Quick Start
//!
//! ```rust
//! use replwindow::prelude::*;
//!
//! struct Echo(Option<WindowHandle>);
//!
//! impl ReplEvaluator for Echo {
//!     fn initialize(&mut self, window: WindowHandle) -> ExecutionResult {
//!         self.0 = Some(window);
//!         ExecutionResult::SUCCESS
//!     }
//!     fn can_execute_text(&self, _text: &str) -> bool {
//!         true
//!     }
//!     fn execute_text(&mut self, text: &str, completion: ExecutionCompletion) -> bool {
//!         if let Some(window) = &self.0 {
//!             let _ = window.write_output(text.to_string());
//!         }
//!         completion.complete(ExecutionResult::SUCCESS);
//!         true
//!     }
//!     fn reset(&mut self) -> ExecutionResult {
//!         ExecutionResult::SUCCESS
//!     }
//!     fn abort_command(&mut self) {}
//! }
//!
//! let mut window = ReplWindowBuilder::new()
//!     .with_prompt(">>> ")
//!     .build(Echo(None))
//!     .unwrap();
//! window.start();
//! window.type_text("hello").unwrap();
//! window.return_key().unwrap();
//! window.pump();
//! assert_eq!(window.text(), ">>> hello\nhello\n>>> ");
//! ```
//!
//! ## Architecture
//!
//! - **Window model** (`replwindow-core`): span bookkeeping, protection,
//!   history, options and the execution state machine
//! - **Host API** (`replwindow`): builder, built-in commands and the window
//!   registry - this crate

// Re-export the window model from replwindow-core
pub use replwindow_core::{
    // Window and state
    ReplState, ReplWindow, WindowHandle,
    // Evaluator contract
    ExecutionCompletion, ExecutionResult, ReplEvaluator,
    // Commands
    CommandDispatch, CommandRouter, ReplCommand,
    // Keys
    CommandFilter, EditorCommand, KeyBinding, KeyResult, ReplKey,
    // Configuration and options
    format_prompt, OptionValue, ReplConfig, ReplOption, ReplOptions,
    // History and output
    ConsoleColor, History, HistoryEntry, OutputKind,
    // Document model
    PositionAffinity, PointTracking, Projection, ProtectionPolicy, ProtectionState, ReplSpan,
    ReplSpanKind, StoreId, TrackingSpan,
    // Error handling
    OptionError, ReplError, ReplResult,
};

pub mod builder;
pub mod commands;
pub mod prelude;
pub mod registry;

pub use builder::ReplWindowBuilder;
pub use commands::{
    default_commands, ClearScreenCommand, EchoCommand, LoadCommand, ResetCommand,
};
pub use registry::{WindowCreationListener, WindowId, WindowRegistry};
