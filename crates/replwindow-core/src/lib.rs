//! REPL Window Core Library
//!
//! This crate implements an interactive REPL window as a single editable
//! document composed from several independent text stores: prompts, the
//! language input of each submission, standard input typed for a running
//! program, and program output. It provides the span bookkeeping that keeps
//! those stores in order, the read-only protection that leaves only the active
//! input editable, and the submit/execute/complete state machine that drives
//! a pluggable [`ReplEvaluator`].
//!
//! The window is owned by one UI thread. Evaluators and their worker threads
//! reach it through a [`WindowHandle`].

pub mod busy;
pub mod command_filter;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod options;
pub mod output;
pub mod projection;
pub mod protection;
pub mod span;
pub mod store;
pub mod text;
pub mod window;

// Re-export commonly used types for convenience
pub use command_filter::{CommandFilter, EditorCommand, KeyBinding, KeyResult, ReplKey};
pub use commands::{CommandDispatch, CommandRouter, ReplCommand};
pub use config::ReplConfig;
pub use dispatcher::WindowHandle;
pub use error::{OptionError, ReplError, ReplResult};
pub use evaluator::{ExecutionCompletion, ExecutionResult, ReplEvaluator};
pub use history::{History, HistoryEntry};
pub use options::{format_prompt, OptionValue, ReplOption, ReplOptions};
pub use output::{ConsoleColor, OutputKind};
pub use projection::{PositionAffinity, Projection};
pub use protection::{ProtectionPolicy, ProtectionState};
pub use span::{PointTracking, ReplSpan, ReplSpanKind, StoreId, TrackingSpan};
pub use window::{ReplState, ReplWindow};
