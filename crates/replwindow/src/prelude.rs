//! Convenient re-exports for common use cases
//!
//! # Usage
//!
//! ```rust
//! use replwindow::prelude::*;
//!
//! let builder = ReplWindowBuilder::new().with_prompt("$ ");
//! assert_eq!(builder.config().options.primary_prompt, "$ ");
//! ```

// Window and its evaluator contract
pub use replwindow_core::{
    ExecutionCompletion, ExecutionResult, ReplEvaluator, ReplState, ReplWindow, WindowHandle,
};

// Commands and keys
pub use replwindow_core::{EditorCommand, KeyResult, ReplCommand, ReplKey};

// Options and configuration
pub use replwindow_core::{OptionValue, ReplConfig, ReplOption, ReplOptions};

// Error handling
pub use replwindow_core::{OptionError, ReplError, ReplResult};

// Host API from this crate
pub use crate::builder::ReplWindowBuilder;
pub use crate::registry::{WindowCreationListener, WindowId, WindowRegistry};
