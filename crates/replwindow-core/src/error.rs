//! Error types for window operations.

use thiserror::Error;

use crate::options::ReplOption;

/// Errors raised by [`ReplWindow`](crate::window::ReplWindow) and its handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplError {
    /// A user edit touched protected text.
    #[error("position {position} is read-only")]
    ReadOnly { position: usize },

    /// A blocking call was made from the UI thread, which would deadlock.
    #[error("blocking call made on the UI thread")]
    BlockingCallOnUiThread,

    /// The window was dropped before answering.
    #[error("the REPL window has been closed")]
    WindowClosed,

    /// A standard input request was cancelled before the user answered it.
    #[error("standard input request was cancelled")]
    StandardInputCancelled,

    /// Another standard input request is already waiting for the user.
    #[error("a standard input request is already pending")]
    StandardInputBusy,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The span structure failed validation.
    #[error("invalid window state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Option(#[from] OptionError),
}

/// Errors raised when setting an option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Got wrong type ({found}) for option {option}")]
    WrongType {
        option: ReplOption,
        found: &'static str,
    },

    #[error("{option} cannot be null")]
    NullPrompt { option: ReplOption },

    #[error("{option} cannot contain control characters (except tab)")]
    ControlCharacters { option: ReplOption },
}

pub type ReplResult<T> = Result<T, ReplError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ReplError::ReadOnly { position: 3 }.to_string(),
            "position 3 is read-only"
        );
        let error = OptionError::WrongType {
            option: ReplOption::ShowOutput,
            found: "string",
        };
        assert_eq!(error.to_string(), "Got wrong type (string) for option ShowOutput");
        assert_eq!(
            ReplError::from(OptionError::NullPrompt {
                option: ReplOption::PrimaryPrompt
            })
            .to_string(),
            "PrimaryPrompt cannot be null"
        );
    }
}
