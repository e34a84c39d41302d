//! The contract between the window and the engine that runs submitted code.

use crate::dispatcher::WindowHandle;

/// Outcome of an execution, a reset or a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
}

impl ExecutionResult {
    pub const SUCCESS: ExecutionResult = ExecutionResult { success: true };
    pub const FAILURE: ExecutionResult = ExecutionResult { success: false };

    pub fn new(success: bool) -> Self {
        Self { success }
    }
}

impl From<bool> for ExecutionResult {
    fn from(success: bool) -> Self {
        Self::new(success)
    }
}

/// Engine that evaluates submitted text.
///
/// All methods are called on the UI thread. Execution may finish later on
/// any thread: the evaluator keeps the [`ExecutionCompletion`] it is given and
/// calls [`complete`](ExecutionCompletion::complete) when done. Output and
/// standard input requests go through the [`WindowHandle`] received in
/// [`initialize`](ReplEvaluator::initialize).
pub trait ReplEvaluator {
    /// Called once when the window starts.
    fn initialize(&mut self, window: WindowHandle) -> ExecutionResult;

    /// Whether `text` is a complete submission. Returning `false` makes Enter
    /// insert a continuation line instead of submitting.
    fn can_execute_text(&self, text: &str) -> bool;

    /// Starts executing `text`. Returns `false` when execution could not start,
    /// in which case the window finishes the submission as failed itself.
    fn execute_text(&mut self, text: &str, completion: ExecutionCompletion) -> bool;

    /// Discards engine state.
    fn reset(&mut self) -> ExecutionResult;

    /// Interrupts the running execution, if any.
    fn abort_command(&mut self);

    /// Text to paste in place of the host clipboard contents, if the evaluator
    /// wants to reformat it.
    fn format_clipboard_contents(&self, _contents: &str) -> Option<String> {
        None
    }
}

/// Signals the end of one submission.
///
/// Dropping it without calling [`complete`](Self::complete) finishes the
/// submission as failed.
#[derive(Debug)]
pub struct ExecutionCompletion {
    turn: u64,
    handle: WindowHandle,
    fired: bool,
}

impl ExecutionCompletion {
    pub(crate) fn new(turn: u64, handle: WindowHandle) -> Self {
        Self {
            turn,
            handle,
            fired: false,
        }
    }

    /// Identifier of the submission this completion belongs to.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn complete(mut self, result: ExecutionResult) {
        self.fired = true;
        self.handle.post_completion(self.turn, result);
    }
}

impl Drop for ExecutionCompletion {
    fn drop(&mut self) {
        if !self.fired {
            log::warn!("execution {} dropped without completing", self.turn);
            self.handle
                .post_completion(self.turn, ExecutionResult::FAILURE);
        }
    }
}
