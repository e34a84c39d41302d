//! Marshalling work onto the window's UI thread.
//!
//! The window owns the receiving end of a channel of tasks. Any thread holding
//! a [`WindowHandle`] can post a task; the UI thread runs them in order from
//! [`ReplWindow::pump`](crate::window::ReplWindow::pump).

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, ThreadId};

use crate::error::{ReplError, ReplResult};
use crate::evaluator::ExecutionResult;
use crate::options::{OptionValue, ReplOption};
use crate::window::ReplWindow;

/// A unit of work run on the UI thread.
pub type UiTask = Box<dyn FnOnce(&mut ReplWindow) + Send>;

pub(crate) fn channel() -> (WindowHandle, Receiver<UiTask>) {
    let (sender, receiver) = mpsc::channel();
    let handle = WindowHandle {
        sender,
        ui_thread: thread::current().id(),
    };
    (handle, receiver)
}

/// Thread-safe handle to a window.
///
/// Calls that return nothing are posted and run on the next pump. Calls that
/// return a value block until the UI thread has answered them and refuse to
/// run on the UI thread itself.
#[derive(Clone)]
pub struct WindowHandle {
    sender: Sender<UiTask>,
    ui_thread: ThreadId,
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle")
            .field("ui_thread", &self.ui_thread)
            .finish()
    }
}

impl WindowHandle {
    /// Whether the calling thread is the window's UI thread.
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Queues a task for the UI thread.
    pub fn post<F>(&self, task: F) -> ReplResult<()>
    where
        F: FnOnce(&mut ReplWindow) + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| ReplError::WindowClosed)
    }

    /// Runs a task on the UI thread and waits for its result.
    pub fn invoke<R, F>(&self, task: F) -> ReplResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut ReplWindow) -> R + Send + 'static,
    {
        if self.is_ui_thread() {
            log::error!("blocking window call made on the UI thread");
            return Err(ReplError::BlockingCallOnUiThread);
        }
        let (reply, result) = mpsc::sync_channel(1);
        self.post(move |window| {
            let _ = reply.send(task(window));
        })?;
        result.recv().map_err(|_| ReplError::WindowClosed)
    }

    pub fn write_output(&self, text: impl Into<String>) -> ReplResult<()> {
        let text = text.into();
        self.post(move |window| window.write_output(&text))
    }

    pub fn write_error(&self, text: impl Into<String>) -> ReplResult<()> {
        let text = text.into();
        self.post(move |window| window.write_error(&text))
    }

    pub fn write_line(&self, text: impl Into<String>) -> ReplResult<()> {
        let text = text.into();
        self.post(move |window| window.write_line(&text))
    }

    /// Asks the user for one line of standard input and blocks until it is
    /// entered.
    pub fn read_standard_input(&self) -> ReplResult<String> {
        if self.is_ui_thread() {
            log::error!("standard input requested on the UI thread");
            return Err(ReplError::BlockingCallOnUiThread);
        }
        let (reply, answer) = mpsc::sync_channel(1);
        self.post(move |window| window.begin_standard_input(reply))?;
        answer.recv().map_err(|_| ReplError::WindowClosed)?
    }

    pub fn set_option_value(
        &self,
        option: ReplOption,
        value: impl Into<OptionValue>,
    ) -> ReplResult<()> {
        let value = value.into();
        self.invoke(move |window| window.set_option_value(option, value))?
            .map_err(ReplError::from)
    }

    pub fn option_value(&self, option: ReplOption) -> ReplResult<OptionValue> {
        self.invoke(move |window| window.option_value(option))
    }

    pub fn paste_text(&self, text: impl Into<String>) -> ReplResult<()> {
        let text = text.into();
        self.post(move |window| {
            if let Err(err) = window.paste_text(&text) {
                log::debug!("posted paste rejected: {err}");
            }
        })
    }

    pub fn abort_command(&self) -> ReplResult<()> {
        self.post(ReplWindow::abort_command)
    }

    pub fn cancel(&self) -> ReplResult<()> {
        self.post(ReplWindow::cancel)
    }

    pub fn clear_screen(&self) -> ReplResult<()> {
        self.post(ReplWindow::clear_screen)
    }

    pub fn reset(&self) -> ReplResult<()> {
        self.post(|window| {
            window.reset();
        })
    }

    pub(crate) fn post_completion(&self, turn: u64, result: ExecutionResult) {
        if self
            .post(move |window| window.finish_execute(turn, result))
            .is_err()
        {
            log::debug!("completion for execution {turn} arrived after the window closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_knows_ui_thread() {
        let (handle, _inbox) = channel();
        assert!(handle.is_ui_thread());
        let remote = handle.clone();
        let on_ui = thread::spawn(move || remote.is_ui_thread()).join().unwrap();
        assert!(!on_ui);
    }

    #[test]
    fn test_blocking_calls_refused_on_ui_thread() {
        let (handle, _inbox) = channel();
        assert_eq!(
            handle.read_standard_input(),
            Err(ReplError::BlockingCallOnUiThread)
        );
        assert_eq!(
            handle.invoke(|_| ()),
            Err(ReplError::BlockingCallOnUiThread)
        );
    }

    #[test]
    fn test_post_after_close_fails() {
        let (handle, inbox) = channel();
        drop(inbox);
        assert_eq!(handle.write_line("x"), Err(ReplError::WindowClosed));
    }
}
