use std::sync::mpsc::SyncSender;
use std::time::Instant;

use crate::error::{ReplError, ReplResult};
use crate::span::{ReplSpan, ReplSpanKind, StoreId};
use crate::text;

use super::{ReplWindow, StandardInputRequest};

impl ReplWindow {
    /// Shows a standard input prompt and waits for the user's line.
    ///
    /// Runs on the UI thread on behalf of
    /// [`WindowHandle::read_standard_input`](crate::dispatcher::WindowHandle::read_standard_input).
    pub(crate) fn begin_standard_input(&mut self, reply: SyncSender<ReplResult<String>>) {
        if self.standard_input.is_some() {
            log::warn!("standard input requested while another request is pending");
            let _ = reply.send(Err(ReplError::StandardInputBusy));
            return;
        }
        self.perform_write(|window| {
            let was_running = window.is_running;
            // output written so far belongs before the prompt
            window.flush_output();
            if was_running {
                window.is_running = false;
            } else {
                window.remove_idle_input();
            }
            window.add_standard_input_spans();
            window.caret = window.projection.len();
            window.busy.stop();
            window.uncommitted_input = None;
            let start = window.projection.store(StoreId::StandardInput).len();
            window.standard_input = Some(StandardInputRequest {
                start,
                was_running,
                reply,
            });
            log::debug!("awaiting standard input (was running: {was_running})");
            window.process_pending_input();
        });
    }

    /// Removes the idle prompt and whatever input follows it.
    fn remove_idle_input(&mut self) {
        let count = self.projection.span_count();
        let Some(prompt) = self
            .projection
            .spans()
            .iter()
            .rposition(|span| span.kind() == ReplSpanKind::Prompt)
        else {
            return;
        };
        for index in prompt + 1..count {
            if self.projection.spans()[index].kind() == ReplSpanKind::SecondaryPrompt {
                self.recycle_prompt(index);
            }
        }
        self.projection.remove_range(prompt, count - prompt);
    }

    /// Commits the standard input line if the caret is inside it.
    pub(crate) fn try_commit_standard_input(&mut self) -> bool {
        if self.caret_in_standard_input_region() {
            self.commit_standard_input();
            true
        } else {
            false
        }
    }

    /// Sends the typed line to the waiting worker, records it in history and
    /// restores the state that was active before the request.
    pub(crate) fn commit_standard_input(&mut self) {
        let Some(request) = self.standard_input.take() else {
            return;
        };
        let newline = self.newline.clone();
        self.projection
            .append_to_store(StoreId::StandardInput, &newline);
        let store = self.projection.store(StoreId::StandardInput);
        let value = text::trim_trailing_newlines(store.slice(request.start..store.len()), &newline)
            .to_string();
        if !value.trim().is_empty() {
            self.history.add(&value);
        }
        log::debug!("standard input committed");
        self.finish_standard_input(request, Ok(value));
    }

    /// Answers the waiting worker with a cancellation.
    pub(crate) fn cancel_standard_input(&mut self) {
        if let Some(request) = self.standard_input.take() {
            log::debug!("standard input cancelled");
            if self.projection.store(StoreId::StandardInput).len() > request.start {
                let newline = self.newline.clone();
                self.perform_write(|window| {
                    window
                        .projection
                        .append_to_store(StoreId::StandardInput, &newline)
                });
            }
            self.finish_standard_input(request, Err(ReplError::StandardInputCancelled));
        }
    }

    fn finish_standard_input(&mut self, request: StandardInputRequest, answer: ReplResult<String>) {
        self.perform_write(|window| {
            if let Some(last) = window.projection.last_span() {
                if last.kind() == ReplSpanKind::StandardInput {
                    let closed = ReplSpan::new(last.span().to_closed(), ReplSpanKind::StandardInput);
                    let index = window.projection.span_count() - 1;
                    window.projection.replace_at(index, closed);
                }
            }
            if request.was_running {
                window.is_running = true;
                window.busy.start(Instant::now());
                window.caret = window.projection.len();
            } else {
                window.prepare_for_input();
            }
        });
        if request.reply.send(answer).is_err() {
            log::debug!("standard input reader went away before the answer");
        }
    }
}
