//! The REPL window.
//!
//! [`ReplWindow`] composes prompts, typed input, standard input and output
//! into one document and runs the submit/execute/complete cycle. It is owned
//! by a single UI thread; other threads talk to it through a
//! [`WindowHandle`](crate::dispatcher::WindowHandle).
//!
//! The document is protected so that only the active input can be edited.
//! Every programmatic change to the document goes through
//! [`ReplWindow::perform_write`], which lifts protection, mutates, and puts
//! protection back relative to the new active input.

mod editing;
mod execution;
mod options;
mod output;
mod prompts;
mod stdin;

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, SyncSender};
use std::time::{Duration, Instant};

use crate::busy::BusyIndicator;
use crate::command_filter::CommandFilter;
use crate::commands::{CommandRouter, ReplCommand};
use crate::config::ReplConfig;
use crate::dispatcher::{self, UiTask, WindowHandle};
use crate::error::{ReplError, ReplResult};
use crate::evaluator::{ExecutionResult, ReplEvaluator};
use crate::history::History;
use crate::options::{OptionValue, ReplOption, ReplOptions};
use crate::output::{ConsoleColor, OutputBuffer, OutputColors};
use crate::projection::{PositionAffinity, Projection};
use crate::protection::{ProtectionManager, ProtectionPolicy, ProtectionState};
use crate::span::{ReplSpan, ReplSpanKind, StoreId, TrackingSpan};
use crate::text::{self, PendingInput};

/// What the window is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    AcceptingInput,
    Running,
    AwaitingStandardInput,
}

/// A submission in flight.
#[derive(Debug, Clone)]
struct ExecutionTurn {
    id: u64,
    code: String,
    started: Instant,
    history_entry: Option<u64>,
    is_command: bool,
}

/// A worker thread waiting for a line of standard input.
#[derive(Debug)]
struct StandardInputRequest {
    /// Offset in the standard input store where the answer starts.
    start: usize,
    was_running: bool,
    reply: SyncSender<ReplResult<String>>,
}

#[derive(Debug, Clone, Copy)]
enum CaretAnchor {
    Store(StoreId, usize),
    Document(usize),
}

pub struct ReplWindow {
    title: String,
    newline: String,
    options: ReplOptions,
    evaluator: Box<dyn ReplEvaluator>,
    commands: CommandRouter,
    key_filter: CommandFilter,
    projection: Projection,
    protection: ProtectionManager,
    history: History,
    output: OutputBuffer,
    output_colors: Vec<OutputColors>,
    pending_input: VecDeque<PendingInput>,
    recycled_prompts: Vec<TrackingSpan>,
    current_language: StoreId,
    current_input: usize,
    is_running: bool,
    turn: Option<ExecutionTurn>,
    next_turn: u64,
    standard_input: Option<StandardInputRequest>,
    uncommitted_input: Option<String>,
    caret: usize,
    clipboard: Option<String>,
    busy: BusyIndicator,
    handle: WindowHandle,
    inbox: Receiver<UiTask>,
    started: bool,
}

impl ReplWindow {
    /// Creates a window. The calling thread becomes its UI thread.
    ///
    /// The window is empty until [`start`](Self::start) is called.
    pub fn new(
        title: impl Into<String>,
        evaluator: Box<dyn ReplEvaluator>,
        config: ReplConfig,
    ) -> ReplResult<Self> {
        config.validate()?;
        let (handle, inbox) = dispatcher::channel();
        let mut projection = Projection::new();
        let current_language = projection.new_language_store();
        let mut output = OutputBuffer::new();
        output.set_process_ansi_escapes(config.options.support_ansi_colors);
        Ok(Self {
            title: title.into(),
            newline: config.newline,
            options: config.options,
            evaluator,
            commands: CommandRouter::new(),
            key_filter: CommandFilter::new(config.key_bindings),
            projection,
            protection: ProtectionManager::new(),
            history: History::with_max_length(config.max_history),
            output,
            output_colors: Vec::new(),
            pending_input: VecDeque::new(),
            recycled_prompts: Vec::new(),
            current_language,
            current_input: 1,
            is_running: false,
            turn: None,
            next_turn: 1,
            standard_input: None,
            uncommitted_input: None,
            caret: 0,
            clipboard: None,
            busy: BusyIndicator::new(config.busy_delay),
            handle,
            inbox,
            started: false,
        })
    }

    /// Initializes the evaluator and shows the first prompt.
    pub fn start(&mut self) -> ExecutionResult {
        if self.started {
            log::warn!("REPL window '{}' already started", self.title);
            return ExecutionResult::SUCCESS;
        }
        self.started = true;
        let result = self.evaluator.initialize(self.handle.clone());
        if !result.success {
            log::warn!("evaluator for '{}' failed to initialize", self.title);
        }
        self.prepare_for_input();
        self.apply_protection();
        log::info!("REPL window '{}' started", self.title);
        result
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The composed document.
    pub fn text(&self) -> &str {
        self.projection.text()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn spans(&self) -> &[ReplSpan] {
        self.projection.spans()
    }

    /// Every span's kind with its visible text, in document order.
    pub fn composed_spans(&self) -> Vec<(ReplSpanKind, &str)> {
        (0..self.projection.span_count())
            .map(|index| {
                (
                    self.projection.spans()[index].kind(),
                    self.projection.span_text(index),
                )
            })
            .collect()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn options(&self) -> &ReplOptions {
        &self.options
    }

    pub fn option_value(&self, option: ReplOption) -> OptionValue {
        self.options.get(option)
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn state(&self) -> ReplState {
        if self.standard_input.is_some() {
            ReplState::AwaitingStandardInput
        } else if self.is_running {
            ReplState::Running
        } else {
            ReplState::AcceptingInput
        }
    }

    /// A handle other threads can use to reach this window.
    pub fn handle(&self) -> WindowHandle {
        self.handle.clone()
    }

    pub fn evaluator(&self) -> &dyn ReplEvaluator {
        self.evaluator.as_ref()
    }

    pub fn evaluator_mut(&mut self) -> &mut dyn ReplEvaluator {
        self.evaluator.as_mut()
    }

    pub fn commands(&self) -> &CommandRouter {
        &self.commands
    }

    pub fn register_command(&mut self, command: Rc<dyn ReplCommand>) -> bool {
        self.commands.register(command)
    }

    pub fn key_filter(&self) -> &CommandFilter {
        &self.key_filter
    }

    pub fn key_filter_mut(&mut self) -> &mut CommandFilter {
        &mut self.key_filter
    }

    pub fn protection_state(&self) -> Option<ProtectionState> {
        self.protection.state()
    }

    /// Number of the next primary prompt.
    pub fn current_input_number(&self) -> usize {
        self.current_input
    }

    pub fn recycled_prompt_count(&self) -> usize {
        self.recycled_prompts.len()
    }

    pub fn pending_input_count(&self) -> usize {
        self.pending_input.len()
    }

    pub fn output_colors(&self) -> &[OutputColors] {
        &self.output_colors
    }

    /// Color of the output at a document position, if output is shown there.
    pub fn output_color_at(&self, position: usize) -> Option<ConsoleColor> {
        let offset =
            self.projection
                .map_to_store(position, StoreId::Output, PositionAffinity::Successor)?;
        self.output_colors
            .iter()
            .find(|colors| colors.start <= offset && offset < colors.start + colors.len)
            .map(|colors| colors.color)
    }

    pub fn prompt_kind_for_line(&self, line: usize) -> ReplSpanKind {
        self.projection.prompt_kind_for_line(line)
    }

    pub fn busy_indicator_shown(&self) -> bool {
        self.busy.is_shown()
    }

    /// Runs queued UI tasks, flushes buffered output and updates the busy
    /// indicator. Returns how many tasks ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(task) = self.inbox.try_recv() {
            task(self);
            handled += 1;
        }
        if self.output.has_pending() {
            self.flush_output();
        }
        self.busy.poll(Instant::now());
        handled
    }

    /// Like [`pump`](Self::pump), but first waits up to `timeout` for a task.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.inbox.recv_timeout(timeout) {
            Ok(task) => {
                task(self);
                1 + self.pump()
            }
            Err(_) => self.pump(),
        }
    }

    /// Start of the text the user may currently edit.
    pub fn active_input_start(&self) -> Option<usize> {
        if self.standard_input.is_some() {
            let index = self
                .projection
                .spans()
                .iter()
                .rposition(|span| span.kind() == ReplSpanKind::StandardInput)?;
            return Some(self.projection.span_document_range(index).start);
        }
        let index = self.first_language_span_index()?;
        Some(self.projection.span_document_range(index).start)
    }

    /// Runs `action` with protection lifted, restoring it afterwards if it was
    /// active. Nested calls leave the restore to the outermost one.
    pub(crate) fn perform_write<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R {
        let was_protected = self.protection.remove();
        let result = action(self);
        if was_protected {
            self.apply_protection();
        }
        result
    }

    fn apply_protection(&mut self) {
        let len = self.projection.len();
        if self.is_running {
            self.protection.apply(ProtectionPolicy::Running, len, len);
        } else {
            let boundary = self.active_input_start().unwrap_or(len);
            self.protection
                .apply(ProtectionPolicy::AcceptingInput, boundary, len);
        }
    }

    fn caret_anchor(&self) -> CaretAnchor {
        let spans = self.projection.spans();
        let found = self.projection.spans_at(self.caret).rev().find(|&index| {
            let store = spans[index].store();
            store == self.current_language || store == StoreId::StandardInput
        });
        match found {
            Some(index) => {
                let start = self.projection.span_document_range(index).start;
                CaretAnchor::Store(spans[index].store(), spans[index].span().start() + self.caret - start)
            }
            None => CaretAnchor::Document(self.caret),
        }
    }

    fn restore_caret(&mut self, anchor: CaretAnchor) {
        self.caret = match anchor {
            CaretAnchor::Store(store, offset) => self
                .projection
                .map_from_store(store, offset, PositionAffinity::Successor)
                .unwrap_or_else(|| self.projection.len()),
            CaretAnchor::Document(position) => text::floor_boundary(self.projection.text(), position),
        };
    }

    /// Checks the span structure, returning the first inconsistency found.
    pub fn validate_state(&self) -> ReplResult<()> {
        let composed: String = (0..self.projection.span_count())
            .map(|index| self.projection.span_text(index))
            .collect();
        if composed != self.projection.text() {
            return Err(ReplError::InvalidState(
                "document differs from the concatenated spans".to_string(),
            ));
        }
        if self.caret > self.projection.len() {
            return Err(ReplError::InvalidState(format!(
                "caret {} past the end of the document",
                self.caret
            )));
        }
        if let Some(problem) = self.language_structure_error() {
            return Err(ReplError::InvalidState(problem));
        }
        if self.protection.is_active() {
            let expected = if self.is_running {
                self.projection.len()
            } else {
                self.active_input_start().unwrap_or(self.projection.len())
            };
            if self.protection.state().map(|state| state.boundary) != Some(expected) {
                return Err(ReplError::InvalidState(format!(
                    "protection boundary {:?} does not match the active input at {expected}",
                    self.protection.state()
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReplWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplWindow")
            .field("title", &self.title)
            .field("state", &self.state())
            .field("text", &self.projection.text())
            .field("caret", &self.caret)
            .finish_non_exhaustive()
    }
}
