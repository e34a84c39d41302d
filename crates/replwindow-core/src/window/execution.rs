use std::time::Instant;

use crate::commands::{CommandDispatch, CommandRouter};
use crate::evaluator::{ExecutionCompletion, ExecutionResult};
use crate::projection::PositionAffinity;

use super::{ExecutionTurn, ReplWindow};

impl ReplWindow {
    /// Whether Enter at the caret would submit the active input.
    ///
    /// Blank input and command lines always submit. Otherwise the caret must
    /// be followed by nothing but whitespace and the evaluator must accept
    /// the text.
    pub fn can_execute_input(&self) -> bool {
        let input = self.active_input();
        if input.trim().is_empty() {
            return true;
        }
        if self.is_command_line(&input) {
            return true;
        }
        let caret = self
            .projection
            .map_to_store(self.caret, self.current_language, PositionAffinity::Successor)
            .unwrap_or(input.len());
        let at_end = input.get(caret..).map_or(true, |rest| rest.trim().is_empty());
        if !at_end {
            return false;
        }
        self.evaluator.can_execute_text(&input)
    }

    pub(super) fn try_execute_input(&mut self) -> bool {
        if self.can_execute_input() {
            self.execute_text();
            true
        } else {
            false
        }
    }

    fn is_command_line(&self, input: &str) -> bool {
        input.trim_start().starts_with(self.options.command_prefix.as_str())
    }

    /// Submits the active input as it is.
    pub fn execute_text(&mut self) {
        self.perform_write(|window| window.start_turn());
    }

    fn start_turn(&mut self) {
        if self.is_running {
            log::warn!("submission ignored: an execution is already running");
            return;
        }
        let text = self.active_input();
        let trimmed = text.trim_end();
        let history_entry = (!trimmed.is_empty()).then(|| self.history.record(trimmed));
        let is_command = self.is_command_line(&text);
        let id = self.next_turn;
        self.next_turn += 1;
        self.is_running = true;
        let started = Instant::now();
        self.turn = Some(ExecutionTurn {
            id,
            code: text.clone(),
            started,
            history_entry,
            is_command,
        });
        self.busy.start(started);
        log::debug!("execution {id} started");

        if text.trim().is_empty() {
            self.finish_execute(id, ExecutionResult::SUCCESS);
        } else if is_command {
            if let Some(entry) = history_entry.and_then(|id| self.history.entry_mut(id)) {
                entry.mark_command();
            }
            let prefix_at = text.find(self.options.command_prefix.as_str()).unwrap_or(0);
            let line = text[prefix_at + self.options.command_prefix.len()..].to_string();
            let result = self.execute_repl_command(&line);
            self.finish_execute(id, result);
        } else {
            let completion = ExecutionCompletion::new(id, self.handle.clone());
            if !self.evaluator.execute_text(&text, completion) {
                log::debug!("evaluator declined execution {id}");
                self.finish_execute(id, ExecutionResult::FAILURE);
            }
        }
    }

    /// Ends the execution `turn` and returns to accepting input. Completions
    /// for any other turn are ignored.
    pub(crate) fn finish_execute(&mut self, turn: u64, result: ExecutionResult) {
        match &self.turn {
            Some(current) if current.id == turn => {}
            _ => {
                log::debug!("ignoring completion for finished execution {turn}");
                return;
            }
        }
        self.perform_write(|window| {
            window.flush_output();
            let Some(turn) = window.turn.take() else {
                return;
            };
            if let Some(entry) = turn
                .history_entry
                .and_then(|id| window.history.entry_mut(id))
            {
                entry.record_completion(turn.started.elapsed(), !result.success);
            }
            log::debug!(
                "execution {} finished ({}) after {:?}: {:?}",
                turn.id,
                if result.success { "success" } else { "failure" },
                turn.started.elapsed(),
                turn.code.trim_end()
            );
            match window.standard_input.as_mut() {
                // the fresh prompt follows once the pending answer is given
                Some(request) => request.was_running = false,
                None => window.prepare_for_input(),
            }
        });
    }

    /// Runs a command line, the text after the command prefix.
    pub(crate) fn execute_repl_command(&mut self, line: &str) -> ExecutionResult {
        let prefix = self.options.command_prefix.clone();
        match self.commands.route(line, &prefix) {
            CommandDispatch::Help => {
                self.show_repl_help();
                ExecutionResult::SUCCESS
            }
            CommandDispatch::Comment => ExecutionResult::SUCCESS,
            CommandDispatch::Unknown { name } => {
                log::warn!("unknown REPL command '{name}'");
                self.write_line(&CommandRouter::unknown_message(&name, &prefix));
                ExecutionResult::FAILURE
            }
            CommandDispatch::Execute { command, arguments } => {
                log::debug!("running REPL command '{}'", command.command());
                command.execute(self, &arguments)
            }
        }
    }

    pub fn show_repl_help(&mut self) {
        for line in self.commands.help_lines() {
            self.write_line(&line);
        }
    }

    /// Shows a new primary prompt with an empty input after it.
    pub(super) fn prepare_for_input(&mut self) {
        self.flush_output();
        self.output.reset_colors();
        self.trim_auto_indent_whitespace();
        self.add_primary_prompt();
        self.add_language_buffer();
        self.caret = self.projection.len();
        self.busy.stop();
        self.is_running = false;
        self.uncommitted_input = None;
        self.process_pending_input();
    }

    /// Drops a trailing line that holds nothing but whitespace.
    fn trim_auto_indent_whitespace(&mut self) {
        let len = self.projection.len();
        let line = self.projection.line_of(len);
        let start = self.projection.line_start(line);
        let last_line = &self.projection.text()[start..len];
        if !last_line.is_empty() && last_line.trim().is_empty() {
            self.projection.delete_document_range(start..len);
        }
    }

    /// Feeds queued lines into the input, submitting at each line break.
    /// Stops as soon as a submission starts running.
    pub(super) fn process_pending_input(&mut self) {
        while let Some(line) = self.pending_input.pop_front() {
            if self.standard_input.is_some() {
                self.append_input(&line.text);
                self.caret = self.projection.len();
                if line.has_newline {
                    self.commit_standard_input();
                    if self.is_running {
                        return;
                    }
                }
                continue;
            }
            if self.is_running {
                self.pending_input.push_front(line);
                return;
            }
            self.append_input(&line.text);
            self.caret = self.projection.len();
            if line.has_newline {
                let position = self.projection.store(self.current_language).len();
                self.ensure_new_line();
                if self.try_execute_input() {
                    return;
                }
                self.insert_secondary_prompt(position);
            }
        }
    }

    /// Commits the active input if the caret is in it; with the caret in a
    /// previous input, copies that input to the active one.
    pub fn smart_execute(&mut self) {
        if self.is_running {
            return;
        }
        if self.standard_input.is_none() && self.caret_in_code_input_region() {
            self.perform_write(|window| {
                window.ensure_new_line();
                window.start_turn();
            });
            return;
        }
        if self.caret_in_standard_input_region() {
            return;
        }
        let spans = self.projection.spans();
        let previous = self
            .projection
            .spans_at(self.caret)
            .rev()
            .map(|index| spans[index].store())
            .find(|store| store.is_language());
        if let Some(store) = previous {
            let text = self.projection.store(store).text().to_string();
            self.caret = self.projection.len();
            self.perform_write(|window| window.set_active_input(&text));
        }
    }

    /// Ends the input line and submits it without asking the evaluator.
    pub fn break_line(&mut self) {
        if !self.is_running && self.standard_input.is_none() {
            self.perform_write(|window| {
                window.ensure_new_line();
                window.start_turn();
            });
        }
    }

    /// Interrupts the running execution, or abandons the current input and
    /// shows a fresh prompt when nothing runs.
    pub fn abort_command(&mut self) {
        let was_running = self
            .standard_input
            .as_ref()
            .map_or(self.is_running, |request| request.was_running);
        if was_running {
            log::debug!("aborting running execution");
            self.evaluator.abort_command();
            if self.standard_input.is_some() {
                self.cancel_standard_input();
            }
        } else if self.standard_input.is_some() {
            self.cancel_standard_input();
        } else {
            self.perform_write(|window| {
                window.ensure_new_line();
                window.prepare_for_input();
            });
        }
    }

    /// Resets the evaluator. A running execution is abandoned as failed.
    pub fn reset(&mut self) -> ExecutionResult {
        self.write_line("Resetting execution engine");
        let result = self.evaluator.reset();
        if self.standard_input.is_some() {
            self.cancel_standard_input();
        }
        let abandoned = match &self.turn {
            Some(turn) if !turn.is_command => Some(turn.id),
            _ => None,
        };
        if let Some(turn) = abandoned {
            log::debug!("abandoning execution {turn} after reset");
            self.finish_execute(turn, ExecutionResult::FAILURE);
        }
        result
    }

    /// Clears the document. History and options are kept.
    pub fn clear_screen(&mut self) {
        self.perform_write(|window| {
            window.recycled_prompts.clear();
            window.projection.clear();
            window.output_colors.clear();
            window.current_input = 1;
            window.current_language = window.projection.new_language_store();
            if let Some(request) = window.standard_input.as_mut() {
                request.start = 0;
                window.add_standard_input_spans();
            } else if !window.is_running {
                window.prepare_for_input();
            }
            window.caret = window.projection.len();
        });
        log::debug!("screen cleared");
    }
}
