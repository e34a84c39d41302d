//! User-level editing: the caret, typing, deletion, history recall, paste.

use std::ops::Range;

use crate::error::{ReplError, ReplResult};
use crate::projection::PositionAffinity;
use crate::span::{ReplSpan, ReplSpanKind, StoreId, TrackingSpan};
use crate::text::{self, split_lines};

use super::ReplWindow;

impl ReplWindow {
    pub fn move_caret_to(&mut self, position: usize) {
        self.caret = text::floor_boundary(self.projection.text(), position);
    }

    pub fn move_to_end(&mut self) {
        self.caret = self.projection.len();
    }

    pub fn caret_at_end(&self) -> bool {
        self.caret == self.projection.len()
    }

    /// Whether the caret is inside the current submission's text.
    pub fn caret_in_code_input_region(&self) -> bool {
        self.projection
            .map_to_store(self.caret, self.current_language, PositionAffinity::Successor)
            .is_some()
    }

    /// Whether the caret is inside the pending standard input answer.
    pub fn caret_in_standard_input_region(&self) -> bool {
        let Some(request) = &self.standard_input else {
            return false;
        };
        self.projection
            .map_to_store(self.caret, StoreId::StandardInput, PositionAffinity::Successor)
            .is_some_and(|offset| offset >= request.start)
    }

    /// The text the user is currently editing.
    pub fn active_input(&self) -> String {
        match &self.standard_input {
            Some(request) => {
                let store = self.projection.store(StoreId::StandardInput);
                store.slice(request.start..store.len()).to_string()
            }
            None => self
                .projection
                .store(self.current_language)
                .text()
                .to_string(),
        }
    }

    /// Types text at the caret. Text containing line breaks is pasted instead.
    pub fn type_text(&mut self, text: &str) -> ReplResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        if text.contains(['\n', '\r']) {
            return self.paste_text(text);
        }
        if !self.caret_in_code_input_region() && !self.caret_in_standard_input_region() {
            self.move_to_end();
        }
        self.editor_insert(self.caret, text)
    }

    /// Enter: commits standard input, submits the input when it is complete,
    /// or starts a continuation line.
    pub fn return_key(&mut self) -> ReplResult<()> {
        if self.standard_input.is_some() {
            self.try_commit_standard_input();
            return Ok(());
        }
        let Some(position) = self.projection.map_to_store(
            self.caret,
            self.current_language,
            PositionAffinity::Successor,
        ) else {
            return Ok(());
        };
        let newline = self.newline.clone();
        self.editor_insert(self.caret, &newline)?;
        self.perform_write(|window| {
            if !window.try_execute_input() {
                window.insert_secondary_prompt(position);
            }
        });
        Ok(())
    }

    pub fn backspace(&mut self) -> ReplResult<()> {
        let caret = self.caret;
        if !self.is_running && self.standard_input.is_none() && self.caret_in_code_input_region() {
            self.perform_write(|window| window.try_remove_prompt_for_backspace(caret));
        }
        let Some(start) = text::previous_boundary(self.projection.text(), self.caret) else {
            return Ok(());
        };
        self.cut_or_delete(start..self.caret, false).map(drop)
    }

    /// Delete key. At the end of a line inside multi-line input, joins the
    /// next line onto this one.
    pub fn delete_forward(&mut self) -> ReplResult<()> {
        let caret = self.caret;
        if caret >= self.projection.len() {
            return Ok(());
        }
        let language = self.current_language;
        if let Some(offset) =
            self.projection
                .map_to_store(caret, language, PositionAffinity::Predecessor)
        {
            let line = self.projection.line_of(caret);
            let store_len = self.projection.store(language).len();
            if offset != store_len && self.projection.line_range(line).end == caret {
                let break_len = self.newline.len();
                let joined = self.projection.map_from_store(
                    language,
                    offset + break_len,
                    PositionAffinity::Successor,
                );
                if let Some(next_line) = joined {
                    if self.protection.can_delete(caret..next_line)
                        && self.perform_write(|window| {
                            if !window.try_remove_prompt_for_backspace(next_line) {
                                return false;
                            }
                            window
                                .projection
                                .delete_from_store(language, offset..offset + break_len);
                            true
                        })
                    {
                        self.caret = caret;
                        return Ok(());
                    }
                }
            }
        }
        let Some(end) = text::next_boundary(self.projection.text(), caret) else {
            return Ok(());
        };
        self.cut_or_delete(caret..end, false).map(drop)
    }

    /// Deletes a selection. See [`cut_selection`](Self::cut_selection).
    pub fn delete_selection(&mut self, selection: Range<usize>) -> ReplResult<()> {
        self.cut_or_delete(selection, false).map(drop)
    }

    /// Cuts a selection to the clipboard and returns the cut text.
    ///
    /// A selection covering secondary prompts as well as code rebuilds the
    /// active input without the selected code. Selections touching output,
    /// standard input history or previous submissions are rejected.
    pub fn cut_selection(&mut self, selection: Range<usize>) -> ReplResult<String> {
        self.cut_or_delete(selection, true)
    }

    fn cut_or_delete(&mut self, selection: Range<usize>, is_cut: bool) -> ReplResult<String> {
        let document = self.projection.text();
        let start = text::floor_boundary(document, selection.start);
        let end = text::floor_boundary(document, selection.end);
        if start >= end {
            return Ok(String::new());
        }
        let range = start..end;
        if !self.protection.can_delete(range.clone()) {
            return Err(ReplError::ReadOnly { position: start });
        }

        let mut includes_prompts = false;
        let mut includes_code = false;
        for (index, span) in self.projection.spans().iter().enumerate() {
            let doc = self.projection.span_document_range(index);
            let overlaps = doc.start < range.end && doc.end > range.start;
            match span.store() {
                StoreId::Prompt => {
                    if overlaps || (range.start < doc.start && doc.start <= range.end) {
                        includes_prompts = true;
                    }
                }
                store if store == self.current_language => includes_code |= overlaps,
                StoreId::StandardInput if self.standard_input.is_some() => {}
                _ if overlaps => return Err(ReplError::ReadOnly { position: doc.start.max(start) }),
                _ => {}
            }
        }

        let removed = if includes_prompts && includes_code {
            self.rebuild_input_without(range)
        } else {
            let removed = self.projection.text()[range.clone()].to_string();
            self.editor_delete(range)?;
            removed
        };
        if is_cut {
            self.clipboard = Some(removed.clone());
        }
        Ok(removed)
    }

    /// Removes the code inside `range` by rebuilding the active input, which
    /// drops or merges the continuation lines it covered.
    fn rebuild_input_without(&mut self, range: Range<usize>) -> String {
        let language = self.current_language;
        let pieces: Vec<_> = self
            .projection
            .store_ranges(range)
            .into_iter()
            .filter(|piece| piece.store == language)
            .collect();
        let mut input = self.projection.store(language).text().to_string();
        let removed: String = pieces.iter().map(|piece| &input[piece.range.clone()]).collect();
        let caret_offset = pieces.first().map_or(input.len(), |piece| piece.range.start);
        for piece in pieces.iter().rev() {
            input.replace_range(piece.range.clone(), "");
        }
        self.perform_write(|window| {
            window.clear_input();
            window.load_input(&input);
        });
        self.caret = self
            .projection
            .map_from_store(language, caret_offset, PositionAffinity::Successor)
            .unwrap_or_else(|| self.projection.len());
        removed
    }

    /// Moves the caret to the start of the line, after the prompt when the
    /// caret is in input text.
    pub fn home(&mut self) {
        let line = self.projection.line_of(self.caret);
        let line_start = self.projection.line_start(line);
        let in_input = self.projection.spans_at(self.caret).any(|index| {
            self.projection.spans()[index].store().is_user_editable()
        });
        let after_prompt = self
            .projection
            .prompt_span_for_line(line)
            .map(|index| self.projection.span_document_range(index).end)
            .filter(|&end| end <= self.caret);
        self.caret = match after_prompt {
            Some(end) if in_input && !self.options.display_prompt_in_margin => end,
            _ => line_start,
        };
    }

    pub fn move_line_up(&mut self) {
        let line = self.projection.line_of(self.caret);
        if line > 0 {
            self.move_to_line(line - 1);
        }
    }

    pub fn move_line_down(&mut self) {
        let line = self.projection.line_of(self.caret);
        if line + 1 < self.projection.line_count() {
            self.move_to_line(line + 1);
        }
    }

    fn move_to_line(&mut self, target: usize) {
        let column = self.caret - self.projection.line_start(self.projection.line_of(self.caret));
        let range = self.projection.line_range(target);
        let position = (range.start + column).min(range.end);
        self.caret = text::floor_boundary(self.projection.text(), position);
    }

    /// Up arrow: history when idle at the end of input, otherwise a line up.
    pub fn smart_up_arrow(&mut self) {
        if self.uses_history_keys() {
            self.history_previous();
        } else {
            self.move_line_up();
        }
    }

    pub fn smart_down_arrow(&mut self) {
        if self.uses_history_keys() {
            self.history_next();
        } else {
            self.move_line_down();
        }
    }

    fn uses_history_keys(&self) -> bool {
        !self.is_running && self.caret_at_end() && self.options.use_smart_up_down
    }

    pub fn history_previous(&mut self) {
        if self.is_running && self.standard_input.is_none() {
            return;
        }
        if let Some(text) = self.history.previous_text() {
            self.recall(&text);
        }
    }

    pub fn history_next(&mut self) {
        if self.is_running && self.standard_input.is_none() {
            return;
        }
        match self.history.next_text() {
            Some(text) => self.recall(&text),
            None => self.insert_uncommitted_input(),
        }
    }

    /// Recalls the nearest older entry starting with the text typed before
    /// history navigation began.
    pub fn search_history_previous(&mut self) {
        if self.is_running && self.standard_input.is_none() {
            return;
        }
        let prefix = self
            .uncommitted_input
            .clone()
            .unwrap_or_else(|| self.active_input());
        if let Some(text) = self.history.find_previous(&prefix) {
            self.recall(&text);
        }
    }

    pub fn search_history_next(&mut self) {
        if self.is_running && self.standard_input.is_none() {
            return;
        }
        let prefix = self
            .uncommitted_input
            .clone()
            .unwrap_or_else(|| self.active_input());
        if let Some(text) = self.history.find_next(&prefix) {
            self.recall(&text);
        }
    }

    fn recall(&mut self, text: &str) {
        self.store_uncommitted_input();
        self.perform_write(|window| window.set_active_input(text));
    }

    fn store_uncommitted_input(&mut self) {
        if self.uncommitted_input.is_none() {
            let input = self.active_input();
            if !input.trim().is_empty() {
                self.uncommitted_input = Some(input);
            }
        }
    }

    fn insert_uncommitted_input(&mut self) {
        if let Some(text) = self.uncommitted_input.take() {
            self.perform_write(|window| window.set_active_input(&text));
        }
    }

    /// Escape: discards the active input.
    pub fn cancel(&mut self) {
        if self.is_running && self.standard_input.is_none() {
            return;
        }
        self.uncommitted_input = None;
        self.perform_write(|window| window.clear_input());
        self.move_to_end();
    }

    /// Pastes text. Multi-line text, or any text while code runs, is queued
    /// line by line and submitted as if typed.
    pub fn paste_text(&mut self, text: &str) -> ReplResult<()> {
        if text.contains(['\n', '\r']) || self.is_running {
            if self.protection.is_protected(self.caret) {
                self.move_to_end();
            }
            self.pending_input.extend(split_lines(text));
            if !self.is_running {
                self.perform_write(|window| window.process_pending_input());
            }
            Ok(())
        } else {
            if !self.caret_in_code_input_region() && !self.caret_in_standard_input_region() {
                self.move_to_end();
            }
            self.editor_insert(self.caret, text)
        }
    }

    /// Host clipboard contents used by [`paste_clipboard`](Self::paste_clipboard).
    pub fn set_clipboard_text(&mut self, text: impl Into<String>) {
        self.clipboard = Some(text.into());
    }

    pub fn clipboard_text(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Pastes the clipboard, letting the evaluator reformat it first.
    pub fn paste_clipboard(&mut self) -> ReplResult<()> {
        let Some(contents) = self.clipboard.clone() else {
            return Ok(());
        };
        let text = self
            .evaluator
            .format_clipboard_contents(&contents)
            .unwrap_or(contents);
        self.paste_text(&text)
    }

    /// Replaces the active input with `text`, minus trailing line breaks.
    pub(crate) fn set_active_input(&mut self, text: &str) {
        let text = text.trim_end_matches(['\r', '\n']);
        self.clear_input();
        if self.standard_input.is_some() {
            let first_line = text.lines().next().unwrap_or("");
            self.append_input(first_line);
        } else {
            self.load_input(text);
        }
        self.move_to_end();
    }

    fn load_input(&mut self, text: &str) {
        for line in split_lines(text) {
            self.append_input(&line.text);
            if line.has_newline {
                let position = self.projection.store(self.current_language).len();
                self.ensure_new_line();
                self.insert_secondary_prompt(position);
            }
        }
    }

    /// Removes the active input's text and continuation lines, leaving an
    /// empty input after its prompt.
    pub(crate) fn clear_input(&mut self) {
        let count = self.projection.span_count();
        let mut index = count;
        let mut prompt = None;
        while index > 0 {
            index -= 1;
            match self.projection.spans()[index].kind() {
                kind @ (ReplSpanKind::Prompt | ReplSpanKind::StandardInputPrompt) => {
                    prompt = Some((index, kind));
                    break;
                }
                ReplSpanKind::SecondaryPrompt => self.recycle_prompt(index),
                _ => {}
            }
        }
        let Some((index, kind)) = prompt else {
            log::warn!("no prompt found while clearing input");
            return;
        };
        self.projection.remove_range(index + 1, count - index - 1);
        match (kind, self.standard_input.as_ref().map(|request| request.start)) {
            (ReplSpanKind::StandardInputPrompt, Some(start)) => {
                let len = self.projection.store(StoreId::StandardInput).len();
                self.projection
                    .delete_from_store(StoreId::StandardInput, start..len);
                self.projection.append(ReplSpan::new(
                    TrackingSpan::open(StoreId::StandardInput, start..start),
                    ReplSpanKind::StandardInput,
                ));
            }
            _ => {
                let len = self.projection.store(self.current_language).len();
                self.projection
                    .delete_from_store(self.current_language, 0..len);
                self.add_initial_language_span();
            }
        }
        self.caret = self.caret.min(self.projection.len());
    }

    /// Appends to the open span at the end of the document.
    pub(crate) fn append_input(&mut self, text: &str) {
        let Some(last) = self.projection.last_span() else {
            return;
        };
        debug_assert!(
            last.kind().is_input() && last.span().is_open_ended(),
            "input appended after a {:?} span",
            last.kind()
        );
        let store = last.store();
        self.projection.append_to_store(store, text);
    }

    pub(crate) fn ensure_new_line(&mut self) {
        let newline = self.newline.clone();
        self.projection
            .append_to_store(self.current_language, &newline);
        self.move_to_end();
    }

    /// An insertion made by the user. Goes to the last input span touching
    /// `position`; prompts and output are never edited.
    fn editor_insert(&mut self, position: usize, text: &str) -> ReplResult<()> {
        if !self.protection.can_insert(position) {
            return Err(ReplError::ReadOnly { position });
        }
        let spans = self.projection.spans();
        let index = self
            .projection
            .spans_at(position)
            .rev()
            .find(|&index| spans[index].store().is_user_editable())
            .ok_or(ReplError::ReadOnly { position })?;
        let store = spans[index].store();
        let offset =
            spans[index].span().start() + position - self.projection.span_document_range(index).start;
        if !self.projection.store(store).allows_user_insert(offset) {
            return Err(ReplError::ReadOnly { position });
        }
        self.projection.insert_into_store(store, offset, text);
        self.caret = self
            .projection
            .map_from_store(store, offset + text.len(), PositionAffinity::Successor)
            .unwrap_or(position + text.len());
        Ok(())
    }

    fn editor_delete(&mut self, range: Range<usize>) -> ReplResult<()> {
        if !self.protection.can_delete(range.clone()) {
            return Err(ReplError::ReadOnly {
                position: range.start,
            });
        }
        let pieces = self.projection.store_ranges(range.clone());
        let editable = pieces.iter().all(|piece| {
            piece.store.is_user_editable()
                && self
                    .projection
                    .store(piece.store)
                    .allows_user_delete(piece.range.clone())
        });
        if !editable {
            return Err(ReplError::ReadOnly {
                position: range.start,
            });
        }
        for piece in pieces.into_iter().rev() {
            self.projection.delete_from_store(piece.store, piece.range);
        }
        let removed = range.end - range.start;
        if self.caret >= range.end {
            self.caret -= removed;
        } else if self.caret > range.start {
            self.caret = range.start;
        }
        Ok(())
    }
}
