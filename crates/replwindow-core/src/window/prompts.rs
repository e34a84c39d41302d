use crate::options::format_prompt;
use crate::projection::PositionAffinity;
use crate::span::{ReplSpan, ReplSpanKind, StoreId, TrackingSpan};
use crate::text;

use super::ReplWindow;

impl ReplWindow {
    /// Appends a prompt to the prompt store and the document. The store keeps a
    /// separator after each prompt so that adjacent prompts never share an edge.
    fn append_prompt(&mut self, prompt: &str, kind: ReplSpanKind) {
        let span = self.new_prompt_span(prompt);
        self.projection.append(ReplSpan::new(span, kind));
    }

    fn new_prompt_span(&mut self, prompt: &str) -> TrackingSpan {
        let range = self
            .projection
            .append_to_store(StoreId::Prompt, &format!("{prompt} "));
        TrackingSpan::edge_exclusive(StoreId::Prompt, range.start..range.start + prompt.len())
    }

    pub(super) fn primary_prompt_text(&self, input_number: usize) -> String {
        if self.options.display_prompt_in_margin {
            String::new()
        } else {
            format_prompt(
                &self.options.primary_prompt,
                input_number,
                self.options.formatted_prompts,
            )
        }
    }

    fn secondary_prompt_text(&self) -> String {
        if self.options.display_prompt_in_margin {
            String::new()
        } else {
            format_prompt(
                &self.options.secondary_prompt,
                self.current_input.saturating_sub(1),
                self.options.formatted_prompts,
            )
        }
    }

    fn standard_input_prompt_text(&self) -> String {
        if self.options.display_prompt_in_margin {
            String::new()
        } else {
            self.options.standard_input_prompt.clone()
        }
    }

    pub(super) fn add_primary_prompt(&mut self) {
        let prompt = self.primary_prompt_text(self.current_input);
        self.append_prompt(&prompt, ReplSpanKind::Prompt);
        self.current_input += 1;
    }

    /// Starts a fresh language store for the next submission.
    pub(super) fn add_language_buffer(&mut self) {
        self.current_language = self.projection.new_language_store();
        self.add_initial_language_span();
    }

    pub(super) fn add_initial_language_span(&mut self) {
        let end = self.projection.store(self.current_language).len();
        self.projection.append(ReplSpan::new(
            TrackingSpan::open(self.current_language, end..end),
            ReplSpanKind::Language,
        ));
    }

    pub(super) fn add_standard_input_spans(&mut self) {
        let prompt = self.standard_input_prompt_text();
        self.append_prompt(&prompt, ReplSpanKind::StandardInputPrompt);
        let end = self.projection.store(StoreId::StandardInput).len();
        self.projection.append(ReplSpan::new(
            TrackingSpan::open(StoreId::StandardInput, end..end),
            ReplSpanKind::StandardInput,
        ));
    }

    fn take_secondary_prompt_span(&mut self) -> TrackingSpan {
        match self.recycled_prompts.pop() {
            Some(span) => span,
            None => {
                let prompt = self.secondary_prompt_text();
                self.new_prompt_span(&prompt)
            }
        }
    }

    pub(super) fn recycle_prompt(&mut self, index: usize) {
        let span = self.projection.spans()[index].clone();
        if let Some(region) = span.read_only_region() {
            self.projection
                .store_mut(StoreId::Prompt)
                .remove_read_only_region(region);
        }
        self.recycled_prompts.push(span.span().clone());
    }

    /// Index of the current submission's first language span.
    pub(super) fn first_language_span_index(&self) -> Option<usize> {
        self.projection
            .spans()
            .iter()
            .position(|span| span.store() == self.current_language)
    }

    /// Splits the current input after a line break inserted at `position` in
    /// the language store, putting a secondary prompt before the new line.
    pub(crate) fn insert_secondary_prompt(&mut self, position: usize) {
        let anchor = self.caret_anchor();
        let language = self.current_language;
        let store_text = self.projection.store(language).text().to_string();
        let starts = text::line_starts(&store_text);
        let previous_line = text::line_number_at(&starts, position);
        let (Some(previous), Some(next)) = (
            text::line_extent(&store_text, &starts, previous_line),
            text::line_extent_with_break(&starts, store_text.len(), previous_line + 1),
        ) else {
            log::error!("no line follows offset {position} in the current input");
            return;
        };
        let Some(first) = self.first_language_span_index() else {
            log::error!("current input has no language span");
            return;
        };

        let mut previous_range = previous;
        let mut new_range = position..next.end;
        if store_text[new_range.clone()].starts_with(self.newline.as_str()) {
            previous_range.end += self.newline.len();
            new_range.start += self.newline.len();
        }

        let target = first + previous_line * 2;
        if target >= self.projection.span_count() {
            log::error!("line {previous_line} has no language span to split");
            return;
        }
        let is_last = target == self.projection.span_count() - 1;
        let new_span = if is_last {
            TrackingSpan::open(language, new_range)
        } else {
            TrackingSpan::closed(language, new_range)
        };

        let prompt = self.take_secondary_prompt_span();
        let region = self
            .projection
            .store_mut(StoreId::Prompt)
            .create_read_only_region(prompt.range());
        self.projection.replace_with_three(
            target,
            [
                ReplSpan::new(TrackingSpan::closed(language, previous_range), ReplSpanKind::Language),
                ReplSpan::with_region(prompt, ReplSpanKind::SecondaryPrompt, region),
                ReplSpan::new(new_span, ReplSpanKind::Language),
            ],
        );
        self.check_language_spans();
        self.restore_caret(anchor);
    }

    /// When `caret` sits right after a secondary prompt of the current input,
    /// removes that prompt and merges the lines around it. The caret ends up
    /// at the start of the merged line's second half.
    pub(crate) fn try_remove_prompt_for_backspace(&mut self, caret: usize) -> bool {
        let spans = self.projection.spans();
        let mut length = 0;
        let mut found = None;
        for (index, span) in spans.iter().enumerate() {
            if length > caret {
                break;
            }
            length += span.len();
            if span.kind() == ReplSpanKind::SecondaryPrompt && length == caret {
                found = Some(index);
                break;
            }
        }
        let Some(index) = found else {
            return false;
        };
        if index == 0
            || index + 1 >= spans.len()
            || spans[index - 1].store() != self.current_language
            || spans[index + 1].store() != self.current_language
        {
            return false;
        }

        let before = spans[index - 1].span().clone();
        let after = spans[index + 1].span().clone();
        let was_last = index + 1 == spans.len() - 1;
        let merged = if was_last {
            TrackingSpan::open(self.current_language, before.start()..after.end())
        } else {
            TrackingSpan::closed(self.current_language, before.start()..after.end())
        };

        self.recycle_prompt(index);
        self.projection.replace_range(
            index - 1,
            3,
            [ReplSpan::new(merged, ReplSpanKind::Language)],
        );
        self.caret = self
            .projection
            .map_from_store(self.current_language, after.start(), PositionAffinity::Predecessor)
            .unwrap_or(caret);
        true
    }

    pub(super) fn check_language_spans(&self) {
        if let Some(problem) = self.language_structure_error() {
            log::error!("inconsistent input spans: {problem}");
            debug_assert!(false, "inconsistent input spans: {problem}");
        }
    }

    /// Describes what is wrong with the current input's spans, if anything.
    ///
    /// While input is accepted the current submission is a primary prompt
    /// followed by alternating language spans and secondary prompts, one
    /// language span per line of the language store.
    pub(super) fn language_structure_error(&self) -> Option<String> {
        if self.is_running || self.standard_input.is_some() {
            return None;
        }
        let spans = self.projection.spans();
        let first = match self.first_language_span_index() {
            Some(first) => first,
            None if spans.is_empty() => return None,
            None => return Some("no language span for the current input".to_string()),
        };
        if first == 0 || spans[first - 1].kind() != ReplSpanKind::Prompt {
            return Some("current input does not follow a primary prompt".to_string());
        }
        let mut count = 0;
        let mut index = first;
        loop {
            let span = &spans[index];
            if span.store() != self.current_language || span.kind() != ReplSpanKind::Language {
                return Some(format!("span {index} is not part of the current input"));
            }
            count += 1;
            match spans.get(index + 1) {
                Some(next) if next.kind() == ReplSpanKind::SecondaryPrompt => index += 2,
                Some(_) => return Some(format!("unexpected span after line {count}")),
                None => break,
            }
            if index >= spans.len() {
                return Some("input ends with a secondary prompt".to_string());
            }
        }
        if !spans[index].span().is_open_ended() {
            return Some("last input span is not open".to_string());
        }
        let lines = text::line_starts(self.projection.store(self.current_language).text()).len();
        if count != lines {
            return Some(format!("{count} language spans for {lines} lines"));
        }
        None
    }

    /// Reformats every prompt of `kind` after a prompt option changed.
    pub(super) fn update_prompts(&mut self, kind: ReplSpanKind, old: Option<&str>, new: &str) {
        if old == Some(new) || self.projection.span_count() == 0 {
            return;
        }
        if kind == ReplSpanKind::SecondaryPrompt {
            self.recycled_prompts.clear();
        }
        self.perform_write(|window| {
            let anchor = window.caret_anchor();
            let mut input_number: usize = 1;
            for index in 0..window.projection.span_count() {
                let span_kind = window.projection.spans()[index].kind();
                if span_kind == kind {
                    let number = if kind == ReplSpanKind::Prompt {
                        input_number
                    } else {
                        input_number.saturating_sub(1)
                    };
                    let formatted = match kind {
                        ReplSpanKind::StandardInputPrompt => new.to_string(),
                        _ => format_prompt(new, number, window.options.formatted_prompts),
                    };
                    let prompt = window.new_prompt_span(&formatted);
                    let replacement = match window.projection.spans()[index].read_only_region() {
                        Some(old_region) => {
                            let store = window.projection.store_mut(StoreId::Prompt);
                            store.remove_read_only_region(old_region);
                            let region = store.create_read_only_region(prompt.range());
                            ReplSpan::with_region(prompt, kind, region)
                        }
                        None => ReplSpan::new(prompt, kind),
                    };
                    window.projection.replace_at(index, replacement);
                }
                if span_kind == ReplSpanKind::Prompt {
                    input_number += 1;
                }
            }
            window.restore_caret(anchor);
        });
    }
}
