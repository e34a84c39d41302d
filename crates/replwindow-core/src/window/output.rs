use crate::output::{ConsoleColor, OutputColors, OutputKind};
use crate::span::{ReplSpan, ReplSpanKind, StoreId, TrackingSpan};

use super::ReplWindow;

impl ReplWindow {
    /// Writes evaluator output. Discarded while output display is off.
    pub fn write_output(&mut self, text: &str) {
        if self.options.show_output {
            self.buffer_output(text, OutputKind::Standard);
        }
    }

    /// Writes evaluator error output. Discarded while output display is off.
    pub fn write_error(&mut self, text: &str) {
        if self.options.show_output {
            self.buffer_output(text, OutputKind::Error);
        }
    }

    /// Writes a line of window-generated text. Always shown.
    pub fn write_line(&mut self, text: &str) {
        let line = format!("{text}{}", self.newline);
        self.buffer_output(&line, OutputKind::Standard);
    }

    /// Moves buffered output into the document.
    pub fn flush_output(&mut self) {
        let runs = self.output.flush();
        if runs.is_empty() {
            return;
        }
        self.perform_write(|window| {
            for run in runs {
                window.append_output_text(run.color, &run.text);
            }
        });
    }

    fn buffer_output(&mut self, text: &str, kind: OutputKind) {
        if self.output.write(text, kind) {
            self.flush_output();
        }
    }

    /// Adds one closed output span. While running it goes at the end; while
    /// idle it goes before the nearest prompt so the user's input stays last.
    fn append_output_text(&mut self, color: ConsoleColor, text: &str) {
        if text.is_empty() {
            return;
        }
        let range = self.projection.append_to_store(StoreId::Output, text);
        self.output_colors.push(OutputColors {
            start: range.start,
            len: text.len(),
            color,
        });
        let span = ReplSpan::new(TrackingSpan::closed(StoreId::Output, range), ReplSpanKind::Output);

        let insert_before = if self.is_running {
            None
        } else {
            self.projection.spans().iter().rposition(|span| {
                matches!(
                    span.kind(),
                    ReplSpanKind::Prompt | ReplSpanKind::StandardInputPrompt
                )
            })
        };
        match insert_before {
            Some(index) => {
                let position = self.projection.span_document_range(index).start;
                self.projection.insert_at(index, span);
                if self.caret >= position {
                    self.caret += text.len();
                }
            }
            None => self.projection.append(span),
        }
    }
}
