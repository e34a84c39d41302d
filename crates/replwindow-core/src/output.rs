//! Buffered evaluator output with optional ANSI color handling.

/// Console palette used for output coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsoleColor {
    /// The theme's normal foreground.
    #[default]
    Default,
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl ConsoleColor {
    /// Maps an SGR color index (0-7) to a palette entry.
    fn from_sgr(index: u8, bright: bool) -> Self {
        use ConsoleColor::*;
        const DARK: [ConsoleColor; 8] = [
            Black,
            DarkRed,
            DarkGreen,
            DarkYellow,
            DarkBlue,
            DarkMagenta,
            DarkCyan,
            Gray,
        ];
        const BRIGHT: [ConsoleColor; 8] = [DarkGray, Red, Green, Yellow, Blue, Magenta, Cyan, White];
        let index = usize::from(index.min(7));
        if bright {
            BRIGHT[index]
        } else {
            DARK[index]
        }
    }
}

/// Which stream a piece of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Standard,
    Error,
}

impl OutputKind {
    pub fn default_color(self) -> ConsoleColor {
        match self {
            OutputKind::Standard => ConsoleColor::Default,
            OutputKind::Error => ConsoleColor::Red,
        }
    }
}

/// A run of flushed output sharing one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredText {
    pub kind: OutputKind,
    pub color: ConsoleColor,
    pub text: String,
}

/// Color of a range of the output store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColors {
    pub start: usize,
    pub len: usize,
    pub color: ConsoleColor,
}

#[derive(Debug, Clone, Copy, Default)]
struct SgrState {
    color: Option<u8>,
    bright: bool,
}

impl SgrState {
    fn color(self, kind: OutputKind) -> ConsoleColor {
        match self.color {
            Some(index) => ConsoleColor::from_sgr(index, self.bright),
            None => kind.default_color(),
        }
    }

    fn apply(&mut self, params: &str) {
        if params.is_empty() {
            *self = SgrState::default();
            return;
        }
        for param in params.split(';') {
            match param.parse::<u8>() {
                Ok(0) => *self = SgrState::default(),
                Ok(1) => self.bright = true,
                Ok(22) => self.bright = false,
                Ok(code @ 30..=37) => self.color = Some(code - 30),
                Ok(39) => self.color = None,
                Ok(code @ 90..=97) => {
                    self.color = Some(code - 90);
                    self.bright = true;
                }
                _ => {}
            }
        }
    }
}

/// Collects written text until the window flushes it into the document.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    pending: Vec<ColoredText>,
    pending_len: usize,
    flush_threshold: usize,
    process_ansi: bool,
    standard: SgrState,
    error: SgrState,
    partial_escape: Option<(OutputKind, String)>,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuffer {
    pub const DEFAULT_FLUSH_THRESHOLD: usize = 4096;

    pub fn new() -> Self {
        Self::with_flush_threshold(Self::DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_flush_threshold(flush_threshold: usize) -> Self {
        Self {
            pending: Vec::new(),
            pending_len: 0,
            flush_threshold,
            process_ansi: false,
            standard: SgrState::default(),
            error: SgrState::default(),
            partial_escape: None,
        }
    }

    pub fn process_ansi_escapes(&self) -> bool {
        self.process_ansi
    }

    pub fn set_process_ansi_escapes(&mut self, enabled: bool) {
        self.process_ansi = enabled;
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Buffers text. Returns `true` once enough is pending that the caller
    /// should flush right away.
    pub fn write(&mut self, text: &str, kind: OutputKind) -> bool {
        if self.process_ansi {
            self.write_ansi(text, kind);
        } else {
            self.push(kind, kind.default_color(), text);
        }
        self.pending_len >= self.flush_threshold
    }

    /// Drains pending text as color runs.
    pub fn flush(&mut self) -> Vec<ColoredText> {
        self.pending_len = 0;
        std::mem::take(&mut self.pending)
    }

    /// Returns both streams to their default colors.
    pub fn reset_colors(&mut self) {
        self.standard = SgrState::default();
        self.error = SgrState::default();
        self.partial_escape = None;
    }

    fn state_mut(&mut self, kind: OutputKind) -> &mut SgrState {
        match kind {
            OutputKind::Standard => &mut self.standard,
            OutputKind::Error => &mut self.error,
        }
    }

    fn write_ansi(&mut self, text: &str, kind: OutputKind) {
        let mut owned;
        let mut rest = text;
        if let Some((partial_kind, partial)) = self.partial_escape.take() {
            if partial_kind == kind {
                owned = partial;
                owned.push_str(text);
                rest = &owned;
            }
        }
        while !rest.is_empty() {
            let Some(escape) = rest.find('\x1b') else {
                let color = self.state_mut(kind).color(kind);
                self.push(kind, color, rest);
                break;
            };
            if escape > 0 {
                let color = self.state_mut(kind).color(kind);
                self.push(kind, color, &rest[..escape]);
            }
            let sequence = &rest[escape..];
            if !sequence.starts_with("\x1b[") {
                if sequence.len() == 1 {
                    self.partial_escape = Some((kind, sequence.to_string()));
                    break;
                }
                // lone escape: drop it and keep the text after it
                rest = &sequence[1..];
                continue;
            }
            match sequence[2..].find(|c: char| ('\x40'..='\x7e').contains(&c)) {
                Some(offset) => {
                    let end = 2 + offset;
                    if sequence.as_bytes()[end] == b'm' {
                        let params = &sequence[2..end];
                        self.state_mut(kind).apply(params);
                    }
                    rest = &sequence[end + 1..];
                }
                None => {
                    self.partial_escape = Some((kind, sequence.to_string()));
                    break;
                }
            }
        }
    }

    fn push(&mut self, kind: OutputKind, color: ConsoleColor, text: &str) {
        if text.is_empty() {
            return;
        }
        self.pending_len += text.len();
        if let Some(last) = self.pending.last_mut() {
            if last.kind == kind && last.color == color {
                last.text.push_str(text);
                return;
            }
        }
        self.pending.push(ColoredText {
            kind,
            color,
            text: text.to_string(),
        });
    }
}
