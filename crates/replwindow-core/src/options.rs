//! Runtime options and prompt formatting.

use std::fmt;

use crate::error::OptionError;

/// Options that can be read or changed while the window is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplOption {
    CommandPrefix,
    PrimaryPrompt,
    SecondaryPrompt,
    StandardInputPrompt,
    DisplayPromptInMargin,
    UseSmartUpDown,
    ShowOutput,
    SupportAnsiColors,
    FormattedPrompts,
}

impl fmt::Display for ReplOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplOption::CommandPrefix => "CommandPrefix",
            ReplOption::PrimaryPrompt => "PrimaryPrompt",
            ReplOption::SecondaryPrompt => "SecondaryPrompt",
            ReplOption::StandardInputPrompt => "StandardInputPrompt",
            ReplOption::DisplayPromptInMargin => "DisplayPromptInMargin",
            ReplOption::UseSmartUpDown => "UseSmartUpDown",
            ReplOption::ShowOutput => "ShowOutput",
            ReplOption::SupportAnsiColors => "SupportAnsiColors",
            ReplOption::FormattedPrompts => "FormattedPrompts",
        };
        f.write_str(name)
    }
}

/// A dynamically typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Null,
    Text(String),
    Flag(bool),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Null => "null",
            OptionValue::Text(_) => "string",
            OptionValue::Flag(_) => "bool",
        }
    }

    pub(crate) fn into_text(self, option: ReplOption) -> Result<String, OptionError> {
        match self {
            OptionValue::Text(text) => Ok(text),
            other => Err(OptionError::WrongType {
                option,
                found: other.type_name(),
            }),
        }
    }

    /// Text usable as a prompt: no control characters other than tab.
    pub(crate) fn into_prompt(self, option: ReplOption) -> Result<String, OptionError> {
        let prompt = self.into_text(option)?;
        if is_valid_prompt(&prompt) {
            Ok(prompt)
        } else {
            Err(OptionError::ControlCharacters { option })
        }
    }

    pub(crate) fn into_flag(self, option: ReplOption) -> Result<bool, OptionError> {
        match self {
            OptionValue::Flag(flag) => Ok(flag),
            other => Err(OptionError::WrongType {
                option,
                found: other.type_name(),
            }),
        }
    }
}

pub(crate) fn is_valid_prompt(prompt: &str) -> bool {
    !prompt.chars().any(|c| c.is_control() && c != '\t')
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionValue::Null, Into::into)
    }
}

/// Current option values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReplOptions {
    pub command_prefix: String,
    pub primary_prompt: String,
    pub secondary_prompt: String,
    pub standard_input_prompt: String,
    pub display_prompt_in_margin: bool,
    pub use_smart_up_down: bool,
    pub show_output: bool,
    pub support_ansi_colors: bool,
    pub formatted_prompts: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            command_prefix: "%".to_string(),
            primary_prompt: "» ".to_string(),
            secondary_prompt: String::new(),
            standard_input_prompt: String::new(),
            display_prompt_in_margin: false,
            use_smart_up_down: false,
            show_output: true,
            support_ansi_colors: false,
            formatted_prompts: false,
        }
    }
}

impl ReplOptions {
    pub fn get(&self, option: ReplOption) -> OptionValue {
        match option {
            ReplOption::CommandPrefix => self.command_prefix.as_str().into(),
            ReplOption::PrimaryPrompt => self.primary_prompt.as_str().into(),
            ReplOption::SecondaryPrompt => self.secondary_prompt.as_str().into(),
            ReplOption::StandardInputPrompt => self.standard_input_prompt.as_str().into(),
            ReplOption::DisplayPromptInMargin => self.display_prompt_in_margin.into(),
            ReplOption::UseSmartUpDown => self.use_smart_up_down.into(),
            ReplOption::ShowOutput => self.show_output.into(),
            ReplOption::SupportAnsiColors => self.support_ansi_colors.into(),
            ReplOption::FormattedPrompts => self.formatted_prompts.into(),
        }
    }
}

/// Expands prompt escapes when `enabled`.
///
/// `\#` becomes `input_number`, `\D` the local date, `\T` the local time and
/// `\\` a single backslash. Any other escape is kept as written.
///
/// # Examples
///
/// ```
/// use replwindow_core::options::format_prompt;
///
/// assert_eq!(format_prompt("In [\\#]: ", 3, true), "In [3]: ");
/// assert_eq!(format_prompt("In [\\#]: ", 3, false), "In [\\#]: ");
/// assert_eq!(format_prompt("\\q\\\\", 1, true), "\\q\\");
/// ```
pub fn format_prompt(prompt: &str, input_number: usize, enabled: bool) -> String {
    if !enabled || !prompt.contains('\\') {
        return prompt.to_string();
    }
    let mut formatted = String::with_capacity(prompt.len());
    let mut chars = prompt.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            formatted.push(c);
            continue;
        }
        match chars.next() {
            Some('#') => formatted.push_str(&input_number.to_string()),
            Some('D') => formatted.push_str(&chrono::Local::now().format("%x").to_string()),
            Some('T') => formatted.push_str(&chrono::Local::now().format("%X").to_string()),
            Some('\\') => formatted.push('\\'),
            Some(other) => {
                formatted.push('\\');
                formatted.push(other);
            }
            None => formatted.push('\\'),
        }
    }
    formatted
}
