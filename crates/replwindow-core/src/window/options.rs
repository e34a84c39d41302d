use crate::error::OptionError;
use crate::options::{OptionValue, ReplOption};
use crate::span::ReplSpanKind;

use super::ReplWindow;

impl ReplWindow {
    /// Changes an option. Prompt changes are applied to every prompt already
    /// shown.
    pub fn set_option_value(
        &mut self,
        option: ReplOption,
        value: impl Into<OptionValue>,
    ) -> Result<(), OptionError> {
        let value = value.into();
        match option {
            ReplOption::CommandPrefix => {
                self.options.command_prefix = value.into_text(option)?;
            }
            ReplOption::PrimaryPrompt => {
                if value == OptionValue::Null {
                    return Err(OptionError::NullPrompt { option });
                }
                let prompt = value.into_prompt(option)?;
                let old = std::mem::replace(&mut self.options.primary_prompt, prompt.clone());
                if !self.options.display_prompt_in_margin {
                    self.update_prompts(ReplSpanKind::Prompt, Some(&old), &prompt);
                }
            }
            ReplOption::SecondaryPrompt => {
                let prompt = match value {
                    OptionValue::Null => String::new(),
                    other => other.into_prompt(option)?,
                };
                let old = std::mem::replace(&mut self.options.secondary_prompt, prompt.clone());
                if !self.options.display_prompt_in_margin {
                    self.update_prompts(ReplSpanKind::SecondaryPrompt, Some(&old), &prompt);
                }
            }
            ReplOption::StandardInputPrompt => {
                if value == OptionValue::Null {
                    return Err(OptionError::NullPrompt { option });
                }
                let prompt = value.into_prompt(option)?;
                let old =
                    std::mem::replace(&mut self.options.standard_input_prompt, prompt.clone());
                if !self.options.display_prompt_in_margin {
                    self.update_prompts(ReplSpanKind::StandardInputPrompt, Some(&old), &prompt);
                }
            }
            ReplOption::DisplayPromptInMargin => {
                let in_margin = value.into_flag(option)?;
                if in_margin == self.options.display_prompt_in_margin {
                    return Ok(());
                }
                self.options.display_prompt_in_margin = in_margin;
                let primary = self.options.primary_prompt.clone();
                let secondary = self.options.secondary_prompt.clone();
                if in_margin {
                    self.update_prompts(ReplSpanKind::Prompt, Some(&primary), "");
                    self.update_prompts(ReplSpanKind::SecondaryPrompt, Some(&secondary), "");
                } else {
                    self.update_prompts(ReplSpanKind::Prompt, Some(""), &primary);
                    self.update_prompts(ReplSpanKind::SecondaryPrompt, Some(""), &secondary);
                }
            }
            ReplOption::UseSmartUpDown => {
                self.options.use_smart_up_down = value.into_flag(option)?;
            }
            ReplOption::ShowOutput => {
                let show = value.into_flag(option)?;
                self.flush_output();
                self.options.show_output = show;
            }
            ReplOption::SupportAnsiColors => {
                let enabled = value.into_flag(option)?;
                self.flush_output();
                self.options.support_ansi_colors = enabled;
                self.output.set_process_ansi_escapes(enabled);
            }
            ReplOption::FormattedPrompts => {
                let formatted = value.into_flag(option)?;
                if formatted == self.options.formatted_prompts {
                    return Ok(());
                }
                self.options.formatted_prompts = formatted;
                if !self.options.display_prompt_in_margin {
                    let primary = self.options.primary_prompt.clone();
                    let secondary = self.options.secondary_prompt.clone();
                    let standard_input = self.options.standard_input_prompt.clone();
                    self.update_prompts(ReplSpanKind::Prompt, None, &primary);
                    self.update_prompts(ReplSpanKind::SecondaryPrompt, None, &secondary);
                    self.update_prompts(ReplSpanKind::StandardInputPrompt, None, &standard_input);
                }
            }
        }
        log::debug!("option {option} updated");
        Ok(())
    }
}
