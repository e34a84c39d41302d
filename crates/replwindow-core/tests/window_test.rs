mod common;

use common::{pump_until, run, start_window, start_window_with, submit, test_config, wait_for_input};
use replwindow_core::{
    ConsoleColor, KeyResult, OptionError, OptionValue, ReplError, ReplKey, ReplOption, ReplSpanKind,
    ReplState,
};

#[test]
fn test_start_shows_first_prompt() {
    let (window, _) = start_window();
    assert_eq!(window.text(), "> ");
    assert_eq!(window.caret(), 2);
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert_eq!(window.current_input_number(), 2);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_simple_execution_round_trip() {
    let (mut window, calls) = start_window();
    submit(&mut window, "1+1");
    assert_eq!(window.state(), ReplState::Running);
    wait_for_input(&mut window);

    assert_eq!(window.text(), "> 1+1\n2\n> ");
    assert_eq!(window.caret(), window.text().len());
    assert_eq!(calls.lock().unwrap().executed, vec!["1+1"]);
    let entry = window.history().last().unwrap();
    assert_eq!(entry.text(), "1+1");
    assert!(!entry.failed());
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_composed_spans_after_execution() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    assert_eq!(
        window.composed_spans(),
        vec![
            (ReplSpanKind::Prompt, "> "),
            (ReplSpanKind::Language, "1+1\n"),
            (ReplSpanKind::Output, "2\n"),
            (ReplSpanKind::Prompt, "> "),
            (ReplSpanKind::Language, ""),
        ]
    );
}

#[test]
fn test_incomplete_input_adds_secondary_prompt() {
    let (mut window, calls) = start_window();
    submit(&mut window, "f(");
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert_eq!(window.text(), "> f(\n... ");
    assert_eq!(window.caret(), window.text().len());
    assert_eq!(window.prompt_kind_for_line(1), ReplSpanKind::SecondaryPrompt);
    assert!(window.validate_state().is_ok());

    submit(&mut window, ")");
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> f(\n... )\nf(\n)\n> ");
    assert_eq!(calls.lock().unwrap().executed, vec!["f(\n)"]);
    assert_eq!(window.history().last().unwrap().text(), "f(\n)");
}

#[test]
fn test_backspace_after_secondary_prompt_merges_lines() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    window.backspace().unwrap();
    assert_eq!(window.text(), "> f(");
    assert_eq!(window.caret(), 4);
    assert_eq!(window.recycled_prompt_count(), 1);
    assert!(window.validate_state().is_ok());

    window.return_key().unwrap();
    assert_eq!(window.text(), "> f(\n... ");
    assert_eq!(window.recycled_prompt_count(), 0);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_backspace_at_input_start_is_rejected() {
    let (mut window, _) = start_window();
    assert_eq!(
        window.process_key(ReplKey::Backspace),
        KeyResult::Rejected(ReplError::ReadOnly { position: 1 })
    );
    assert_eq!(window.text(), "> ");
}

#[test]
fn test_previous_submission_is_read_only() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    assert_eq!(
        window.cut_selection(0..3),
        Err(ReplError::ReadOnly { position: 0 })
    );
    assert_eq!(
        window.delete_selection(6..8),
        Err(ReplError::ReadOnly { position: 6 })
    );
    assert_eq!(window.text(), "> 1+1\n2\n> ");
}

#[test]
fn test_typing_outside_input_moves_to_end() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    window.move_caret_to(1);
    assert_eq!(window.process_key(ReplKey::Char('x')), KeyResult::Handled);
    assert_eq!(window.text(), "> 1+1\n2\n> x");
    assert_eq!(window.active_input(), "x");
}

#[test]
fn test_edits_rejected_while_running() {
    let (mut window, calls) = start_window();
    submit(&mut window, "hang");
    assert_eq!(window.state(), ReplState::Running);
    let end = window.text().len();
    assert_eq!(window.type_text("x"), Err(ReplError::ReadOnly { position: end }));

    window.abort_command();
    wait_for_input(&mut window);
    assert_eq!(calls.lock().unwrap().aborts, 1);
    assert!(window.history().last().unwrap().failed());
    assert_eq!(window.text(), "> hang\n> ");
}

#[test]
fn test_submission_while_running_is_ignored() {
    let (mut window, calls) = start_window();
    submit(&mut window, "hang");
    let spans: Vec<_> = window
        .composed_spans()
        .into_iter()
        .map(|(kind, text)| (kind, text.to_string()))
        .collect();

    window.execute_text();
    window.break_line();
    window.smart_execute();

    let after: Vec<_> = window
        .composed_spans()
        .into_iter()
        .map(|(kind, text)| (kind, text.to_string()))
        .collect();
    assert_eq!(after, spans);
    assert_eq!(window.state(), ReplState::Running);
    assert_eq!(window.history().len(), 1);
    assert_eq!(calls.lock().unwrap().executed, vec!["hang"]);

    window.abort_command();
    wait_for_input(&mut window);
}

#[test]
fn test_break_line_submits_incomplete_input() {
    let (mut window, calls) = start_window();
    window.type_text("f(").unwrap();
    assert!(!window.can_execute_input());
    window.break_line();
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> f(\nf(\n> ");
    assert_eq!(calls.lock().unwrap().executed, vec!["f("]);
    assert_eq!(window.history().last().unwrap().text(), "f(");
}

#[test]
fn test_abort_while_idle_abandons_input() {
    let (mut window, calls) = start_window();
    window.type_text("abc").unwrap();
    window.abort_command();
    assert_eq!(window.text(), "> abc\n> ");
    assert_eq!(window.active_input(), "");
    assert!(window.history().is_empty());
    assert_eq!(calls.lock().unwrap().aborts, 0);
}

#[test]
fn test_idle_output_goes_before_prompt() {
    let (mut window, _) = start_window();
    window.type_text("x").unwrap();
    window.handle().write_output("hello\n").unwrap();
    window.pump();
    assert_eq!(window.text(), "hello\n> x");
    assert_eq!(window.caret(), 9);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_error_output_is_red() {
    let (mut window, _) = start_window();
    run(&mut window, "fail");
    assert_eq!(window.text(), "> fail\nboom\n> ");
    assert_eq!(window.output_color_at(7), Some(ConsoleColor::Red));
    assert!(window.history().last().unwrap().failed());
}

#[test]
fn test_dropped_completion_fails_execution() {
    let (mut window, _) = start_window();
    run(&mut window, "drop");
    assert!(window.history().last().unwrap().failed());
    assert_eq!(window.text(), "> drop\n> ");
}

#[test]
fn test_declined_execution_finishes_immediately() {
    let (mut window, _) = start_window();
    submit(&mut window, "decline");
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert!(window.history().last().unwrap().failed());

    // the dropped completion of the declined turn is ignored
    window.pump();
    assert_eq!(window.text(), "> decline\n> ");
}

#[test]
fn test_blank_submission_skips_evaluator_and_history() {
    let (mut window, calls) = start_window();
    window.return_key().unwrap();
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert_eq!(window.text(), "> \n> ");
    assert!(calls.lock().unwrap().executed.is_empty());
    assert!(window.history().is_empty());
}

#[test]
fn test_help_command() {
    let (mut window, calls) = start_window();
    submit(&mut window, "%help");
    assert_eq!(window.state(), ReplState::AcceptingInput);
    let help = format!("  help{}  Show a list of REPL commands", " ".repeat(12));
    assert_eq!(window.text(), format!("> %help\n{help}\n> "));
    assert!(calls.lock().unwrap().executed.is_empty());
    assert!(window.history().last().unwrap().is_command());
}

#[test]
fn test_unknown_command() {
    let (mut window, _) = start_window();
    submit(&mut window, "%frobnicate");
    assert_eq!(
        window.text(),
        "> %frobnicate\nUnknown command 'frobnicate', use \"%help\" for help\n> "
    );
    let entry = window.history().last().unwrap();
    assert!(entry.is_command());
    assert!(entry.failed());
}

#[test]
fn test_command_comment_does_nothing() {
    let (mut window, _) = start_window();
    submit(&mut window, "%% just a note");
    assert_eq!(window.text(), "> %% just a note\n> ");
    assert!(!window.history().last().unwrap().failed());
}

#[test]
fn test_history_navigation() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    run(&mut window, "2+2");

    window.history_previous();
    assert_eq!(window.active_input(), "2+2");
    window.history_previous();
    assert_eq!(window.active_input(), "1+1");
    window.history_next();
    assert_eq!(window.active_input(), "2+2");
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_history_search_uses_typed_prefix() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    run(&mut window, "2+2");

    window.type_text("1").unwrap();
    window.search_history_previous();
    assert_eq!(window.active_input(), "1+1");
    assert_eq!(window.caret(), window.text().len());
}

#[test]
fn test_history_recall_of_multi_line_entry() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    run(&mut window, ")");

    window.history_previous();
    assert_eq!(window.active_input(), "f(\n)");
    assert!(window.text().ends_with("> f(\n... )"));
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_escape_clears_input() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    window.type_text("x").unwrap();
    assert_eq!(window.process_key(ReplKey::Escape), KeyResult::Handled);
    assert_eq!(window.text(), "> ");
    assert_eq!(window.recycled_prompt_count(), 1);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_paste_submits_each_line() {
    let (mut window, calls) = start_window();
    window.paste_text("1+1\n2+2\n").unwrap();
    assert!(pump_until(&mut window, |window| {
        window.state() == ReplState::AcceptingInput && window.pending_input_count() == 0
    }));
    assert_eq!(window.text(), "> 1+1\n2\n> 2+2\n4\n> ");
    assert_eq!(calls.lock().unwrap().executed, vec!["1+1", "2+2"]);
}

#[test]
fn test_paste_keeps_incomplete_lines_in_input() {
    let (mut window, calls) = start_window();
    window.paste_text("f(\nx").unwrap();
    assert_eq!(window.text(), "> f(\n... x");
    assert_eq!(window.active_input(), "f(\nx");
    assert!(calls.lock().unwrap().executed.is_empty());
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_clipboard_paste() {
    let (mut window, _) = start_window();
    window.set_clipboard_text("abc");
    assert_eq!(window.process_key(ReplKey::ControlV), KeyResult::Handled);
    assert_eq!(window.active_input(), "abc");
}

#[test]
fn test_cut_selection_fills_clipboard() {
    let (mut window, _) = start_window();
    window.type_text("hello").unwrap();
    assert_eq!(window.cut_selection(2..4).unwrap(), "he");
    assert_eq!(window.clipboard_text(), Some("he"));
    assert_eq!(window.text(), "> llo");
    assert_eq!(window.caret(), 5);
}

#[test]
fn test_cut_across_secondary_prompt_rebuilds_input() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    window.type_text("x").unwrap();
    // "> f(\n... x": select from "(" through "x"
    let removed = window.cut_selection(3..10).unwrap();
    assert_eq!(removed, "(\nx");
    assert_eq!(window.text(), "> f");
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_reset_writes_message_and_resets_evaluator() {
    let (mut window, calls) = start_window();
    let result = window.reset();
    assert!(result.success);
    window.pump();
    assert_eq!(window.text(), "Resetting execution engine\n> ");
    assert_eq!(calls.lock().unwrap().resets, 1);
}

#[test]
fn test_reset_abandons_running_execution() {
    let (mut window, _) = start_window();
    submit(&mut window, "hang");
    window.reset();
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert!(window.history().last().unwrap().failed());
    assert_eq!(window.text(), "> hang\nResetting execution engine\n> ");
    // the completion dropped by the reset is stale
    window.pump();
    assert_eq!(window.text(), "> hang\nResetting execution engine\n> ");
}

#[test]
fn test_clear_screen_keeps_history() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    assert_eq!(window.process_key(ReplKey::ControlL), KeyResult::Handled);
    assert_eq!(window.text(), "> ");
    assert_eq!(window.history().len(), 1);
    assert!(window.output_colors().is_empty());
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_changing_primary_prompt_updates_existing_prompts() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    window
        .set_option_value(ReplOption::PrimaryPrompt, "$ ")
        .unwrap();
    assert_eq!(window.text(), "$ 1+1\n2\n$ ");
    assert_eq!(window.caret(), window.text().len());
    assert_eq!(
        window.option_value(ReplOption::PrimaryPrompt),
        OptionValue::Text("$ ".to_string())
    );
}

#[test]
fn test_changing_secondary_prompt_updates_continuations() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    window
        .set_option_value(ReplOption::SecondaryPrompt, ". ")
        .unwrap();
    assert_eq!(window.text(), "> f(\n. ");
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_option_type_errors() {
    let (mut window, _) = start_window();
    assert_eq!(
        window.set_option_value(ReplOption::ShowOutput, "yes"),
        Err(OptionError::WrongType {
            option: ReplOption::ShowOutput,
            found: "string",
        })
    );
    assert_eq!(
        window.set_option_value(ReplOption::PrimaryPrompt, OptionValue::Null),
        Err(OptionError::NullPrompt {
            option: ReplOption::PrimaryPrompt,
        })
    );
    assert_eq!(window.text(), "> ");
}

#[test]
fn test_prompts_with_control_characters_are_rejected() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    assert_eq!(
        window.set_option_value(ReplOption::SecondaryPrompt, "...\n"),
        Err(OptionError::ControlCharacters {
            option: ReplOption::SecondaryPrompt,
        })
    );
    assert_eq!(
        window.set_option_value(ReplOption::StandardInputPrompt, "\x1b? "),
        Err(OptionError::ControlCharacters {
            option: ReplOption::StandardInputPrompt,
        })
    );
    assert_eq!(window.options().secondary_prompt, "... ");
    assert_eq!(window.text(), "> f(\n... ");
    assert!(window.validate_state().is_ok());

    window
        .set_option_value(ReplOption::PrimaryPrompt, "\t$ ")
        .unwrap();
    assert_eq!(window.text(), "\t$ f(\n... ");
}

#[test]
fn test_prompts_in_margin() {
    let (mut window, _) = start_window();
    window
        .set_option_value(ReplOption::DisplayPromptInMargin, true)
        .unwrap();
    assert_eq!(window.text(), "");
    run(&mut window, "1+1");
    assert_eq!(window.text(), "1+1\n2\n");
    assert_eq!(window.prompt_kind_for_line(0), ReplSpanKind::Prompt);
    assert_eq!(window.prompt_kind_for_line(1), ReplSpanKind::None);
    assert_eq!(window.prompt_kind_for_line(2), ReplSpanKind::Prompt);

    window
        .set_option_value(ReplOption::DisplayPromptInMargin, false)
        .unwrap();
    assert_eq!(window.text(), "> 1+1\n2\n> ");
}

#[test]
fn test_formatted_prompts_number_inputs() {
    let mut config = test_config();
    config.options.primary_prompt = "In [\\#]: ".to_string();
    config.options.formatted_prompts = true;
    let (mut window, _) = start_window_with(config);
    assert_eq!(window.text(), "In [1]: ");
    run(&mut window, "1+1");
    assert_eq!(window.text(), "In [1]: 1+1\n2\nIn [2]: ");

    window
        .set_option_value(ReplOption::FormattedPrompts, false)
        .unwrap();
    assert_eq!(window.text(), "In [\\#]: 1+1\n2\nIn [\\#]: ");
}

#[test]
fn test_hidden_output_still_shows_window_lines() {
    let (mut window, _) = start_window();
    window
        .set_option_value(ReplOption::ShowOutput, false)
        .unwrap();
    run(&mut window, "1+1");
    assert_eq!(window.text(), "> 1+1\n> ");
    submit(&mut window, "%nope");
    assert!(window.text().contains("Unknown command 'nope'"));
}

#[test]
fn test_ansi_colors() {
    let mut config = test_config();
    config.options.support_ansi_colors = true;
    let (mut window, _) = start_window_with(config);
    window.write_output("\x1b[32mok\x1b[0m\n");
    window.flush_output();
    assert_eq!(window.text(), "ok\n> ");
    assert_eq!(window.output_color_at(0), Some(ConsoleColor::DarkGreen));
}

#[test]
fn test_smart_execute_copies_previous_input() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    window.move_caret_to(3);
    window.smart_execute();
    assert_eq!(window.active_input(), "1+1");
    assert_eq!(window.state(), ReplState::AcceptingInput);

    window.smart_execute();
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> 1+1\n2\n> 1+1\n2\n> ");
}

#[test]
fn test_home_stops_after_prompt() {
    let (mut window, _) = start_window();
    window.type_text("abc").unwrap();
    window.home();
    assert_eq!(window.caret(), 2);
    window.move_caret_to(1);
    window.home();
    assert_eq!(window.caret(), 0);
}

#[test]
fn test_delete_forward_joins_lines() {
    let (mut window, _) = start_window();
    submit(&mut window, "f(");
    window.type_text("x").unwrap();
    window.move_caret_to(4);
    window.delete_forward().unwrap();
    assert_eq!(window.text(), "> f(x");
    assert_eq!(window.caret(), 4);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_smart_up_down_uses_history_when_enabled() {
    let (mut window, _) = start_window();
    run(&mut window, "1+1");
    window
        .set_option_value(ReplOption::UseSmartUpDown, true)
        .unwrap();
    assert_eq!(window.process_key(ReplKey::Up), KeyResult::Handled);
    assert_eq!(window.active_input(), "1+1");
}

#[test]
fn test_unbound_key_is_ignored() {
    let (mut window, _) = start_window();
    assert_eq!(window.process_key(ReplKey::Char('\u{7}')), KeyResult::Ignored);
}

#[test]
fn test_busy_indicator_waits_for_delay() {
    let mut config = test_config();
    config.busy_delay = std::time::Duration::ZERO;
    let (mut window, _) = start_window_with(config);
    submit(&mut window, "hang");
    window.pump();
    assert!(window.busy_indicator_shown());
    window.abort_command();
    wait_for_input(&mut window);
    assert!(!window.busy_indicator_shown());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let mut config = test_config();
    config.newline = "\r".to_string();
    let (evaluator, _) = common::ScriptedEvaluator::new();
    let error = replwindow_core::ReplWindow::new("bad", Box::new(evaluator), config).unwrap_err();
    assert!(matches!(error, ReplError::InvalidConfiguration(_)));
}
