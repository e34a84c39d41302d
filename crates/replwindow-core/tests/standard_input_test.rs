mod common;

use std::thread;

use common::{pump_until, start_window, submit, wait_for_input};
use replwindow_core::{ReplError, ReplKey, ReplSpanKind, ReplState};

fn wait_for_standard_input(window: &mut replwindow_core::ReplWindow) {
    assert!(
        pump_until(window, |window| {
            window.state() == ReplState::AwaitingStandardInput
        }),
        "standard input never requested: {window:?}"
    );
}

#[test]
fn test_standard_input_during_execution() {
    let (mut window, calls) = start_window();
    submit(&mut window, "input");
    wait_for_standard_input(&mut window);
    assert_eq!(window.text(), "> input\n");
    assert!(!window.is_running());
    assert!(window.validate_state().is_ok());

    window.type_text("abc").unwrap();
    assert_eq!(window.active_input(), "abc");
    window.process_key(ReplKey::Enter);
    assert_eq!(window.state(), ReplState::Running);

    wait_for_input(&mut window);
    assert_eq!(window.text(), "> input\nabc\ngot abc\n> ");
    assert_eq!(calls.lock().unwrap().executed, vec!["input"]);
    // the answer is recorded after the submission that asked for it
    let texts: Vec<_> = window.history().entries().iter().map(|entry| entry.text()).collect();
    assert_eq!(texts, vec!["input", "abc"]);
    assert!(window.history().entries().iter().all(|entry| !entry.failed()));
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_standard_input_prompt_is_shown() {
    let mut config = common::test_config();
    config.options.standard_input_prompt = "? ".to_string();
    let (mut window, _) = common::start_window_with(config);
    submit(&mut window, "input");
    wait_for_standard_input(&mut window);
    assert_eq!(window.text(), "> input\n? ");
    assert_eq!(window.prompt_kind_for_line(1), ReplSpanKind::StandardInputPrompt);

    window.type_text("42").unwrap();
    window.return_key().unwrap();
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> input\n? 42\ngot 42\n> ");
}

#[test]
fn test_output_before_request_stays_before_prompt() {
    let (mut window, _) = start_window();
    let handle = window.handle();
    let reader = thread::spawn(move || {
        handle.write_output("name: ").unwrap();
        handle.read_standard_input()
    });
    wait_for_standard_input(&mut window);
    assert_eq!(window.text(), "name: ");
    window.type_text("bob").unwrap();
    window.return_key().unwrap();
    assert_eq!(reader.join().unwrap(), Ok("bob".to_string()));
    assert_eq!(window.text(), "name: bob\n> ");
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_idle_request_replaces_pending_input() {
    let (mut window, _) = start_window();
    window.type_text("draft").unwrap();
    let handle = window.handle();
    let reader = thread::spawn(move || handle.read_standard_input());
    wait_for_standard_input(&mut window);
    assert_eq!(window.text(), "");
    assert_eq!(window.active_input(), "");

    window.type_text("hi").unwrap();
    window.return_key().unwrap();
    assert_eq!(reader.join().unwrap(), Ok("hi".to_string()));
    assert_eq!(window.text(), "hi\n> ");
    assert!(window.validate_state().is_ok());
}

#[test]
fn test_abort_cancels_standard_input() {
    let (mut window, calls) = start_window();
    submit(&mut window, "input");
    wait_for_standard_input(&mut window);

    window.abort_command();
    assert_eq!(calls.lock().unwrap().aborts, 1);
    wait_for_input(&mut window);
    assert_eq!(
        window.text(),
        "> input\nstandard input request was cancelled\n> "
    );
    assert!(window.history().last().unwrap().failed());
}

#[test]
fn test_escape_clears_standard_input_only() {
    let (mut window, _) = start_window();
    submit(&mut window, "input");
    wait_for_standard_input(&mut window);
    window.type_text("oops").unwrap();
    window.cancel();
    assert_eq!(window.text(), "> input\n");
    assert_eq!(window.state(), ReplState::AwaitingStandardInput);

    window.type_text("ok").unwrap();
    window.return_key().unwrap();
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> input\nok\ngot ok\n> ");
}

#[test]
fn test_pasted_lines_answer_standard_input() {
    let (mut window, calls) = start_window();
    window.paste_text("input\nfirst\n1+1\n").unwrap();
    assert!(pump_until(&mut window, |window| {
        window.state() == ReplState::AcceptingInput && window.pending_input_count() == 0
    }));
    assert_eq!(
        window.text(),
        "> input\nfirst\ngot first\n> 1+1\n2\n> "
    );
    assert_eq!(calls.lock().unwrap().executed, vec!["input", "1+1"]);
}

#[test]
fn test_second_request_while_waiting_is_refused() {
    let (mut window, _) = start_window();
    let first = window.handle();
    let reader = thread::spawn(move || first.read_standard_input());
    wait_for_standard_input(&mut window);

    let second = window.handle();
    let refused = thread::spawn(move || second.read_standard_input());
    assert!(pump_until(&mut window, |_| refused.is_finished()));
    assert_eq!(refused.join().unwrap(), Err(ReplError::StandardInputBusy));

    window.type_text("x").unwrap();
    window.return_key().unwrap();
    assert_eq!(reader.join().unwrap(), Ok("x".to_string()));
}

#[test]
fn test_read_on_ui_thread_fails() {
    let (window, _) = start_window();
    assert_eq!(
        window.handle().read_standard_input(),
        Err(ReplError::BlockingCallOnUiThread)
    );
}

#[test]
fn test_completion_while_awaiting_standard_input() {
    let (mut window, calls) = start_window();
    submit(&mut window, "hold");
    let handle = window.handle();
    let reader = thread::spawn(move || handle.read_standard_input());
    wait_for_standard_input(&mut window);

    let completion = calls.lock().unwrap().held.take().unwrap();
    completion.complete(replwindow_core::ExecutionResult::FAILURE);
    window.pump();
    assert_eq!(window.state(), ReplState::AwaitingStandardInput);
    assert_eq!(window.text(), "> hold\n");
    assert!(window.history().last().unwrap().failed());

    window.type_text("hi").unwrap();
    window.return_key().unwrap();
    assert_eq!(reader.join().unwrap(), Ok("hi".to_string()));
    assert_eq!(window.state(), ReplState::AcceptingInput);
    assert_eq!(window.text(), "> hold\nhi\n> ");
    assert!(window.validate_state().is_ok());

    let entries = window.history().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].failed());
    assert!(!entries[1].failed());
}

#[test]
fn test_blank_answer_is_not_recorded() {
    let (mut window, _) = start_window();
    submit(&mut window, "input");
    wait_for_standard_input(&mut window);
    window.return_key().unwrap();
    wait_for_input(&mut window);
    assert_eq!(window.text(), "> input\n\ngot \n> ");
    assert_eq!(window.history().len(), 1);
}
