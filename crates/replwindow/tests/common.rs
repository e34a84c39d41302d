// Shared fixtures for the host crate's scenario tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use replwindow::prelude::*;

/// Adds `a+b`, echoes anything else and counts resets.
pub struct Adder {
    handle: Option<WindowHandle>,
    resets: Arc<Mutex<usize>>,
}

impl Adder {
    pub fn new() -> (Self, Arc<Mutex<usize>>) {
        let resets = Arc::new(Mutex::new(0));
        let adder = Self {
            handle: None,
            resets: Arc::clone(&resets),
        };
        (adder, resets)
    }
}

impl ReplEvaluator for Adder {
    fn initialize(&mut self, window: WindowHandle) -> ExecutionResult {
        self.handle = Some(window);
        ExecutionResult::SUCCESS
    }

    fn can_execute_text(&self, text: &str) -> bool {
        text.matches('(').count() <= text.matches(')').count()
    }

    fn execute_text(&mut self, text: &str, completion: ExecutionCompletion) -> bool {
        let Some(handle) = self.handle.clone() else {
            return false;
        };
        let code = text.trim();
        let output = match code.split_once('+') {
            Some((a, b)) => match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
                (Ok(a), Ok(b)) => (a + b).to_string(),
                _ => code.to_string(),
            },
            None => code.to_string(),
        };
        let _ = handle.write_output(format!("{output}\n"));
        completion.complete(ExecutionResult::SUCCESS);
        true
    }

    fn reset(&mut self) -> ExecutionResult {
        *self.resets.lock().unwrap() += 1;
        ExecutionResult::SUCCESS
    }

    fn abort_command(&mut self) {}
}

pub fn builder() -> ReplWindowBuilder {
    ReplWindowBuilder::new()
        .with_title("scenario")
        .with_prompt("> ")
        .with_secondary_prompt("... ")
}

pub fn start(builder: ReplWindowBuilder) -> (ReplWindow, Arc<Mutex<usize>>) {
    let (adder, resets) = Adder::new();
    let mut window = builder.build(adder).unwrap();
    assert!(window.start().success);
    (window, resets)
}

pub fn wait_for_input(window: &mut ReplWindow) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        window.pump_timeout(Duration::from_millis(10));
        if window.state() == ReplState::AcceptingInput {
            return;
        }
    }
    panic!("window never returned to accepting input: {:?}", window.text());
}

/// Types a line, presses Enter and waits for the submission to finish.
pub fn run(window: &mut ReplWindow, line: &str) {
    window.type_text(line).unwrap();
    window.return_key().unwrap();
    wait_for_input(window);
}

/// One line per span: its kind and its text.
pub fn render(window: &ReplWindow) -> String {
    window
        .composed_spans()
        .iter()
        .map(|(kind, text)| format!("{kind:?}: {text:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}
