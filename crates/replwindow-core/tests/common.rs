// Shared fixtures for the window integration tests: a scripted evaluator
// and helpers that drive a window through the UI task queue.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use replwindow_core::{
    ExecutionCompletion, ExecutionResult, ReplConfig, ReplEvaluator, ReplState, ReplWindow,
    WindowHandle,
};

/// What the evaluator was asked to do.
#[derive(Debug, Default)]
pub struct EvaluatorCalls {
    pub executed: Vec<String>,
    pub resets: usize,
    pub aborts: usize,
    /// Completion of the last `hold` submission, for the test to fire.
    pub held: Option<ExecutionCompletion>,
}

/// Evaluator with a handful of scripted behaviors.
///
/// * `a+b` with integer operands prints the sum.
/// * `fail` prints `boom` to the error stream and fails.
/// * `hang` never completes until aborted.
/// * `hold` hands its completion to the test through [`EvaluatorCalls::held`].
/// * `drop` drops its completion.
/// * `decline` refuses to start.
/// * `input` reads a line of standard input on a worker thread and prints it.
/// * anything else is echoed back.
///
/// Text with more `(` than `)` is incomplete.
pub struct ScriptedEvaluator {
    handle: Option<WindowHandle>,
    calls: Arc<Mutex<EvaluatorCalls>>,
    pending: Option<ExecutionCompletion>,
}

impl ScriptedEvaluator {
    pub fn new() -> (Self, Arc<Mutex<EvaluatorCalls>>) {
        let calls = Arc::new(Mutex::new(EvaluatorCalls::default()));
        let evaluator = Self {
            handle: None,
            calls: Arc::clone(&calls),
            pending: None,
        };
        (evaluator, calls)
    }
}

fn evaluate(code: &str) -> String {
    if let Some((a, b)) = code.split_once('+') {
        if let (Ok(a), Ok(b)) = (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
            return (a + b).to_string();
        }
    }
    code.to_string()
}

impl ReplEvaluator for ScriptedEvaluator {
    fn initialize(&mut self, window: WindowHandle) -> ExecutionResult {
        self.handle = Some(window);
        ExecutionResult::SUCCESS
    }

    fn can_execute_text(&self, text: &str) -> bool {
        text.matches('(').count() <= text.matches(')').count()
    }

    fn execute_text(&mut self, text: &str, completion: ExecutionCompletion) -> bool {
        self.calls
            .lock()
            .unwrap()
            .executed
            .push(text.trim_end().to_string());
        let Some(handle) = self.handle.clone() else {
            return false;
        };
        match text.trim() {
            "hang" => self.pending = Some(completion),
            "hold" => self.calls.lock().unwrap().held = Some(completion),
            "drop" => drop(completion),
            "decline" => return false,
            "fail" => {
                let _ = handle.write_error("boom\n");
                completion.complete(ExecutionResult::FAILURE);
            }
            "input" => {
                thread::spawn(move || match handle.read_standard_input() {
                    Ok(line) => {
                        let _ = handle.write_output(format!("got {line}\n"));
                        completion.complete(ExecutionResult::SUCCESS);
                    }
                    Err(err) => {
                        let _ = handle.write_error(format!("{err}\n"));
                        completion.complete(ExecutionResult::FAILURE);
                    }
                });
            }
            code => {
                let _ = handle.write_output(format!("{}\n", evaluate(code)));
                completion.complete(ExecutionResult::SUCCESS);
            }
        }
        true
    }

    fn reset(&mut self) -> ExecutionResult {
        self.calls.lock().unwrap().resets += 1;
        self.pending = None;
        ExecutionResult::SUCCESS
    }

    fn abort_command(&mut self) {
        self.calls.lock().unwrap().aborts += 1;
        if let Some(completion) = self.pending.take() {
            completion.complete(ExecutionResult::FAILURE);
        }
    }
}

/// Configuration with short, ASCII prompts.
pub fn test_config() -> ReplConfig {
    let mut config = ReplConfig::default();
    config.options.primary_prompt = "> ".to_string();
    config.options.secondary_prompt = "... ".to_string();
    config
}

pub fn start_window_with(config: ReplConfig) -> (ReplWindow, Arc<Mutex<EvaluatorCalls>>) {
    let (evaluator, calls) = ScriptedEvaluator::new();
    let mut window = ReplWindow::new("test", Box::new(evaluator), config).unwrap();
    assert!(window.start().success);
    (window, calls)
}

pub fn start_window() -> (ReplWindow, Arc<Mutex<EvaluatorCalls>>) {
    start_window_with(test_config())
}

/// Pumps the window until `done` holds, giving up after a few seconds.
pub fn pump_until(window: &mut ReplWindow, mut done: impl FnMut(&ReplWindow) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        window.pump_timeout(Duration::from_millis(10));
        if done(window) {
            return true;
        }
    }
    false
}

pub fn wait_for_input(window: &mut ReplWindow) {
    assert!(
        pump_until(window, |window| window.state() == ReplState::AcceptingInput),
        "window never returned to accepting input: {window:?}"
    );
}

/// Types a single line and presses Enter.
pub fn submit(window: &mut ReplWindow, line: &str) {
    window.type_text(line).unwrap();
    window.return_key().unwrap();
}

/// Submits a line and waits for its execution to finish.
pub fn run(window: &mut ReplWindow, line: &str) {
    submit(window, line);
    wait_for_input(window);
}
