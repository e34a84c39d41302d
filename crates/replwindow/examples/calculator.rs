//! A calculator REPL driven over stdin/stdout.
//!
//! Each stdin line is pasted into the window as if typed; the window's text
//! is echoed to stdout as it grows. Try `1 + 2 * 3`, `let x = (4 +`
//! followed by `5)`, `%help`, `%echo off` or `input` (which asks for a line
//! of standard input from a worker thread).
//!
//! Run with: cargo run --example calculator

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use replwindow::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("division by zero")]
    DivisionByZero,
}

type CalcResult<T> = Result<T, CalcError>;

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    variables: &'a HashMap<String, i64>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, variables: &'a HashMap<String, i64>) -> Self {
        Self {
            chars: text.chars().peekable(),
            variables,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn expression(&mut self) -> CalcResult<i64> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> CalcResult<i64> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    let divisor = self.factor()?;
                    value = value.checked_div(divisor).ok_or(CalcError::DivisionByZero)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> CalcResult<i64> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some('(') => {
                self.chars.next();
                let value = self.expression()?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some(')') => Ok(value),
                    Some(c) => Err(CalcError::UnexpectedChar(c)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some(c) if c.is_ascii_digit() => {
                let mut value = 0i64;
                while let Some(digit) = self.chars.next_if(char::is_ascii_digit) {
                    value = value * 10 + i64::from(digit as u8 - b'0');
                }
                Ok(value)
            }
            Some(c) if c.is_alphabetic() => {
                let name = self.identifier();
                self.variables
                    .get(&name)
                    .copied()
                    .ok_or(CalcError::UnknownVariable(name))
            }
            Some(c) => Err(CalcError::UnexpectedChar(c)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            name.push(c);
        }
        name
    }

    fn finish(mut self, value: i64) -> CalcResult<i64> {
        self.skip_whitespace();
        match self.chars.next() {
            Some(c) => Err(CalcError::UnexpectedChar(c)),
            None => Ok(value),
        }
    }
}

#[derive(Default)]
struct Calculator {
    window: Option<WindowHandle>,
    variables: HashMap<String, i64>,
}

impl Calculator {
    fn evaluate(&mut self, text: &str) -> CalcResult<i64> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix("let ") {
            let (name, expression) = rest.split_once('=').ok_or(CalcError::UnexpectedEnd)?;
            let mut parser = Parser::new(expression, &self.variables);
            let value = parser.expression()?;
            let value = parser.finish(value)?;
            self.variables.insert(name.trim().to_string(), value);
            return Ok(value);
        }
        let mut parser = Parser::new(text, &self.variables);
        let value = parser.expression()?;
        parser.finish(value)
    }
}

impl ReplEvaluator for Calculator {
    fn initialize(&mut self, window: WindowHandle) -> ExecutionResult {
        let _ = window.write_line("Calculator ready. Type %help for commands.");
        self.window = Some(window);
        ExecutionResult::SUCCESS
    }

    fn can_execute_text(&self, text: &str) -> bool {
        text.matches('(').count() <= text.matches(')').count()
    }

    fn execute_text(&mut self, text: &str, completion: ExecutionCompletion) -> bool {
        let Some(window) = self.window.clone() else {
            return false;
        };
        if text.trim() == "input" {
            thread::spawn(move || match window.read_standard_input() {
                Ok(line) => {
                    let _ = window.write_output(format!("you said {line:?}\n"));
                    completion.complete(ExecutionResult::SUCCESS);
                }
                Err(err) => {
                    let _ = window.write_error(format!("{err}\n"));
                    completion.complete(ExecutionResult::FAILURE);
                }
            });
            return true;
        }
        let result = match self.evaluate(text) {
            Ok(value) => {
                let _ = window.write_output(format!("{value}\n"));
                ExecutionResult::SUCCESS
            }
            Err(err) => {
                let _ = window.write_error(format!("error: {err}\n"));
                ExecutionResult::FAILURE
            }
        };
        completion.complete(result);
        true
    }

    fn reset(&mut self) -> ExecutionResult {
        self.variables.clear();
        ExecutionResult::SUCCESS
    }

    fn abort_command(&mut self) {}
}

fn settle(window: &mut ReplWindow) {
    while window.state() == ReplState::Running {
        window.pump_timeout(Duration::from_millis(20));
    }
    window.pump();
}

fn show(window: &ReplWindow, shown: &mut String, out: &mut impl Write) -> io::Result<()> {
    let text = window.text();
    match text.strip_prefix(shown.as_str()) {
        Some(new) => write!(out, "{new}")?,
        None => write!(out, "\n{text}")?,
    }
    out.flush()?;
    *shown = text.to_string();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut window = ReplWindowBuilder::new()
        .with_title("Calculator")
        .with_prompt("calc> ")
        .with_secondary_prompt("...   ")
        .with_standard_input_prompt("? ")
        .build(Calculator::default())?;
    window.start();
    settle(&mut window);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut shown = String::new();
    show(&window, &mut shown, &mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        // The terminal already echoed the line.
        shown.push_str(&line);
        shown.push('\n');
        window.paste_text(&format!("{line}\n"))?;
        settle(&mut window);
        show(&window, &mut shown, &mut out)?;
    }
    writeln!(out)?;
    Ok(())
}
