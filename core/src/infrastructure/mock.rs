//! Mock engine backend for testing.
//!
//! Records every argument vector it is invoked with and writes a scripted
//! transcript into the capture sink, making it easy to write deterministic
//! tests for the check pipeline without a real engine installed.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use super::EngineRunner;
use crate::error::CheckError;


/// A test-double that replays pre-configured output lines.
#[derive(Debug, Default)]
pub struct MockEngine {
    /// Lines written to the sink, each followed by `\n`.
    lines: Vec<String>,
    exit_code: i32,
    /// When set, `run` fails with `CheckError::Engine` after writing the lines.
    failure: Option<String>,
    /// Pause after each line, for interleaving tests.
    line_delay: Option<Duration>,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that prints `lines` and exits 0.
    pub fn with_output(lines: &[&str]) -> Self {
        MockEngine {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Create a mock whose invocation fails with `message`.
    pub fn failing(message: &str) -> Self {
        MockEngine {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = Some(delay);
        self
    }

    /// Argument vectors received so far, in call order.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations().len()
    }
}

impl EngineRunner for MockEngine {
    fn run(&self, args: &[String], sink: &mut dyn Write) -> Result<i32, CheckError> {
        self.invocations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(args.to_vec());

        for line in &self.lines {
            writeln!(sink, "{}", line).map_err(CheckError::Capture)?;
            if let Some(delay) = self.line_delay {
                std::thread::sleep(delay);
            }
        }

        match &self.failure {
            Some(message) => Err(CheckError::Engine(message.clone())),
            None => Ok(self.exit_code),
        }
    }
}
