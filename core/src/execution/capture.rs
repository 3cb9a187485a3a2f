//! Captured engine runs.
//!
//! The capture channels are a process-wide resource: at most one engine run
//! holds them at a time, and a second caller blocks until the first
//! releases them. `CaptureGuard` scopes the hold so release happens on every
//! exit path, engine errors and panics included.

use std::borrow::Cow;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, error};

use crate::error::CheckError;
use crate::infrastructure::EngineRunner;


static CAPTURE_CHANNELS: Mutex<()> = Mutex::new(());


// ---------------------------------------------------------------------------
// CapturedOutput
// ---------------------------------------------------------------------------

/// Everything one engine run wrote to its output channels, plus its exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
    exit_code: i32,
}

impl CapturedOutput {
    pub fn new(bytes: Vec<u8>, exit_code: i32) -> Self {
        CapturedOutput { bytes, exit_code }
    }

    /// The transcript as text; invalid UTF-8 is replaced, not rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}


// ---------------------------------------------------------------------------
// CaptureGuard
// ---------------------------------------------------------------------------

/// Exclusive hold on the capture channels with the buffer they fill.
/// Dropping the guard releases the channels.
pub struct CaptureGuard {
    buffer: Vec<u8>,
    acquired_at: Instant,
    _held: MutexGuard<'static, ()>,
}

impl CaptureGuard {
    /// Block until the capture channels are free, then take them.
    pub fn acquire() -> CaptureGuard {
        // The lock guards no data, so a poisoned lock only means an earlier
        // run panicked while holding it.
        let held = CAPTURE_CHANNELS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("capture channels acquired");
        CaptureGuard {
            buffer: Vec::new(),
            acquired_at: Instant::now(),
            _held: held,
        }
    }

    /// The replacement channel the engine writes into.
    pub fn sink(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    /// Take the accumulated bytes, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        debug!(
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "capture channels released"
        );
    }
}


// ---------------------------------------------------------------------------
// run_captured
// ---------------------------------------------------------------------------

/// Run `engine` synchronously with its output captured.
///
/// Engine failures come back as `Err`; the channels are released before
/// this function returns either way.
pub fn run_captured(
    engine: &dyn EngineRunner,
    args: &[String],
) -> Result<CapturedOutput, CheckError> {
    let (status, bytes) = {
        let mut guard = CaptureGuard::acquire();
        let status = engine.run(args, guard.sink());
        (status, guard.take())
    };

    match status {
        Ok(exit_code) => Ok(CapturedOutput::new(bytes, exit_code)),
        Err(e) => {
            error!(error = %e, captured_bytes = bytes.len(), "engine run failed");
            for line in String::from_utf8_lossy(&bytes).lines() {
                debug!(target: "rdapct::engine", "{}", line);
            }
            Err(e)
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockEngine;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    struct PanickingEngine;

    impl EngineRunner for PanickingEngine {
        fn run(&self, _args: &[String], sink: &mut dyn Write) -> Result<i32, CheckError> {
            let _ = writeln!(sink, "about to fault");
            panic!("engine fault");
        }
    }

    #[test]
    fn captures_output_and_exit_code() {
        let engine = MockEngine::with_output(&["line one", "line two"]).exit_code(1);
        let captured = run_captured(&engine, &["-v".to_string()]).unwrap();
        assert_eq!(captured.text(), "line one\nline two\n");
        assert_eq!(captured.exit_code(), 1);
        assert_eq!(engine.invocations(), vec![vec!["-v".to_string()]]);
    }

    #[test]
    fn engine_failure_is_returned_not_raised() {
        let engine = MockEngine::failing("cannot load datasets");
        let err = run_captured(&engine, &[]).unwrap_err();
        assert!(matches!(err, CheckError::Engine(_)));
    }

    #[test]
    fn channels_released_after_failure() {
        let failing = MockEngine::failing("boom");
        assert!(run_captured(&failing, &[]).is_err());

        let engine = MockEngine::with_output(&["after"]);
        let captured = run_captured(&engine, &[]).unwrap();
        assert_eq!(captured.text(), "after\n");
    }

    #[test]
    fn channels_released_after_panic() {
        let result = std::panic::catch_unwind(|| run_captured(&PanickingEngine, &[]));
        assert!(result.is_err());

        let engine = MockEngine::with_output(&["still works"]);
        let captured = run_captured(&engine, &[]).unwrap();
        assert_eq!(captured.text(), "still works\n");
    }

    #[test]
    fn concurrent_runs_do_not_interleave() {
        let delay = Duration::from_millis(10);
        let a_lines = ["a-1", "a-2", "a-3", "a-4"];
        let b_lines = ["b-1", "b-2", "b-3", "b-4"];
        let engine_a = Arc::new(MockEngine::with_output(&a_lines).line_delay(delay));
        let engine_b = Arc::new(MockEngine::with_output(&b_lines).line_delay(delay));

        let handles: Vec<_> = [engine_a, engine_b]
            .into_iter()
            .map(|engine| std::thread::spawn(move || run_captured(engine.as_ref(), &[]).unwrap()))
            .collect();
        let outputs: Vec<CapturedOutput> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outputs[0].text(), "a-1\na-2\na-3\na-4\n");
        assert_eq!(outputs[1].text(), "b-1\nb-2\nb-3\nb-4\n");
    }

    #[test]
    fn second_caller_blocks_while_channels_held() {
        let guard = CaptureGuard::acquire();
        let started = Instant::now();
        let waiter = std::thread::spawn(move || {
            let engine = MockEngine::with_output(&["late"]);
            run_captured(&engine, &[]).unwrap();
            started.elapsed()
        });
        std::thread::sleep(Duration::from_millis(100));
        drop(guard);
        let waited = waiter.join().unwrap();
        assert!(waited >= Duration::from_millis(100));
    }
}
