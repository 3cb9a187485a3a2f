//! Subprocess engine backend.
//!
//! `ProcessEngine` launches the engine program with stdout and stderr both
//! attached to the write end of a single pipe, so the captured stream keeps
//! the engine's own interleaving. The host process's stdio is never touched.
//!
//! Each engine runs as the leader of its own process group, so a timeout can
//! take down wrapper scripts together with everything they started.

use std::fs::File;
use std::io::{self, Write};
use std::os::unix::io::FromRawFd;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::EngineRunner;
use crate::error::CheckError;
use crate::types::config::ServiceSettings;


const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TERM_GRACE: Duration = Duration::from_millis(500);

/// Serializes pipe creation and spawning within this process.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());


/// Production runner that spawns `<program> <prefix_args..> <args..>`.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    prefix_args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessEngine {
    pub fn new(program: &str, prefix_args: Vec<String>, timeout: Option<Duration>) -> Self {
        ProcessEngine {
            program: program.to_string(),
            prefix_args,
            timeout,
        }
    }

    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self::new(
            &settings.engine_program,
            settings.engine_prefix_args.clone(),
            settings.engine_timeout_secs.map(Duration::from_secs),
        )
    }

    fn spawn(&self, args: &[String], writer: File) -> Result<Child, CheckError> {
        let writer_err = writer.try_clone().map_err(CheckError::Capture)?;
        // The Command owns both write ends; it must be dropped right after
        // spawning so the reader sees EOF once the engine exits.
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(writer))
            .stderr(Stdio::from(writer_err))
            .process_group(0);
        cmd.spawn().map_err(|source| CheckError::Spawn {
            program: self.program.clone(),
            source,
        })
    }
}

impl EngineRunner for ProcessEngine {
    fn run(&self, args: &[String], sink: &mut dyn Write) -> Result<i32, CheckError> {
        let (mut reader, child) = {
            let _spawning = SPAWN_LOCK
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let (reader, writer) = capture_pipe().map_err(CheckError::Capture)?;
            (reader, self.spawn(args, writer)?)
        };
        debug!(pid = child.id(), program = %self.program, "engine started");

        let timeout = self.timeout;
        let waiter = std::thread::spawn(move || wait_for(child, timeout));

        let copied = io::copy(&mut reader, sink);
        drop(reader);

        let status = waiter
            .join()
            .unwrap_or_else(|_| Err(CheckError::Engine("engine wait thread panicked".into())))?;
        copied.map_err(CheckError::Capture)?;
        Ok(status)
    }
}


/// Create a pipe whose ends are closed on exec.
///
/// The flag is set atomically so an engine spawned concurrently on another
/// thread cannot inherit the write end and hold the reader open.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
))]
fn capture_pipe() -> io::Result<(File, File)> {
    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let reader = unsafe { File::from_raw_fd(fds[0]) };
    let writer = unsafe { File::from_raw_fd(fds[1]) };
    Ok((reader, writer))
}


/// Create a pipe whose ends are closed on exec.
///
/// No `pipe2` here; callers hold `SPAWN_LOCK` so none of our own spawns can
/// fork between `pipe` and `fcntl`.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
fn capture_pipe() -> io::Result<(File, File)> {
    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // Take ownership first so both ends are closed on any early return.
    let reader = unsafe { File::from_raw_fd(fds[0]) };
    let writer = unsafe { File::from_raw_fd(fds[1]) };
    for fd in fds {
        if unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) } != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok((reader, writer))
}


/// Wait for the engine, enforcing `timeout` when set.
fn wait_for(mut child: Child, timeout: Option<Duration>) -> Result<i32, CheckError> {
    let limit = match timeout {
        Some(limit) => limit,
        None => return child.wait().map(exit_code).map_err(CheckError::Capture),
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().map_err(CheckError::Capture)? {
            return Ok(exit_code(status));
        }
        if Instant::now() >= deadline {
            warn!(
                pid = child.id(),
                limit_ms = limit.as_millis() as u64,
                "engine timed out, terminating its process group"
            );
            terminate(&mut child);
            return Err(CheckError::Timeout { limit });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}


/// SIGTERM to the engine's process group, a short grace period, then
/// SIGKILL to whatever is left of the group.
fn terminate(child: &mut Child) {
    let group = -(child.id() as libc::pid_t);
    unsafe {
        libc::kill(group, libc::SIGTERM);
    }
    let deadline = Instant::now() + TERM_GRACE;
    while Instant::now() < deadline {
        if let Ok(Some(_)) = child.try_wait() {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    // Descendants may outlive the leader and still hold the capture pipe.
    unsafe {
        libc::kill(group, libc::SIGKILL);
    }
    let _ = child.wait();
}


/// Exit code, or `128 + signal` when the engine was killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}


#[cfg(test)]
mod tests {
    use super::*;

    /// `sh -c <script> engine <args..>` — the script sees the built args as `$@`.
    fn shell_engine(script: &str, timeout: Option<Duration>) -> ProcessEngine {
        ProcessEngine::new(
            "/bin/sh",
            vec!["-c".into(), script.into(), "engine".into()],
            timeout,
        )
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let engine = shell_engine("echo out; echo err 1>&2", None);
        let mut sink = Vec::new();
        let status = engine.run(&[], &mut sink).unwrap();
        assert_eq!(status, 0);
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("out\n"));
        assert!(text.contains("err\n"));
    }

    #[test]
    fn passes_args_in_order() {
        let engine = shell_engine(r#"printf '%s|' "$@""#, None);
        let mut sink = Vec::new();
        let args = vec!["-v".to_string(), "https://rdap.example".to_string()];
        engine.run(&args, &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "-v|https://rdap.example|");
    }

    #[test]
    fn reports_nonzero_exit() {
        let engine = shell_engine("echo failing; exit 3", None);
        let mut sink = Vec::new();
        assert_eq!(engine.run(&[], &mut sink).unwrap(), 3);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let engine = ProcessEngine::new("/nonexistent/rdap-conformance-tool", Vec::new(), None);
        let mut sink = Vec::new();
        let err = engine.run(&[], &mut sink).unwrap_err();
        assert!(matches!(err, CheckError::Spawn { .. }));
    }

    #[test]
    fn timeout_terminates_engine() {
        let engine = shell_engine("echo started; exec sleep 30", Some(Duration::from_millis(200)));
        let mut sink = Vec::new();
        let started = Instant::now();
        let err = engine.run(&[], &mut sink).unwrap_err();
        assert!(matches!(err, CheckError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timeout_stops_wrapper_script_children() {
        // No exec: `sleep` is a grandchild that also holds the capture pipe.
        let engine = shell_engine("echo started; sleep 5; echo done", Some(Duration::from_millis(200)));
        let mut sink = Vec::new();
        let started = Instant::now();
        let err = engine.run(&[], &mut sink).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
        assert_eq!(err.to_string(), "engine did not finish within 200ms");
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("started"));
        assert!(!text.contains("done"));
    }

    #[test]
    fn parallel_runs_each_see_eof() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let engine = shell_engine(&format!("echo run-{}", i), Some(Duration::from_secs(5)));
                    let mut sink = Vec::new();
                    let started = Instant::now();
                    engine.run(&[], &mut sink).unwrap();
                    (String::from_utf8(sink).unwrap(), started.elapsed())
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let (text, elapsed) = handle.join().unwrap();
            assert_eq!(text, format!("run-{}\n", i));
            assert!(elapsed < Duration::from_secs(2));
        }
    }

    #[test]
    fn from_settings_copies_engine_fields() {
        let settings = ServiceSettings {
            engine_program: "java".into(),
            engine_prefix_args: vec!["-jar".into(), "tool.jar".into()],
            engine_timeout_secs: Some(5),
            ..ServiceSettings::default()
        };
        let engine = ProcessEngine::from_settings(&settings);
        assert_eq!(engine.program, "java");
        assert_eq!(engine.prefix_args, vec!["-jar", "tool.jar"]);
        assert_eq!(engine.timeout, Some(Duration::from_secs(5)));
    }
}
