//! Result loading — turns the announced results path into a `RunOutcome`.

use std::path::Path;

use tracing::{info, warn};

use crate::types::request::RunOutcome;


/// Build the outcome for an optional results path.
///
/// - no path: `"ok"`
/// - readable file: its full content, unchanged
/// - unreadable file: `"error"` (the cause is logged, not returned)
pub fn load_outcome(results_path: Option<&Path>) -> RunOutcome {
    let path = match results_path {
        Some(p) => p,
        None => {
            info!("engine announced no results path");
            return RunOutcome::ok();
        }
    };

    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), bytes = bytes.len(), "results loaded");
            RunOutcome::new(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "results file unreadable");
            RunOutcome::error()
        }
    }
}
