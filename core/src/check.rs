//! The check pipeline: validate → build args → captured run → scan → load.
//!
//! `Checker::check` is total: every request produces a `RunOutcome`. Option
//! conflicts short-circuit before the engine is touched, engine failures
//! become an error message, and unreadable artifacts become `"error"`.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::engine::args::build_args;
use crate::error::CheckError;
use crate::execution::capture::run_captured;
use crate::execution::output::scan;
use crate::infrastructure::runner::ProcessEngine;
use crate::infrastructure::EngineRunner;
use crate::loader::load_outcome;
use crate::settings::engine_config_path;
use crate::types::config::ServiceSettings;
use crate::types::request::{RunOutcome, RunRequest};
use crate::validate::validate;


/// Runs conformance checks against a fixed engine and config file.
pub struct Checker {
    config_path: PathBuf,
    engine: Box<dyn EngineRunner>,
}


impl Checker {
    /// Create a checker around an explicit engine backend.
    pub fn new(config_path: PathBuf, engine: Box<dyn EngineRunner>) -> Checker {
        Checker {
            config_path,
            engine,
        }
    }

    /// Create a checker that launches the engine program named in `settings`.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Checker, CheckError> {
        let config_path = engine_config_path(settings)?;
        if !config_path.exists() {
            warn!(path = %config_path.display(), "engine config file not found");
        }
        Ok(Checker::new(
            config_path,
            Box::new(ProcessEngine::from_settings(settings)),
        ))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Run one check. Blocks for the duration of the engine run.
    pub fn check(&self, request: &RunRequest) -> RunOutcome {
        info!(
            url = %request.url,
            gtld_registrar = request.gtld_registrar,
            gtld_registry = request.gtld_registry,
            thin = request.thin,
            "check received"
        );

        if let Err(conflict) = validate(request) {
            info!(%conflict, "rejected run options");
            return RunOutcome::bad_arguments();
        }

        let args = build_args(&self.config_path, request);
        debug!(?args, "engine arguments");

        let captured = match run_captured(self.engine.as_ref(), &args) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, url = %request.url, "engine run failed");
                return RunOutcome::new(format!("engine failed: {}", e));
            }
        };

        let report = scan(&captured);
        for line in &report.lines {
            debug!(target: "rdapct::engine", line = line.line_number, "{}", line.text);
        }
        info!(
            exit_code = captured.exit_code(),
            lines = report.lines.len(),
            results_path = ?report.results_path,
            "engine run finished"
        );

        load_outcome(report.results_path.as_deref())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
