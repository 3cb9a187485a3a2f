//! Argument vector construction.
//!
//! The engine's own parser is order-sensitive: always-on flags first, then
//! the config file, the target URL, and finally the optional profile flags.

use std::path::Path;

use crate::types::request::RunRequest;


pub const USE_LOCAL_DATASETS: &str = "--use-local-datasets";
pub const VERBOSE: &str = "-v";
pub const PRINT_RESULTS_PATH: &str = "--print-results-path";
pub const CONFIG: &str = "-c";
pub const GTLD_REGISTRAR: &str = "--gtld-registrar";
pub const GTLD_REGISTRY: &str = "--gtld-registry";
pub const THIN: &str = "--thin";


/// Build the engine argument vector for `request`.
///
/// Pure and deterministic; validation has already happened.
pub fn build_args(config_path: &Path, request: &RunRequest) -> Vec<String> {
    let mut args = vec![
        USE_LOCAL_DATASETS.to_string(),
        VERBOSE.to_string(),
        PRINT_RESULTS_PATH.to_string(),
        CONFIG.to_string(),
        config_path.to_string_lossy().into_owned(),
        request.url.clone(),
    ];
    if request.gtld_registrar {
        args.push(GTLD_REGISTRAR.to_string());
    }
    if request.gtld_registry {
        args.push(GTLD_REGISTRY.to_string());
    }
    if request.thin {
        args.push(THIN.to_string());
    }
    args
}
