use std::path::PathBuf;

use serde::{Deserialize, Serialize};


/// Service settings, read from an optional YAML file.
///
/// `base_dir` falls back to the `RDPT` environment variable at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSettings {
    /// Directory holding the engine configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Engine configuration file name, relative to `base_dir`.
    pub config_file_name: String,
    /// Program launched for each check.
    pub engine_program: String,
    /// Arguments placed before the built argument vector (e.g. `-jar tool.jar`).
    pub engine_prefix_args: Vec<String>,
    /// Kill the engine after this many seconds. Unlimited when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_timeout_secs: Option<u64>,
    /// Listen address for the HTTP service.
    pub bind: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_dir: None,
            config_file_name: "rdapct-config.json".into(),
            engine_program: "rdap-conformance-tool".into(),
            engine_prefix_args: Vec::new(),
            engine_timeout_secs: None,
            bind: "127.0.0.1:8080".into(),
        }
    }
}
