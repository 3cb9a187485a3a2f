//! Settings loading — YAML file plus the `RDPT` base directory.
//!
//! The environment is read once, here, at startup. Everything downstream
//! receives the resolved `ServiceSettings` by value.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CheckError;
use crate::types::config::ServiceSettings;


/// Environment variable naming the engine's base directory.
pub const BASE_DIR_ENV: &str = "RDPT";


/// Load settings from `path` (or defaults when `None`) and resolve the base
/// directory against the process environment.
pub fn load(path: Option<&Path>) -> Result<ServiceSettings, CheckError> {
    load_with_env(path, std::env::var_os(BASE_DIR_ENV))
}


/// Same as `load`, with the `RDPT` value supplied by the caller.
pub fn load_with_env(
    path: Option<&Path>,
    env_base: Option<OsString>,
) -> Result<ServiceSettings, CheckError> {
    let mut settings = match path {
        Some(p) => read_file(p)?,
        None => ServiceSettings::default(),
    };
    if settings.base_dir.is_none() {
        settings.base_dir = env_base.filter(|v| !v.is_empty()).map(PathBuf::from);
    }
    if settings.base_dir.is_none() {
        return Err(CheckError::Config(format!(
            "{} is not set and no base_dir is configured",
            BASE_DIR_ENV
        )));
    }
    check_config_file_name(&settings.config_file_name)?;
    if settings.engine_program.trim().is_empty() {
        return Err(CheckError::Config("engine_program must not be empty".into()));
    }
    debug!(?settings, "settings resolved");
    Ok(settings)
}


fn read_file(path: &Path) -> Result<ServiceSettings, CheckError> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty file means "all defaults".
    if content.trim().is_empty() {
        return Ok(ServiceSettings::default());
    }
    serde_yaml::from_str(&content).map_err(|source| CheckError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })
}


/// `config_file_name` must stay under `base_dir`; an absolute name would
/// replace the base directory when joined.
fn check_config_file_name(name: &str) -> Result<(), CheckError> {
    if name.trim().is_empty() || Path::new(name).is_absolute() {
        return Err(CheckError::Config(format!(
            "config_file_name must be a relative path, got '{}'",
            name
        )));
    }
    Ok(())
}


/// Path of the engine configuration file: `<base_dir>/<config_file_name>`.
pub fn engine_config_path(settings: &ServiceSettings) -> Result<PathBuf, CheckError> {
    check_config_file_name(&settings.config_file_name)?;
    settings
        .base_dir
        .as_ref()
        .map(|base| base.join(&settings.config_file_name))
        .ok_or_else(|| CheckError::Config("base_dir is not resolved".into()))
}
