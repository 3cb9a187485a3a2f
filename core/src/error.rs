use std::io;
use std::path::PathBuf;
use std::time::Duration;


/// Errors raised while configuring or driving the conformance engine.
///
/// None of these reach an HTTP caller directly: the check pipeline folds
/// engine failures into a `RunOutcome`, and configuration errors stop the
/// process before the service starts listening.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read settings {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("engine output capture failed: {0}")]
    Capture(#[source] io::Error),

    #[error("engine did not finish within {}ms", .limit.as_millis())]
    Timeout { limit: Duration },

    #[error("engine fault: {0}")]
    Engine(String),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
