//! rdapct-core — drives the external RDAP conformance engine and relays its report.
//!
//! A check flows strictly forward through five stages:
//!
//! 1. `validate` — reject contradictory run options
//! 2. `engine::args` — build the engine argument vector
//! 3. `execution::capture` — run the engine with its output captured
//! 4. `execution::output` — find the announced results path
//! 5. `loader` — turn the artifact (or its absence) into a `RunOutcome`
//!
//! `check::Checker` wires the stages together; `service` exposes it over HTTP.

pub mod check;
pub mod engine;
pub mod error;
pub mod execution;
pub mod infrastructure;
pub mod loader;
pub mod service;
pub mod settings;
pub mod types;
pub mod validate;

pub use check::Checker;
pub use error::CheckError;
pub use types::request::{CheckParams, RunOutcome, RunRequest};
