//! Infrastructure backends for the conformance engine.
//!
//! Provides the `EngineRunner` trait and implementations for a real
//! subprocess (production) and a scripted mock (testing). Output capture and
//! its locking live in `execution::capture`; runners only write into the sink
//! they are handed.

pub mod mock;
pub mod runner;

use std::io::Write;

use crate::error::CheckError;

/// Trait for engine backends.
pub trait EngineRunner: Send + Sync {
    /// Run the engine to completion with `args`, writing everything it prints
    /// on both output channels into `sink`. Returns the engine exit status.
    fn run(&self, args: &[String], sink: &mut dyn Write) -> Result<i32, CheckError>;
}
