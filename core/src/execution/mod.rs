//! Engine execution — captured runs and output scanning.
//!
//! `capture` owns the process-wide capture lock and turns one engine run
//! into a `CapturedOutput`. `output` reads that transcript and finds the
//! results path the engine announced.

pub mod capture;
pub mod output;
