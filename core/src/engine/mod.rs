//! Engine invocation contract — the argument vector the external engine expects.

pub mod args;
