//! Plain data types shared across the check pipeline.

pub mod config;
pub mod request;
