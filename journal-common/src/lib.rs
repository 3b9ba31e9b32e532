//! Common types shared across the journal crates.
//!
//! This crate provides the time units used by the native boundary and the
//! core reader, avoiding code duplication and circular dependencies.

pub mod period;
pub mod time;

pub use period::Period;
pub use time::Microseconds;
