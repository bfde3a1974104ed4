//! End-to-end tests for taskcheck
//!
//! Library-level scenarios drive the runner directly; CLI tests spawn the
//! built binary to check exit codes and output files.

pub mod cli;
pub mod fixtures;
pub mod helpers;
pub mod interrupt;
pub mod scenarios;

pub use fixtures::*;
pub use helpers::*;
