//! Cooperative cancellation shared by the runner, its workers and in-flight
//! commands.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Route Ctrl+C (and SIGTERM) into `token`.
///
/// The handler only flips the flag; the runner notices it between tasks,
/// kills any running command and flushes its checkpoint before returning.
pub fn install_interrupt_handler(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            // Second interrupt: the operator wants out now.
            std::process::exit(130);
        }
        token.cancel();
    })
    .context("Failed to set Ctrl+C handler")
}
