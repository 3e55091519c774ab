//! Step progress reporting for the render pipeline.
//!
//! The pipeline reports each fetch and transform step through
//! [`ProgressCallback`] without knowing how it is shown. The CLI renders
//! an `indicatif` bar; the server and tests use [`LogProgress`] or
//! [`NullProgress`].

use std::sync::Arc;

/// Receives step-level progress from a long-running operation.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of steps.
    fn set_total(&self, total: u64);

    /// Advances by `delta` steps.
    fn inc(&self, delta: u64);

    /// Describes the step now running.
    fn set_message(&self, msg: String);

    /// Marks the operation complete.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Reports each step as a `log` line at debug level.
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        log::debug!("Starting {total} steps");
    }

    fn inc(&self, _delta: u64) {}

    fn set_message(&self, msg: String) {
        log::debug!("{msg}");
    }

    fn finish(&self, msg: String) {
        log::info!("{msg}");
    }
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Returns a shared [`LogProgress`].
#[must_use]
pub fn log_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(LogProgress)
}
