//! Error types for the countdown engine

/// Failures surfaced by timer operations that need to arm an expiry
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimerError {
    /// No tokio runtime was captured at construction and none is reachable
    /// from the calling thread, so the expiry callback cannot be scheduled.
    #[error("no tokio runtime available to schedule the expiry callback")]
    NoRuntime,

    /// The runtime the expiry was handed to has shut down and will never run it.
    #[error("tokio runtime has shut down, expiry callback would never fire")]
    RuntimeShutdown,
}
