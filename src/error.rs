//! Error types used by the arbitration engine and its handles.
//!
//! This module defines three error enums:
//!
//! - [`ArbiterError`]: invariant violations detected inside the arbitration loop.
//!   These indicate a bug in the engine itself and are never recoverable.
//! - [`SubmitError`]: failures to enqueue an event through an [`ArbiterHandle`](crate::ArbiterHandle).
//! - [`RuntimeError`]: errors returned by [`Engine::run`](crate::Engine::run).
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Invariant violations inside the arbitration loop.
///
/// The link activation count must always equal the number of admitted records.
/// Any of these errors means the count and the real-world link state can no
/// longer be trusted, so the engine halts instead of continuing.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    /// The link activation counter was decremented while already at zero.
    #[error("link activation count decremented below zero")]
    CounterUnderflow,

    /// The link activation counter disagrees with the number of admitted records.
    #[error("link activation count {count} does not match {admitted} admitted requests")]
    CountMismatch {
        /// Current counter value.
        count: usize,
        /// Number of records flagged as admitted.
        admitted: usize,
    },
}

impl ArbiterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use netarbiter::ArbiterError;
    ///
    /// assert_eq!(ArbiterError::CounterUnderflow.as_label(), "arbiter_counter_underflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ArbiterError::CounterUnderflow => "arbiter_counter_underflow",
            ArbiterError::CountMismatch { .. } => "arbiter_count_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ArbiterError::CounterUnderflow => "counter underflow".to_string(),
            ArbiterError::CountMismatch { count, admitted } => {
                format!("count mismatch: count={count} admitted={admitted}")
            }
        }
    }
}

/// # Errors produced when enqueueing events.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Event queue is full (try again later or use the async variant).
    #[error("event queue full")]
    Full,

    /// Engine loop is gone (stopped, halted, or never started and dropped).
    #[error("engine channel closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Full => "submit_full",
            SubmitError::Closed => "submit_closed",
        }
    }
}

/// # Errors produced by the engine runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The loop detected an invariant violation and halted.
    #[error("engine halted: {0}")]
    InvariantViolated(#[from] ArbiterError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use netarbiter::{ArbiterError, RuntimeError};
    ///
    /// let err = RuntimeError::from(ArbiterError::CounterUnderflow);
    /// assert_eq!(err.as_label(), "runtime_invariant_violated");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvariantViolated(_) => "runtime_invariant_violated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvariantViolated(e) => format!("halted: {}", e.as_message()),
        }
    }
}

/// Extracts a printable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            ArbiterError::CountMismatch { count: 2, admitted: 1 }.as_label(),
            "arbiter_count_mismatch"
        );
        assert_eq!(SubmitError::Full.as_label(), "submit_full");
        assert_eq!(SubmitError::Closed.as_label(), "submit_closed");
    }

    #[test]
    fn test_runtime_error_wraps_arbiter_error() {
        let err = RuntimeError::from(ArbiterError::CounterUnderflow);
        assert_eq!(err.to_string(), "engine halted: link activation count decremented below zero");
        assert_eq!(err.as_message(), "halted: counter underflow");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let p: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*p), "static");
        let p: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*p), "owned");
        let p: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*p), "unknown panic");
    }
}
