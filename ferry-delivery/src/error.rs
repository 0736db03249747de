//! Typed error handling for delivery failure policy.
//!
//! This module distinguishes between:
//! - Ledger failures (the defer or bounce log could not take a record)
//! - Queue failures (a disposed recipient could not be marked in the queue file)
//! - Policy errors (a caller broke the engine's contract)
//!
//! Ledger and queue failures never reach the caller of the policy engine;
//! they are folded into the attempt status so the message is retried.

use std::io;

use thiserror::Error;

/// Failures recording an outcome for a recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Appending to a defer or bounce log failed.
    #[error("Status log error: {0}")]
    Log(#[from] LogError),

    /// Updating the queue file failed.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Failures appending a record to a defer or bounce log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The logging service could not be reached.
    #[error("Log service unavailable: {0}")]
    Unavailable(String),

    /// The logging service refused the record.
    #[error("Record rejected: {0}")]
    Rejected(String),

    /// I/O error while writing the record.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures marking a recipient as done in the queue file.
#[derive(Debug, Error)]
pub enum QueueError {
    /// No recipient record exists at the given queue-file offset.
    #[error("No recipient record at offset {0}")]
    NotFound(u64),

    /// I/O error while updating the queue file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Contract violations by the caller of the policy engine.
///
/// These indicate a bug in the SMTP client, not a problem with the remote
/// exchanger, and must not be mapped onto a delivery outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A policy that reports the remote peer was called without a session.
    #[error("No SMTP session is established")]
    NoSession,

    /// The recipient index is outside the request's recipient list.
    #[error("No recipient at index {0}")]
    UnknownRecipient(usize),

    /// The stream layer reported an exception kind this engine does not know.
    #[error("Unknown stream exception {0}")]
    UnknownStreamFault(i32),
}

impl PolicyError {
    /// Returns `true` for errors the caller must treat as fatal: there is
    /// no delivery outcome that could be recorded for them.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownStreamFault(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DeliveryError::from(LogError::Unavailable("defer service down".to_string()));
        assert_eq!(
            error.to_string(),
            "Status log error: Log service unavailable: defer service down"
        );

        let error = DeliveryError::from(QueueError::NotFound(1024));
        assert_eq!(
            error.to_string(),
            "Queue error: No recipient record at offset 1024"
        );

        assert_eq!(
            PolicyError::UnknownStreamFault(7).to_string(),
            "Unknown stream exception 7"
        );
    }

    #[test]
    fn test_fatal_policy_errors() {
        assert!(PolicyError::UnknownStreamFault(0).is_fatal());
        assert!(!PolicyError::NoSession.is_fatal());
        assert!(!PolicyError::UnknownRecipient(3).is_fatal());
    }

    #[test]
    fn test_io_source_chain() {
        use std::error::Error as _;

        let error = LogError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "I/O error: pipe closed");
    }
}
