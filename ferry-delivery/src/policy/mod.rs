//! Handling of SMTP delivery trouble
//!
//! The four entry points on [`FailurePolicy`] cover the scopes trouble can
//! have: the exchanger as a whole, the message, a single recipient, and the
//! connection itself.

mod stream;
mod trouble;

pub use stream::StreamFault;
pub use trouble::FailurePolicy;

/// Returned by policy calls that end the attempt via the current exchanger.
#[must_use = "the attempt via this exchanger is over and must not continue"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOver;
