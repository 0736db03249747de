//! Failure policy for outbound SMTP delivery
//!
//! This crate decides, for every kind of trouble an SMTP client meets, what
//! happens to the recipients of the message being delivered:
//! - Classify reply codes into soft, hard and anomalous answers
//! - Defer or bounce recipients through the defer and bounce logs
//! - Keep track of which recipients already have a final outcome
//! - Decide when no further exchanger should be tried

pub mod backends;
pub mod classify;
pub mod config;
mod error;
pub mod ledger;
pub mod policy;
pub mod recorder;
pub mod request;
pub mod state;

pub use classify::{Disposition, Severity, classify, is_anomalous};
pub use config::{NotifyClass, PolicyConfig};
pub use error::{DeliveryError, LogError, PolicyError, QueueError};
pub use ledger::{Recipient, RecipientLedger, RecipientState};
pub use policy::{AttemptOver, FailurePolicy, StreamFault};
pub use recorder::{OutcomeRecorder, QueueTracker, StatusLog, StatusRecord};
pub use request::{DeliveryRequest, QueueId, SmtpSession, TraceFlags};
pub use state::{AttemptStatus, DeliveryAttempt, DeliveryState, ErrorMask};
