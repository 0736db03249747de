//! The message, recipients and remote peer a delivery attempt works on.

use std::{
    fmt::{self, Display, Formatter},
    ops::{BitOr, BitOrAssign},
    sync::Arc,
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

use crate::ledger::{Recipient, RecipientLedger};

/// Identifier of a queued message, stable for the message's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueId(Arc<str>);

impl QueueId {
    /// Generate a new unique queue identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Arc::from(ulid::Ulid::new().to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QueueId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for QueueId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Display for QueueId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Tracing requests attached to a delivery request and copied into every
/// status record, so the logs know whether a record belongs to an address
/// verification or a delivery report rather than a real delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceFlags(u8);

impl TraceFlags {
    pub const NONE: Self = Self(0);
    /// Address verification probe
    pub const VERIFY: Self = Self(1 << 0);
    /// Address expansion probe
    pub const EXPAND: Self = Self(1 << 1);
    /// Record the outcome for a delivery report
    pub const RECORD: Self = Self(1 << 2);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TraceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TraceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The remote exchanger currently being talked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSession {
    /// Host name of the exchanger
    pub host: String,
    /// Address the connection was made to
    pub address: String,
}

impl SmtpSession {
    #[must_use]
    pub fn new(host: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            address: address.into(),
        }
    }

    /// `host[address]`, as it appears in log records
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}[{}]", self.host, self.address)
    }
}

/// One queued message handed to the SMTP client for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub queue_id: QueueId,
    /// When the message entered the queue
    pub arrival_time: SystemTime,
    pub trace_flags: TraceFlags,
    pub recipients: RecipientLedger,
    hop_status: Option<String>,
}

impl DeliveryRequest {
    #[must_use]
    pub fn new(
        queue_id: impl Into<QueueId>,
        arrival_time: SystemTime,
        recipients: impl IntoIterator<Item = Recipient>,
    ) -> Self {
        Self {
            queue_id: queue_id.into(),
            arrival_time,
            trace_flags: TraceFlags::NONE,
            recipients: recipients.into_iter().collect(),
            hop_status: None,
        }
    }

    #[must_use]
    pub fn with_trace_flags(mut self, trace_flags: TraceFlags) -> Self {
        self.trace_flags = trace_flags;
        self
    }

    /// The first deferral reason recorded for this hop, if any.
    #[must_use]
    pub fn hop_status(&self) -> Option<&str> {
        self.hop_status.as_deref()
    }

    /// Record `reason` as the hop status unless one is already set.
    ///
    /// Returns `true` when this call set it.
    pub fn latch_hop_status(&mut self, reason: &str) -> bool {
        if self.hop_status.is_some() {
            return false;
        }

        self.hop_status = Some(reason.to_string());
        true
    }
}
