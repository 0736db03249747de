//! State carried across every policy decision of one delivery attempt.

use core::{
    fmt::{self, Display, Formatter},
    ops::{BitOr, BitOrAssign},
};

use crate::{
    config::{NotifyClass, PolicyConfig},
    request::{DeliveryRequest, SmtpSession},
};

/// Accumulated outcome of a delivery attempt.
///
/// Several recipients can fail independently within one policy call, so
/// bits are only ever OR-ed in. An empty status means every recipient
/// touched so far has a final outcome on record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttemptStatus(u8);

impl AttemptStatus {
    pub const OK: Self = Self(0);
    /// Some recipients were left for a later attempt or another exchanger.
    pub const INCOMPLETE: Self = Self(1 << 0);
    /// A defer or bounce log refused a record; the recipient stays pending.
    pub const LEDGER_FAILED: Self = Self(1 << 1);
    /// A record was logged but the queue file was not updated.
    pub const QUEUE_UPDATE_FAILED: Self = Self(1 << 2);

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for AttemptStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AttemptStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Display for AttemptStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return fmt.write_str("ok");
        }

        let names = [
            (Self::INCOMPLETE, "incomplete"),
            (Self::LEDGER_FAILED, "ledger-failed"),
            (Self::QUEUE_UPDATE_FAILED, "queue-update-failed"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    fmt.write_str("|")?;
                }
                fmt.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error classes seen during an attempt that may warrant a postmaster notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ErrorMask(u8);

impl ErrorMask {
    pub const NONE: Self = Self(0);
    /// The remote answered with a code that suggests a protocol mix-up.
    pub const PROTOCOL: Self = Self(1 << 0);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOrAssign for ErrorMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Mutable record threaded through every policy call of one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryState {
    status: AttemptStatus,
    final_server: bool,
    error_mask: ErrorMask,
}

impl DeliveryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(&self) -> AttemptStatus {
        self.status
    }

    /// OR `bits` into the attempt status. Bits are never cleared.
    pub fn add_status(&mut self, bits: AttemptStatus) {
        self.status |= bits;
    }

    /// Once set, no further exchanger is tried for this message and soft
    /// errors are treated as the last chance.
    #[must_use]
    pub const fn is_final_server(&self) -> bool {
        self.final_server
    }

    /// Raise the final server flag. There is no way to lower it again.
    pub const fn mark_final_server(&mut self) {
        self.final_server = true;
    }

    #[must_use]
    pub const fn error_mask(&self) -> ErrorMask {
        self.error_mask
    }

    pub fn flag_error(&mut self, class: ErrorMask) {
        self.error_mask |= class;
    }

    /// Should the postmaster receive a transcript of this attempt?
    #[must_use]
    pub fn notify_postmaster(&self, config: &PolicyConfig) -> bool {
        self.error_mask.contains(ErrorMask::PROTOCOL) && config.notifies(NotifyClass::Protocol)
    }
}

/// Everything one policy call needs: the request being delivered, the peer
/// (absent when no connection was ever made) and the attempt's state.
#[derive(Debug)]
pub struct DeliveryAttempt<'r> {
    pub request: &'r mut DeliveryRequest,
    pub session: Option<SmtpSession>,
    pub state: DeliveryState,
}

impl<'r> DeliveryAttempt<'r> {
    #[must_use]
    pub fn new(request: &'r mut DeliveryRequest) -> Self {
        Self {
            request,
            session: None,
            state: DeliveryState::new(),
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: SmtpSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Label of the current peer for log records, `none` without a session.
    #[must_use]
    pub fn session_label(&self) -> String {
        self.session
            .as_ref()
            .map_or_else(|| NO_SESSION_LABEL.to_string(), SmtpSession::label)
    }
}

pub(crate) const NO_SESSION_LABEL: &str = "none";
