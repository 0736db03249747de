//! Classification of SMTP reply codes for delivery policy.

use core::fmt::{self, Display, Formatter};

use ferry_common::Status;

/// How serious a reply code is, judged by its first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// 4xx: try again later.
    Soft,
    /// 5xx: give up on the address.
    Hard,
    /// Anything else where a failure was expected.
    Other,
}

/// What happens to a recipient once a policy decides to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Record a temporary failure in the defer log.
    Defer,
    /// Record a permanent failure in the bounce log.
    Bounce,
}

impl Severity {
    /// Returns `true` for 4xx codes.
    #[must_use]
    pub const fn is_soft(self) -> bool {
        matches!(self, Self::Soft)
    }

    /// Only 4xx codes are deferred. A code outside 4xx and 5xx where a
    /// failure was expected is as final as a 5xx.
    #[must_use]
    pub const fn disposition(self) -> Disposition {
        match self {
            Self::Soft => Disposition::Defer,
            Self::Hard | Self::Other => Disposition::Bounce,
        }
    }
}

impl Display for Disposition {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Defer => "deferred",
            Self::Bounce => "bounced",
        })
    }
}

impl From<Status> for Severity {
    fn from(status: Status) -> Self {
        classify(status.into())
    }
}

/// Classify a reply code by its hundreds digit.
#[must_use]
pub const fn classify(code: u32) -> Severity {
    match code / 100 {
        4 => Severity::Soft,
        5 => Severity::Hard,
        _ => Severity::Other,
    }
}

/// Returns `true` when `code` suggests the two ends misunderstood each
/// other at the protocol level.
///
/// RFC 5321 reserves x0z replies for syntax errors and unimplemented
/// commands, and 555 is the RFC 1869 answer to unrecognised MAIL/RCPT
/// parameters. Remote sites configure such codes by hand for policy
/// rejections too, so this only raises a flag for the postmaster and never
/// changes what happens to the recipients.
#[must_use]
pub const fn is_anomalous(code: u32) -> bool {
    matches!(classify(code), Severity::Other) || code == 555 || (code >= 500 && code < 510)
}
