use core::fmt::{self, Display, Formatter};

/// SMTP reply codes seen by the outbound client.
///
/// Codes without a named variant are carried in [`Status::Unknown`] so that
/// nothing a remote server sends is lost on the way to the delivery policy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Debug)]
pub enum Status {
    ServiceReady,
    GoodBye,
    Ok,
    StartMailInput,
    Unavailable,
    MailboxBusy,
    ActionUnavailable,
    InsufficientStorage,
    SyntaxError,
    ParameterSyntaxError,
    NotImplemented,
    InvalidCommandSequence,
    ParameterNotImplemented,
    Error,
    UserNotLocal,
    ExceededStorage,
    MailboxNameInvalid,
    TransactionFailed,
    ParametersNotRecognised,
    Unknown(u32),
}

impl Status {
    /// Checks if the status is a permanent rejection
    #[must_use]
    pub fn is_permanent(self) -> bool {
        u32::from(self) / 100 == 5
    }

    /// Checks if the status is a temporary rejection
    #[must_use]
    pub fn is_temporary(self) -> bool {
        u32::from(self) / 100 == 4
    }
}

impl From<u32> for Status {
    fn from(value: u32) -> Self {
        match value {
            220 => Self::ServiceReady,
            221 => Self::GoodBye,
            250 => Self::Ok,
            354 => Self::StartMailInput,
            421 => Self::Unavailable,
            450 => Self::MailboxBusy,
            451 => Self::ActionUnavailable,
            452 => Self::InsufficientStorage,
            500 => Self::SyntaxError,
            501 => Self::ParameterSyntaxError,
            502 => Self::NotImplemented,
            503 => Self::InvalidCommandSequence,
            504 => Self::ParameterNotImplemented,
            550 => Self::Error,
            551 => Self::UserNotLocal,
            552 => Self::ExceededStorage,
            553 => Self::MailboxNameInvalid,
            554 => Self::TransactionFailed,
            555 => Self::ParametersNotRecognised,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Status> for u32 {
    fn from(value: Status) -> Self {
        match value {
            Status::ServiceReady => 220,
            Status::GoodBye => 221,
            Status::Ok => 250,
            Status::StartMailInput => 354,
            Status::Unavailable => 421,
            Status::MailboxBusy => 450,
            Status::ActionUnavailable => 451,
            Status::InsufficientStorage => 452,
            Status::SyntaxError => 500,
            Status::ParameterSyntaxError => 501,
            Status::NotImplemented => 502,
            Status::InvalidCommandSequence => 503,
            Status::ParameterNotImplemented => 504,
            Status::Error => 550,
            Status::UserNotLocal => 551,
            Status::ExceededStorage => 552,
            Status::MailboxNameInvalid => 553,
            Status::TransactionFailed => 554,
            Status::ParametersNotRecognised => 555,
            Status::Unknown(v) => v,
        }
    }
}

impl Display for Status {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(fmt, "{}", u32::from(*self))
    }
}
