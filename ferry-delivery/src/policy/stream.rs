use core::fmt::{self, Display, Formatter};

use crate::error::PolicyError;

/// I/O trouble reported by the SMTP stream layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFault {
    /// The peer closed the connection or the read failed.
    Eof,
    /// The peer did not answer in time.
    Timeout,
}

impl StreamFault {
    /// Stream layer code for a lost connection.
    pub const EOF: i32 = 1;
    /// Stream layer code for a timeout.
    pub const TIME: i32 = 2;

    /// The reason recorded against every recipient this fault defers.
    #[must_use]
    pub fn reason(self, peer: &str, stage: &str) -> String {
        match self {
            Self::Eof => format!("lost connection with {peer} while {stage}"),
            Self::Timeout => format!("conversation with {peer} timed out while {stage}"),
        }
    }
}

impl TryFrom<i32> for StreamFault {
    type Error = PolicyError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            Self::EOF => Ok(Self::Eof),
            Self::TIME => Ok(Self::Timeout),
            other => Err(PolicyError::UnknownStreamFault(other)),
        }
    }
}

impl Display for StreamFault {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Eof => "EOF",
            Self::Timeout => "TIME",
        })
    }
}
