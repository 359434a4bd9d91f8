use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A raw SMTP reply, preserving the numeric status code and message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// What came out of the recipient probe. The probe never errors: every
/// failure mode is folded into one of these variants with its cause kept for
/// logging. A negative outcome is best-effort only — plenty of servers accept
/// everything or refuse the probe pattern outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Accepted { reply: SmtpReply },
    Rejected { reply: SmtpReply },
    TemporaryFailure { reply: SmtpReply },
    Unreachable { message: String },
    ProtocolError { message: String },
}

impl ProbeOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { reply } => write!(f, "accepted ({} {})", reply.code, reply.message),
            Self::Rejected { reply } => write!(f, "rejected ({} {})", reply.code, reply.message),
            Self::TemporaryFailure { reply } => {
                write!(f, "temporary failure ({} {})", reply.code, reply.message)
            }
            Self::Unreachable { message } => write!(f, "unreachable ({message})"),
            Self::ProtocolError { message } => write!(f, "protocol error ({message})"),
        }
    }
}

/// Controls the SMTP dialogue used by [`probe_recipient`](super::probe_recipient).
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Hostname announced in `HELO`; defaults to the sender's domain.
    pub helo_host: Option<String>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            helo_host: None,
        }
    }
}
