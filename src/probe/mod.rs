//! Best-effort SMTP recipient probe.
//!
//! [`probe_recipient`] opens a plain connection to the preferred mail
//! exchanger, runs a minimal `HELO`/`MAIL FROM`/`RCPT TO` dialogue without
//! sending any message body, and folds every failure mode into a
//! [`ProbeOutcome`]. A 250-class `RCPT TO` reply counts as acceptance.

mod session;
mod types;

pub use types::{ProbeOptions, ProbeOutcome, SmtpReply};

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use tracing::debug;

use crate::mx::MxRecord;
use crate::syntax;
use session::SmtpSession;
use types::ProbeOutcome::{Accepted, ProtocolError, Rejected, TemporaryFailure, Unreachable};

/// Asks the primary exchanger in `records` whether it would accept `address`.
///
/// `sender` is the envelope used for `MAIL FROM`. The function never errors;
/// connect failures, timeouts, and malformed replies all map to a
/// non-accepted [`ProbeOutcome`] carrying the cause.
pub fn probe_recipient(
    address: &str,
    sender: &str,
    records: &[MxRecord],
    options: &ProbeOptions,
) -> ProbeOutcome {
    let Some(primary) = records.first() else {
        return Unreachable {
            message: "no mail exchanger to probe".to_string(),
        };
    };

    let addrs = match resolve_socket_addrs(&primary.exchange, options.port) {
        Ok(addrs) if !addrs.is_empty() => addrs,
        Ok(_) => {
            return Unreachable {
                message: format!("no socket addresses for {}", primary.exchange),
            };
        }
        Err(err) => {
            return Unreachable {
                message: format!("address resolution for {} failed: {err}", primary.exchange),
            };
        }
    };

    let mut session =
        match SmtpSession::connect(&addrs, options.connect_timeout, options.command_timeout) {
            Ok(session) => session,
            Err(err) => {
                return Unreachable {
                    message: format!("connect to {} failed: {err}", primary.exchange),
                };
            }
        };

    let outcome = run_dialogue(&mut session, address, sender, options);
    // Best-effort courtesy; the verdict is already in.
    let _ = session.send_command("QUIT");
    let _ = session.read_reply();
    debug!(address, exchange = %primary.exchange, outcome = %outcome, "probe finished");
    outcome
}

fn run_dialogue(
    session: &mut SmtpSession,
    address: &str,
    sender: &str,
    options: &ProbeOptions,
) -> ProbeOutcome {
    let greeting = match session.read_reply() {
        Ok(reply) => reply,
        Err(err) => return protocol_error("greeting", &err),
    };
    if !greeting.is_positive_completion() {
        return ProtocolError {
            message: format!("unexpected greeting: {}", greeting.code),
        };
    }

    let helo = format!("HELO {}", helo_host(options, sender));
    match exchange(session, &helo, "HELO") {
        Ok(reply) if reply.is_positive_completion() => {}
        Ok(reply) => {
            return ProtocolError {
                message: format!("HELO rejected: {}", reply.code),
            };
        }
        Err(outcome) => return outcome,
    }

    let mail_from = format!("MAIL FROM:<{sender}>");
    match exchange(session, &mail_from, "MAIL FROM") {
        Ok(reply) if reply.is_positive_completion() => {}
        Ok(reply) if reply.is_transient_failure() => return TemporaryFailure { reply },
        Ok(reply) => return Rejected { reply },
        Err(outcome) => return outcome,
    }

    let rcpt_to = format!("RCPT TO:<{address}>");
    match exchange(session, &rcpt_to, "RCPT TO") {
        Ok(reply) if reply.is_positive_completion() => Accepted { reply },
        Ok(reply) if reply.is_transient_failure() => TemporaryFailure { reply },
        Ok(reply) if reply.is_permanent_failure() => Rejected { reply },
        Ok(reply) => ProtocolError {
            message: format!("inconclusive RCPT TO reply: {}", reply.code),
        },
        Err(outcome) => outcome,
    }
}

fn exchange(
    session: &mut SmtpSession,
    command: &str,
    stage: &str,
) -> Result<SmtpReply, ProbeOutcome> {
    session
        .send_command(command)
        .map_err(|err| protocol_error(stage, &err))?;
    session.read_reply().map_err(|err| protocol_error(stage, &err))
}

fn protocol_error(stage: &str, err: &io::Error) -> ProbeOutcome {
    let detail = if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) {
        format!("{stage} timed out")
    } else {
        format!("{stage} failed: {err}")
    };
    ProtocolError { message: detail }
}

fn helo_host<'a>(options: &'a ProbeOptions, sender: &'a str) -> &'a str {
    options
        .helo_host
        .as_deref()
        .filter(|host| !host.is_empty())
        .or_else(|| syntax::split_domain(sender))
        .unwrap_or("localhost")
}

fn resolve_socket_addrs(exchange: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    format!("{exchange}:{port}")
        .to_socket_addrs()
        .map(|iter| iter.collect())
}
