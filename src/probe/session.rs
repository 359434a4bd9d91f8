use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::types::SmtpReply;

/// A blocking SMTP session over a plain TCP stream with read/write timeouts.
pub(crate) struct SmtpSession {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    /// Connects to the first reachable address, applying `connect_timeout`
    /// per address and `command_timeout` to the established stream.
    pub(crate) fn connect(
        addrs: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> io::Result<Self> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(command_timeout))?;
                    stream.set_write_timeout(Some(command_timeout))?;
                    let reader = BufReader::new(stream.try_clone()?);
                    return Ok(Self { stream, reader });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket address available")
        }))
    }

    pub(crate) fn send_command(&mut self, command: &str) -> io::Result<()> {
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()
    }

    pub(crate) fn read_reply(&mut self) -> io::Result<SmtpReply> {
        read_reply_from(&mut self.reader)
    }
}

/// Reads one (possibly multiline) SMTP reply from `reader`.
pub(crate) fn read_reply_from<R: BufRead>(reader: &mut R) -> io::Result<SmtpReply> {
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        let mut raw = String::new();
        if reader.read_line(&mut raw)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            ));
        }
        let line = raw.trim_end_matches(['\r', '\n']);

        // get() also rejects a multibyte character straddling the code
        // boundary; a broken server must not abort the run.
        let Some(code_part) = line.get(..3) else {
            return Err(invalid_reply(format!("reply line too short: '{line}'")));
        };
        let parsed: u16 = code_part
            .parse()
            .map_err(|_| invalid_reply(format!("bad status code in '{line}'")))?;
        match code {
            None => code = Some(parsed),
            Some(existing) if existing != parsed => {
                return Err(invalid_reply(format!(
                    "mixed status codes {existing} and {parsed}"
                )));
            }
            Some(_) => {}
        }

        let continuation = line.as_bytes().get(3) == Some(&b'-');
        message_lines.push(line.get(4..).unwrap_or("").to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.ok_or_else(|| invalid_reply("reply missing status code".to_string()))?,
        message: message_lines.join("\n"),
    })
}

fn invalid_reply(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
