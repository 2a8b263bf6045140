//! SMTP command builder.
//!
//! Every byte string a session puts on the wire is one [`Command`]. Commands
//! borrow their arguments from the bounded fields of an
//! [`Envelope`](crate::Envelope), so the serialized length is bounded by
//! [`MAX_COMMAND_LEN`].

use std::fmt;

use crate::encoding::{encode_base64_line, encoded_line_len};
use crate::types::{MAX_BODY_LEN, MAX_HEADER_LEN};

/// End of the message data followed by QUIT.
pub const TERMINATOR: &[u8] = b"\r\n.\r\nQUIT\r\n";

/// Upper bound on the serialized length of any command built from
/// envelope fields.
pub const MAX_COMMAND_LEN: usize = {
    let header_command = "MAIL FROM:<>\r\n".len() + MAX_HEADER_LEN;
    let credential = encoded_line_len(MAX_HEADER_LEN);
    let max = if header_command > credential {
        header_command
    } else {
        credential
    };
    if MAX_BODY_LEN > max { MAX_BODY_LEN } else { max }
};

/// Outbound SMTP command or message fragment.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// HELO - Simple greeting
    Helo {
        /// Server hostname
        hostname: &'a str,
    },
    /// AUTH LOGIN - Begin LOGIN authentication
    AuthLogin,
    /// Base64 credential line answering an AUTH LOGIN challenge
    Credential {
        /// Raw credential bytes
        secret: &'a [u8],
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: &'a str,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: &'a str,
    },
    /// DATA - Begin message data
    Data,
    /// Subject header name
    SubjectHeader,
    /// Raw message text (subject value or body)
    Text(&'a str),
    /// End of the header line followed by the header/body separator
    HeaderEnd,
    /// End of data and QUIT
    Terminate,
}

impl Command<'_> {
    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MAX_COMMAND_LEN);

        match self {
            Self::Helo { hostname } => {
                buf.extend_from_slice(b"HELO ");
                buf.extend_from_slice(hostname.as_bytes());
                buf.extend_from_slice(b"\r\n");
            }
            Self::AuthLogin => {
                buf.extend_from_slice(b"AUTH LOGIN\r\n");
            }
            Self::Credential { secret } => {
                buf.extend_from_slice(encode_base64_line(secret).as_bytes());
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_bytes());
                buf.extend_from_slice(b">\r\n");
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_bytes());
                buf.extend_from_slice(b">\r\n");
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA\r\n");
            }
            Self::SubjectHeader => {
                buf.extend_from_slice(b"Subject:");
            }
            Self::Text(text) => {
                buf.extend_from_slice(text.as_bytes());
            }
            Self::HeaderEnd => {
                buf.extend_from_slice(b"\r\n\r\n");
            }
            Self::Terminate => {
                buf.extend_from_slice(TERMINATOR);
            }
        }

        buf
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Helo { .. } => "HELO",
            Self::AuthLogin => "AUTH LOGIN",
            Self::Credential { .. } => "credential",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::SubjectHeader => "Subject header",
            Self::Text(_) => "text",
            Self::HeaderEnd => "header end",
            Self::Terminate => "end of data + QUIT",
        }
    }
}

// Credentials never show up in debug output.
impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential { .. } => f.write_str("Credential(<redacted>)"),
            Self::Helo { hostname } => write!(f, "Helo({hostname:?})"),
            Self::MailFrom { from } => write!(f, "MailFrom({from:?})"),
            Self::RcptTo { to } => write!(f, "RcptTo({to:?})"),
            Self::Text(text) => write!(f, "Text({text:?})"),
            other => f.write_str(other.name()),
        }
    }
}
