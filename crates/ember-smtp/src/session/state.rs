//! Protocol state and the transition function.
//!
//! A session walks the states below in order. Two of the events advance
//! it: [`Event::DataReceived`] drives the command/reply exchange from
//! `Helo` up to `SubjectHeader`, and [`Event::SendCompleted`] streams the
//! message content from `SubjectBody` to `MailFooter`. Replies are never
//! inspected; any chunk from the server means "go on".
//!
//! ```text
//!  received: Helo → Auth → User → Pass → From → Rcpt → Data → SubjectHeader
//!                                                               │  │  │
//!       subject ────────────────────────────────────────────────┘  │  │
//!       body only (sends body) ────────────────────────────────────┘  │
//!       neither (sends terminator) → Finished ────────────────────────┘
//!
//!  sent:     SubjectBody → SubjectFooter → MailBody → MailFooter → Finished
//!                               └── no body ─────────────┘
//! ```

use crate::command::Command;
use crate::types::Envelope;

/// Protocol state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SmtpState {
    /// Waiting for the greeting; next command is HELO.
    #[default]
    Helo,
    /// Next command is AUTH LOGIN.
    Auth,
    /// Next command is the encoded username.
    User,
    /// Next command is the encoded password.
    Pass,
    /// Next command is MAIL FROM.
    From,
    /// Next command is RCPT TO.
    Rcpt,
    /// Next command is DATA.
    Data,
    /// Inside DATA; next is the Subject header or the content that replaces it.
    SubjectHeader,
    /// Subject header name sent; next is the subject text.
    SubjectBody,
    /// Subject text sent; next is the header terminator.
    SubjectFooter,
    /// Next is the body text.
    MailBody,
    /// Next is the end-of-data marker and QUIT.
    MailFooter,
    /// QUIT sent; waiting for the server to close.
    Finished,
}

/// Event delivered to a session by the transport or the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The transport is connected.
    Connected,
    /// A chunk of bytes arrived from the server.
    DataReceived {
        /// Chunk length; the content itself is not inspected.
        len: usize,
    },
    /// The previously transmitted command has been fully written.
    SendCompleted,
    /// The server closed the connection.
    Disconnected,
    /// Connecting failed, or the connection broke with an error.
    ReconnectFailed,
}

/// Result of applying an event to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<'a> {
    /// State after the event.
    pub next: SmtpState,
    /// Command to transmit, if any.
    pub command: Option<Command<'a>>,
}

impl<'a> Transition<'a> {
    const fn send(next: SmtpState, command: Command<'a>) -> Self {
        Self {
            next,
            command: Some(command),
        }
    }

    const fn stay(state: SmtpState) -> Self {
        Self {
            next: state,
            command: None,
        }
    }
}

impl SmtpState {
    /// Returns the next state in nominal order.
    #[must_use]
    pub const fn successor(self) -> Self {
        match self {
            Self::Helo => Self::Auth,
            Self::Auth => Self::User,
            Self::User => Self::Pass,
            Self::Pass => Self::From,
            Self::From => Self::Rcpt,
            Self::Rcpt => Self::Data,
            Self::Data => Self::SubjectHeader,
            Self::SubjectHeader => Self::SubjectBody,
            Self::SubjectBody => Self::SubjectFooter,
            Self::SubjectFooter => Self::MailBody,
            Self::MailBody => Self::MailFooter,
            Self::MailFooter | Self::Finished => Self::Finished,
        }
    }

    /// Returns true once QUIT has been sent.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Applies `event` and returns the next state plus the command to send.
    ///
    /// Connection-level events ([`Event::Connected`], [`Event::Disconnected`],
    /// [`Event::ReconnectFailed`]) leave the protocol state alone; the
    /// session handles them.
    #[must_use]
    pub fn on_event<'a>(self, event: Event, envelope: &'a Envelope) -> Transition<'a> {
        match event {
            Event::DataReceived { .. } => self.on_received(envelope),
            Event::SendCompleted => self.on_sent(envelope),
            Event::Connected | Event::Disconnected | Event::ReconnectFailed => {
                Transition::stay(self)
            }
        }
    }

    fn on_received(self, envelope: &Envelope) -> Transition<'_> {
        let command = match self {
            Self::Helo => Command::Helo {
                hostname: envelope.server.as_str(),
            },
            Self::Auth => Command::AuthLogin,
            Self::User => Command::Credential {
                secret: envelope.user.as_bytes(),
            },
            Self::Pass => Command::Credential {
                secret: envelope.pass.as_bytes(),
            },
            Self::From => Command::MailFrom {
                from: envelope.user.as_str(),
            },
            Self::Rcpt => Command::RcptTo {
                to: envelope.recipient.as_str(),
            },
            Self::Data => Command::Data,
            Self::SubjectHeader => return Self::open_content(envelope),
            _ => return Transition::stay(self),
        };

        Transition::send(self.successor(), command)
    }

    // First step inside DATA. Without a subject the body (or the terminator)
    // goes out right away instead of waiting for another event.
    fn open_content(envelope: &Envelope) -> Transition<'_> {
        if envelope.has_subject() {
            Transition::send(Self::SubjectBody, Command::SubjectHeader)
        } else if envelope.has_body() {
            Transition::send(Self::MailFooter, Command::Text(envelope.body.as_str()))
        } else {
            Transition::send(Self::Finished, Command::Terminate)
        }
    }

    fn on_sent(self, envelope: &Envelope) -> Transition<'_> {
        match self {
            Self::SubjectBody => Transition::send(
                self.successor(),
                Command::Text(envelope.subject.as_str()),
            ),
            Self::SubjectFooter => {
                let next = if envelope.has_body() {
                    Self::MailBody
                } else {
                    Self::MailBody.successor()
                };
                Transition::send(next, Command::HeaderEnd)
            }
            Self::MailBody => {
                Transition::send(self.successor(), Command::Text(envelope.body.as_str()))
            }
            Self::MailFooter => Transition::send(self.successor(), Command::Terminate),
            _ => Transition::stay(self),
        }
    }
}
