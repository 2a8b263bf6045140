//! # ember-smtp
//!
//! Fire-and-forget SMTP sender for notification messages.
//!
//! One call sends one short plain-text email with AUTH LOGIN credentials to
//! a single recipient. The call returns immediately; the session runs in the
//! background on the current tokio runtime, reconnecting a bounded number of
//! times when the transport fails, and reports nothing back.
//!
//! ## Features
//!
//! - **Explicit state machine**: one tagged [`SmtpState`] and one
//!   transition function driven by transport [`Event`]s
//! - **Bounded fields**: oversized input is truncated at construction
//! - **Bounded retries**: up to five reconnects, then the session is dropped
//! - **Implicit TLS** on port 465 (no certificate verification), plaintext
//!   on every other port
//!
//! ## Quick Start
//!
//! ```ignore
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     ember_smtp::send_email(
//!         "mail.example.com",
//!         465,
//!         "alerts@example.com",
//!         "password",
//!         "me@example.com",
//!         Some("Smoker alarm"),
//!         Some("Dome temperature above 300F"),
//!     );
//!
//!     // Keep the runtime alive long enough for the session to finish.
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//! }
//! ```
//!
//! ## Wire Sequence
//!
//! ```text
//! HELO <server>
//! AUTH LOGIN
//! <base64 user>
//! <base64 pass>
//! MAIL FROM:<user>
//! RCPT TO:<recipient>
//! DATA
//! Subject:<subject>\r\n\r\n     (only with a subject)
//! <body>                        (only with a body)
//! \r\n.\r\nQUIT
//! ```
//!
//! Server replies are never parsed: each reply only paces the next command.
//!
//! ## Modules
//!
//! - [`command`]: command builder
//! - [`connection`]: DNS resolution and TCP/TLS transport
//! - [`encoding`]: Base64 credential encoding
//! - [`session`]: state machine and retry supervisor
//! - [`types`]: bounded fields and the message envelope

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod config;
pub mod connection;
pub mod encoding;
mod error;
mod mailer;
pub mod session;
pub mod types;

pub use config::{DEFAULT_TLS_BUFFER_SIZE, MailerConfig, MailerConfigBuilder};
pub use connection::{Connector, Resolver, TransportMode};
pub use error::{Error, Result};
pub use mailer::{Mailer, SendRequest, send_email};
pub use session::{Event, Outcome, Session, SmtpState};
pub use types::Envelope;
