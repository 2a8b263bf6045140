//! SMTP session: protocol state plus failure supervision for one message.
//!
//! [`Session::handle`] is the single dispatch point for every event. It
//! consumes the session and either hands it back with the next [`Action`]
//! or releases it with an [`Outcome`]. A released session no longer exists,
//! so a late event has nothing to touch.

mod state;
mod supervisor;

pub use state::{Event, SmtpState, Transition};
pub use supervisor::{DEFAULT_MAX_RETRIES, RetryPolicy, Supervisor, Verdict};

use crate::connection::TransportMode;
use crate::types::Envelope;

/// What the runner must do next for a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write these bytes, then report [`Event::SendCompleted`].
    Transmit(Vec<u8>),
    /// Wait for the next chunk from the server.
    Wait,
    /// Drop the transport, then resolve and connect again.
    Reconnect,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// QUIT was sent and the server closed the connection.
    Completed,
    /// The server closed the connection before QUIT was sent.
    ClosedEarly {
        /// State at the time of the close.
        state: SmtpState,
    },
    /// The server name could not be resolved.
    DnsFailed,
    /// Too many consecutive transport failures.
    RetriesExhausted {
        /// Number of failures recorded.
        failures: u32,
    },
}

/// Result of dispatching one event.
#[derive(Debug)]
pub enum Step {
    /// The session lives on.
    Next(Session, Action),
    /// The session has been released.
    Released(Outcome),
}

/// One outgoing message and its protocol progress.
#[derive(Debug)]
pub struct Session {
    envelope: Envelope,
    port: u16,
    state: SmtpState,
    supervisor: Supervisor,
}

impl Session {
    /// Creates a session in the initial state.
    #[must_use]
    pub fn new(envelope: Envelope, port: u16, policy: RetryPolicy) -> Self {
        Self {
            envelope,
            port,
            state: SmtpState::default(),
            supervisor: Supervisor::new(policy),
        }
    }

    /// Returns the message parameters.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the server hostname.
    #[must_use]
    pub fn server(&self) -> &str {
        self.envelope.server.as_str()
    }

    /// Returns the server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the transport mode selected by the port.
    #[must_use]
    pub const fn mode(&self) -> TransportMode {
        TransportMode::for_port(self.port)
    }

    /// Returns the current protocol state.
    #[must_use]
    pub const fn state(&self) -> SmtpState {
        self.state
    }

    /// Returns the number of transport failures so far.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.supervisor.failures()
    }

    /// Dispatches one event.
    #[must_use]
    pub fn handle(mut self, event: Event) -> Step {
        match event {
            Event::Connected => {
                tracing::info!(server = %self.envelope.server, port = self.port, "SMTP connected");
                Step::Next(self, Action::Wait)
            }
            Event::DataReceived { .. } | Event::SendCompleted => {
                let transition = self.state.on_event(event, &self.envelope);
                let action = match transition.command {
                    Some(command) => {
                        tracing::debug!(command = ?command, state = ?self.state, "SMTP send");
                        Action::Transmit(command.serialize())
                    }
                    None => Action::Wait,
                };
                self.state = transition.next;
                Step::Next(self, action)
            }
            Event::Disconnected => {
                let outcome = if self.state.is_finished() {
                    Outcome::Completed
                } else {
                    Outcome::ClosedEarly { state: self.state }
                };
                Step::Released(self.release(outcome))
            }
            // QUIT is already out; a retry would send the message again.
            Event::ReconnectFailed if self.state.is_finished() => {
                tracing::debug!(
                    server = %self.envelope.server,
                    "SMTP transport error after QUIT"
                );
                Step::Released(self.release(Outcome::Completed))
            }
            Event::ReconnectFailed => match self.supervisor.record_failure() {
                Verdict::Retry { failures } => {
                    tracing::warn!(
                        server = %self.envelope.server,
                        failures,
                        "SMTP connection failed, retrying"
                    );
                    // A new connection starts with a new greeting.
                    self.state = SmtpState::Helo;
                    Step::Next(self, Action::Reconnect)
                }
                Verdict::GiveUp { failures } => {
                    tracing::warn!(
                        server = %self.envelope.server,
                        failures,
                        "SMTP connection failed, giving up"
                    );
                    Step::Released(self.release(Outcome::RetriesExhausted { failures }))
                }
            },
        }
    }

    /// Releases the session after a failed name lookup. No retry.
    #[must_use]
    pub fn resolution_failed(self) -> Outcome {
        self.release(Outcome::DnsFailed)
    }

    fn release(self, outcome: Outcome) -> Outcome {
        tracing::info!(server = %self.envelope.server, ?outcome, "SMTP session released");
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names, clippy::panic)]
mod tests {
    use super::*;

    const RECEIVED: Event = Event::DataReceived { len: 4 };

    fn session(port: u16) -> Session {
        let envelope = Envelope::new(
            "mail.example.com",
            "a@example.com",
            "secret",
            "b@example.com",
            Some("Hi"),
            Some("Test"),
        );
        Session::new(envelope, port, RetryPolicy::default())
    }

    fn next(step: Step) -> (Session, Action) {
        match step {
            Step::Next(session, action) => (session, action),
            Step::Released(outcome) => panic!("session released early: {outcome:?}"),
        }
    }

    #[test]
    fn test_connected_waits_for_greeting() {
        let (session, action) = next(session(587).handle(Event::Connected));
        assert_eq!(action, Action::Wait);
        assert_eq!(session.state(), SmtpState::Helo);
    }

    #[test]
    fn test_greeting_triggers_helo() {
        let (session, action) = next(session(587).handle(RECEIVED));
        assert_eq!(action, Action::Transmit(b"HELO mail.example.com\r\n".to_vec()));
        assert_eq!(session.state(), SmtpState::Auth);
    }

    #[test]
    fn test_mode_follows_port() {
        assert_eq!(session(465).mode(), TransportMode::ImplicitTls);
        assert_eq!(session(587).mode(), TransportMode::Plain);
    }

    #[test]
    fn test_retry_resets_state() {
        let (s, _) = next(session(587).handle(RECEIVED));
        let (s, _) = next(s.handle(RECEIVED));
        assert_eq!(s.state(), SmtpState::User);

        let (s, action) = next(s.handle(Event::ReconnectFailed));
        assert_eq!(action, Action::Reconnect);
        assert_eq!(s.state(), SmtpState::Helo);
        assert_eq!(s.failures(), 1);
    }

    #[test]
    fn test_released_after_max_plus_one_failures() {
        let mut s = session(587);
        for expected in 1..=DEFAULT_MAX_RETRIES {
            let (live, action) = next(s.handle(Event::ReconnectFailed));
            assert_eq!(action, Action::Reconnect);
            assert_eq!(live.failures(), expected);
            s = live;
        }

        match s.handle(Event::ReconnectFailed) {
            Step::Released(outcome) => {
                assert_eq!(outcome, Outcome::RetriesExhausted { failures: 6 });
            }
            Step::Next(..) => panic!("session should have been released"),
        }
    }

    #[test]
    fn test_disconnect_before_quit_is_early_close() {
        let (s, _) = next(session(587).handle(RECEIVED));
        match s.handle(Event::Disconnected) {
            Step::Released(outcome) => assert_eq!(
                outcome,
                Outcome::ClosedEarly {
                    state: SmtpState::Auth
                }
            ),
            Step::Next(..) => panic!("session should have been released"),
        }
    }

    #[test]
    fn test_failure_after_quit_completes_without_retry() {
        let mut s = session(587);
        while s.state() != SmtpState::Finished {
            let event = if s.state() < SmtpState::SubjectBody {
                RECEIVED
            } else {
                Event::SendCompleted
            };
            s = next(s.handle(event)).0;
        }

        match s.handle(Event::ReconnectFailed) {
            Step::Released(outcome) => assert_eq!(outcome, Outcome::Completed),
            Step::Next(..) => panic!("finished session must not reconnect"),
        }
    }

    #[test]
    fn test_resolution_failure_releases() {
        assert_eq!(session(25).resolution_failed(), Outcome::DnsFailed);
    }
}
