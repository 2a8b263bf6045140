//! Session runner and the fire-and-forget entry point.
//!
//! The runner turns transport activity into session [`Event`]s: a finished
//! write becomes [`Event::SendCompleted`], a received chunk becomes
//! [`Event::DataReceived`], end of stream becomes [`Event::Disconnected`],
//! and any transport error becomes [`Event::ReconnectFailed`]. Each session
//! runs on its own task; sessions share nothing.

use std::future::Future;
use std::net::SocketAddr;
use std::ops::ControlFlow;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::MailerConfig;
use crate::connection::{Connector, NetConnector, Resolver, SystemResolver, resolve_endpoint};
use crate::error::{Error, Result};
use crate::session::{Action, Event, Outcome, Session, Step};
use crate::types::Envelope;

/// One message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Message parameters.
    pub envelope: Envelope,
    /// Server port; 465 selects implicit TLS.
    pub port: u16,
}

impl SendRequest {
    /// Builds a request. Absent or empty `subject`/`body` are left out of
    /// the message.
    #[must_use]
    pub fn new(
        server: &str,
        port: u16,
        user: &str,
        pass: &str,
        recipient: &str,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Self {
        Self {
            envelope: Envelope::new(server, user, pass, recipient, subject, body),
            port,
        }
    }
}

/// Runs SMTP sessions.
#[derive(Debug, Clone)]
pub struct Mailer<R = SystemResolver, C = NetConnector> {
    config: MailerConfig,
    resolver: R,
    connector: C,
}

impl Mailer {
    /// Creates a mailer using the system resolver and real sockets.
    #[must_use]
    pub fn new(config: MailerConfig) -> Self {
        let connector = NetConnector::new(config.tls_buffer_size);
        Self {
            config,
            resolver: SystemResolver,
            connector,
        }
    }
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new(MailerConfig::default())
    }
}

impl<R: Resolver, C: Connector> Mailer<R, C> {
    /// Creates a mailer with a custom resolver and connector.
    #[must_use]
    pub const fn with_transport(config: MailerConfig, resolver: R, connector: C) -> Self {
        Self {
            config,
            resolver,
            connector,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Runs one session to its end and reports how it ended.
    ///
    /// The outcome is diagnostic only; nothing is retried based on it.
    pub async fn deliver(&self, request: SendRequest) -> Outcome {
        let SendRequest { envelope, port } = request;
        let mut session = Session::new(envelope, port, self.config.retry_policy());

        loop {
            let resolved = self
                .timed(resolve_endpoint(&self.resolver, session.server(), session.port()))
                .await;
            let addr = match resolved {
                Ok(addr) => addr,
                Err(error) => {
                    tracing::warn!(%error, "SMTP DNS lookup failed");
                    return session.resolution_failed();
                }
            };

            let opened = self.open(&session, addr).await;
            let flow = match opened {
                Ok(stream) => self.drive(session, stream).await,
                Err(error) => {
                    tracing::warn!(%error, %addr, "SMTP connect failed");
                    continue_after(session.handle(Event::ReconnectFailed))
                }
            };

            match flow {
                ControlFlow::Continue(next) => session = next,
                ControlFlow::Break(outcome) => return outcome,
            }
        }
    }

    async fn open(&self, session: &Session, addr: SocketAddr) -> Result<C::Stream> {
        self.timed(self.connector.connect(addr, session.server(), session.mode()))
            .await
    }

    /// Pumps events for one connection until the session is released or
    /// asks to reconnect.
    async fn drive(&self, session: Session, mut stream: C::Stream) -> ControlFlow<Outcome, Session> {
        let mut buf = vec![0u8; session.mode().buffer_size(self.config.tls_buffer_size)];
        let mut step = session.handle(Event::Connected);

        loop {
            let (session, action) = match step {
                Step::Next(session, action) => (session, action),
                Step::Released(outcome) => {
                    let closed = self
                        .timed(async { stream.shutdown().await.map_err(Error::from) })
                        .await;
                    if let Err(error) = closed {
                        tracing::debug!(%error, "SMTP shutdown failed");
                    }
                    return ControlFlow::Break(outcome);
                }
            };

            let event = match action {
                Action::Transmit(bytes) => match self.transmit(&mut stream, &bytes).await {
                    Ok(()) => Event::SendCompleted,
                    Err(error) => {
                        tracing::warn!(%error, "SMTP send failed");
                        Event::ReconnectFailed
                    }
                },
                Action::Wait => {
                    let received = self
                        .timed(async { stream.read(&mut buf).await.map_err(Error::from) })
                        .await;
                    match received {
                        Ok(0) => Event::Disconnected,
                        Ok(len) => {
                            tracing::trace!(
                                reply = %String::from_utf8_lossy(&buf[..len]).trim_end(),
                                "SMTP received"
                            );
                            Event::DataReceived { len }
                        }
                        Err(error) => {
                            tracing::warn!(%error, "SMTP receive failed");
                            Event::ReconnectFailed
                        }
                    }
                }
                Action::Reconnect => return ControlFlow::Continue(session),
            };

            step = session.handle(event);
        }
    }

    async fn transmit(&self, stream: &mut C::Stream, bytes: &[u8]) -> Result<()> {
        self.timed(async {
            stream.write_all(bytes).await?;
            stream.flush().await?;
            Ok::<(), Error>(())
        })
        .await
    }

    async fn timed<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.io_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => fut.await,
        }
    }
}

impl<R, C> Mailer<R, C>
where
    R: Resolver + Clone + 'static,
    C: Connector + Clone + 'static,
    C::Stream: 'static,
{
    /// Starts a session on the current tokio runtime and returns at once.
    ///
    /// The caller gets no completion signal. Outside a runtime the request
    /// is dropped before any network activity.
    pub fn send(&self, request: SendRequest) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                error = %Error::NoRuntime,
                server = %request.envelope.server,
                "SMTP send dropped"
            );
            return;
        };

        let mailer = self.clone();
        runtime.spawn(async move {
            let outcome = mailer.deliver(request).await;
            tracing::debug!(?outcome, "SMTP session finished");
        });
    }
}

fn continue_after(step: Step) -> ControlFlow<Outcome, Session> {
    match step {
        Step::Next(session, _) => ControlFlow::Continue(session),
        Step::Released(outcome) => ControlFlow::Break(outcome),
    }
}

/// Sends one email in the background with default settings.
///
/// Returns immediately. Port 465 uses implicit TLS without certificate
/// verification; every other port is plaintext. Nothing reports whether
/// the message was delivered.
pub fn send_email(
    server: &str,
    port: u16,
    user: &str,
    pass: &str,
    recipient: &str,
    subject: Option<&str>,
    body: Option<&str>,
) {
    Mailer::default().send(SendRequest::new(
        server, port, user, pass, recipient, subject, body,
    ));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_send_outside_runtime_is_dropped() {
        // Must return without panicking and without touching the network.
        send_email(
            "mail.example.com",
            587,
            "a@example.com",
            "secret",
            "b@example.com",
            Some("Hi"),
            Some("Test"),
        );
    }

    #[test]
    fn test_request_truncates_fields() {
        let request = SendRequest::new(
            "mail.example.com",
            25,
            "a@example.com",
            "secret",
            &"r".repeat(100),
            None,
            None,
        );
        assert_eq!(request.envelope.recipient.len(), 32);
        assert_eq!(request.port, 25);
    }

    #[test]
    fn test_continue_after_retry() {
        let request = SendRequest::new("mx", 25, "a", "b", "c", None, None);
        let session = Session::new(request.envelope, 25, MailerConfig::default().retry_policy());
        assert!(matches!(
            continue_after(session.handle(Event::ReconnectFailed)),
            ControlFlow::Continue(_)
        ));
    }
}
