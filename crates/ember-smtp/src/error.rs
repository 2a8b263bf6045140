//! Error types for SMTP session operations.
//!
//! None of these ever reach the caller of [`crate::send_email`]; they are
//! turned into session events or logged where they occur.

use std::io;
use std::time::Duration;

/// Result type alias for SMTP session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP session error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Hostname could not be resolved.
    #[error("DNS lookup for {host} failed: {reason}")]
    Dns {
        /// Hostname that was looked up.
        host: String,
        /// Resolver failure description.
        reason: String,
    },

    /// A transport operation did not finish in time.
    #[error("Transport operation timed out after {0:?}")]
    Timeout(Duration),

    /// No async runtime to run the session on.
    #[error("No tokio runtime available to run the session")]
    NoRuntime,
}

impl Error {
    /// Creates a DNS error for `host`.
    #[must_use]
    pub fn dns(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Dns {
            host: host.into(),
            reason: reason.into(),
        }
    }
}
