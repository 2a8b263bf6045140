//! Mailer configuration types.

use std::time::Duration;

use crate::session::{DEFAULT_MAX_RETRIES, RetryPolicy};

/// Default TLS buffer limit; room for handshake records.
pub const DEFAULT_TLS_BUFFER_SIZE: usize = 8 * 1024;

/// Settings shared by every session a [`Mailer`](crate::Mailer) runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    /// Reconnects allowed after transport failures.
    pub max_retries: u32,
    /// Buffer limit for implicit-TLS connections.
    pub tls_buffer_size: usize,
    /// Limit for every connect, read, and write. `None` waits forever, so a
    /// silent server stalls its session indefinitely.
    pub io_timeout: Option<Duration>,
}

impl MailerConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> MailerConfigBuilder {
        MailerConfigBuilder::new()
    }

    /// Returns the retry policy for new sessions.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            tls_buffer_size: DEFAULT_TLS_BUFFER_SIZE,
            io_timeout: None,
        }
    }
}

/// Builder for mailer configuration.
#[derive(Debug, Clone, Default)]
pub struct MailerConfigBuilder {
    config: MailerConfig,
}

impl MailerConfigBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of reconnects allowed.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the TLS buffer limit.
    #[must_use]
    pub const fn tls_buffer_size(mut self, size: usize) -> Self {
        self.config.tls_buffer_size = size;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> MailerConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MailerConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.tls_buffer_size, 8192);
        assert_eq!(config.io_timeout, None);
    }

    #[test]
    fn test_builder() {
        let config = MailerConfig::builder()
            .max_retries(2)
            .tls_buffer_size(16 * 1024)
            .io_timeout(Duration::from_secs(30))
            .build();

        assert_eq!(config.max_retries, 2);
        assert_eq!(config.tls_buffer_size, 16384);
        assert_eq!(config.io_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.retry_policy().max_retries(), 2);
    }
}
