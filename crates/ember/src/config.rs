//! Settings file for the command-line sender.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ember_smtp::{MailerConfig, SendRequest};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "EMBER_CONFIG";

/// Account and delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// SMTP server hostname.
    pub server: String,
    /// SMTP server port; 465 means implicit TLS.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login name and sender address.
    pub user: String,
    /// Login password.
    pub pass: String,
    /// Notification recipient.
    pub recipient: String,
    /// Reconnect limit override.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Per-operation timeout in seconds; absent means no timeout.
    #[serde(default)]
    pub io_timeout_secs: Option<u64>,
}

const fn default_port() -> u16 {
    465
}

impl Settings {
    /// Builds the mailer configuration.
    #[must_use]
    pub fn mailer_config(&self) -> MailerConfig {
        let mut builder = MailerConfig::builder();
        if let Some(max_retries) = self.max_retries {
            builder = builder.max_retries(max_retries);
        }
        if let Some(secs) = self.io_timeout_secs {
            builder = builder.io_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Builds the request for one message.
    #[must_use]
    pub fn request(&self, subject: Option<&str>, body: Option<&str>) -> SendRequest {
        SendRequest::new(
            &self.server,
            self.port,
            &self.user,
            &self.pass,
            &self.recipient,
            subject,
            body,
        )
    }
}

/// Returns the settings file path.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(
        || {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ember")
                .join("config.json")
        },
        PathBuf::from,
    )
}

/// Loads settings from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid settings JSON.
pub async fn load(path: &Path) -> anyhow::Result<Settings> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use ember_smtp::TransportMode;

    const MINIMAL: &str = r#"{
        "server": "mail.example.com",
        "user": "alerts@example.com",
        "pass": "secret",
        "recipient": "me@example.com"
    }"#;

    #[test]
    fn test_defaults() {
        let settings: Settings = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(settings.port, 465);
        assert_eq!(settings.mailer_config(), MailerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let json = r#"{
            "server": "mail.example.com",
            "port": 587,
            "user": "alerts@example.com",
            "pass": "secret",
            "recipient": "me@example.com",
            "max_retries": 2,
            "io_timeout_secs": 30
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        let config = settings.mailer_config();

        assert_eq!(config.max_retries, 2);
        assert_eq!(config.io_timeout, Some(Duration::from_secs(30)));
        assert_eq!(TransportMode::for_port(settings.port), TransportMode::Plain);
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{ "server": "mail.example.com" }"#;
        assert!(serde_json::from_str::<Settings>(json).is_err());
    }

    #[test]
    fn test_request_carries_settings() {
        let settings: Settings = serde_json::from_str(MINIMAL).unwrap();
        let request = settings.request(Some("Alarm"), None);

        assert_eq!(request.port, 465);
        assert_eq!(request.envelope.server.as_str(), "mail.example.com");
        assert_eq!(request.envelope.subject.as_str(), "Alarm");
        assert!(!request.envelope.has_body());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("ember-config-{}.json", std::process::id()));
        tokio::fs::write(&path, MINIMAL).await.unwrap();

        let settings = load(&path).await.unwrap();
        assert_eq!(settings.recipient, "me@example.com");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let path = std::env::temp_dir().join("ember-config-does-not-exist.json");
        assert!(load(&path).await.is_err());
    }
}
