//! Per-message session parameters.

use super::field::{BodyField, HeaderField};

/// Everything one outgoing message needs: where to send it, who to log in
/// as, and what to say.
///
/// Every field is bounded; oversized input is truncated when the envelope
/// is built. An empty subject or body means "absent".
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    /// SMTP server hostname, also used as the HELO argument.
    pub server: HeaderField,
    /// Login name, also used as the envelope sender.
    pub user: HeaderField,
    /// Login password.
    pub pass: HeaderField,
    /// Single envelope recipient.
    pub recipient: HeaderField,
    /// Subject line.
    pub subject: HeaderField,
    /// Message body.
    pub body: BodyField,
}

impl Envelope {
    /// Builds an envelope, truncating every field to its maximum.
    #[must_use]
    pub fn new(
        server: &str,
        user: &str,
        pass: &str,
        recipient: &str,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Self {
        let envelope = Self {
            server: HeaderField::new(server),
            user: HeaderField::new(user),
            pass: HeaderField::new(pass),
            recipient: HeaderField::new(recipient),
            subject: HeaderField::new(subject.unwrap_or_default()),
            body: BodyField::new(body.unwrap_or_default()),
        };

        if envelope.any_truncated() {
            tracing::debug!(server = %envelope.server, "Envelope fields truncated to their limits");
        }

        envelope
    }

    /// Returns true if a subject was supplied.
    #[must_use]
    pub fn has_subject(&self) -> bool {
        !self.subject.is_empty()
    }

    /// Returns true if a body was supplied.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    fn any_truncated(&self) -> bool {
        self.server.was_truncated()
            || self.user.was_truncated()
            || self.pass.was_truncated()
            || self.recipient.was_truncated()
            || self.subject.was_truncated()
            || self.body.was_truncated()
    }
}

// The password stays out of debug output.
impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .field("body", &self.body)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use crate::types::MAX_HEADER_LEN;

    fn envelope(subject: Option<&str>, body: Option<&str>) -> Envelope {
        Envelope::new(
            "mail.example.com",
            "a@example.com",
            "secret",
            "b@example.com",
            subject,
            body,
        )
    }

    #[test]
    fn test_absent_subject_and_body() {
        let env = envelope(None, None);
        assert!(!env.has_subject());
        assert!(!env.has_body());
    }

    #[test]
    fn test_empty_strings_mean_absent() {
        let env = envelope(Some(""), Some(""));
        assert!(!env.has_subject());
        assert!(!env.has_body());
    }

    #[test]
    fn test_present_subject_and_body() {
        let env = envelope(Some("Hi"), Some("Test"));
        assert_eq!(env.subject.as_str(), "Hi");
        assert_eq!(env.body.as_str(), "Test");
    }

    #[test]
    fn test_long_recipient_leaves_neighbours_intact() {
        let recipient = format!("{}@example.com", "r".repeat(88));
        let env = Envelope::new(
            "mail.example.com",
            "a@example.com",
            "secret",
            &recipient,
            Some("Hi"),
            Some("Test"),
        );

        assert_eq!(env.recipient.len(), MAX_HEADER_LEN);
        assert_eq!(env.recipient.as_str(), &recipient[..MAX_HEADER_LEN]);
        assert_eq!(env.pass.as_str(), "secret");
        assert_eq!(env.subject.as_str(), "Hi");
        assert_eq!(env.body.as_str(), "Test");
    }

    #[test]
    fn test_debug_redacts_password() {
        let output = format!("{:?}", envelope(None, None));
        assert!(!output.contains("secret"));
        assert!(output.contains("<redacted>"));
    }
}
