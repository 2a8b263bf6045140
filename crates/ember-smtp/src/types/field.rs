//! Bounded text fields.

use std::fmt;

/// Maximum length in bytes of header-like session fields.
pub const MAX_HEADER_LEN: usize = 32;

/// Maximum length in bytes of the message body.
pub const MAX_BODY_LEN: usize = 64;

/// Text field holding at most `MAX` bytes.
///
/// Input longer than `MAX` is truncated at construction time, on the last
/// character boundary that fits. Truncation is lossy and silent apart from
/// [`BoundedString::was_truncated`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedString<const MAX: usize> {
    value: String,
    truncated: bool,
}

/// Server, credential, address, and subject field.
pub type HeaderField = BoundedString<MAX_HEADER_LEN>;

/// Message body field.
pub type BodyField = BoundedString<MAX_BODY_LEN>;

impl<const MAX: usize> BoundedString<MAX> {
    /// Declared maximum length in bytes.
    pub const MAX_LEN: usize = MAX;

    /// Creates a field from `input`, truncating it to `MAX` bytes.
    #[must_use]
    pub fn new(input: &str) -> Self {
        if input.len() <= MAX {
            return Self {
                value: input.to_owned(),
                truncated: false,
            };
        }

        let mut end = MAX;
        while !input.is_char_boundary(end) {
            end -= 1;
        }

        Self {
            value: input[..end].to_owned(),
            truncated: true,
        }
    }

    /// Returns the stored text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the stored text as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    /// Returns the stored length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the field holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns true if construction dropped part of the input.
    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const MAX: usize> From<&str> for BoundedString<MAX> {
    fn from(input: &str) -> Self {
        Self::new(input)
    }
}

impl<const MAX: usize> AsRef<str> for BoundedString<MAX> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<const MAX: usize> fmt::Display for BoundedString<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<const MAX: usize> fmt::Debug for BoundedString<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}
