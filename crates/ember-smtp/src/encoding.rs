//! Base64 encoding for the AUTH LOGIN credential exchange.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Line terminator appended after every encoded credential.
pub const CRLF: &str = "\r\n";

/// Encodes data as standard Base64 followed by a CRLF line terminator.
///
/// The output is a single line; credentials are short enough that MIME
/// line wrapping never applies.
#[must_use]
pub fn encode_base64_line(data: &[u8]) -> String {
    let mut line = STANDARD.encode(data);
    line.push_str(CRLF);
    line
}

/// Returns the length of [`encode_base64_line`]'s output for `len` input bytes.
#[must_use]
pub const fn encoded_line_len(len: usize) -> usize {
    len.div_ceil(3) * 4 + CRLF.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_username() {
        assert_eq!(
            encode_base64_line(b"user@example.com"),
            "dXNlckBleGFtcGxlLmNvbQ==\r\n"
        );
    }

    #[test]
    fn test_encode_padding() {
        assert_eq!(encode_base64_line(b"secret"), "c2VjcmV0\r\n");
        assert_eq!(encode_base64_line(b"a@example.com"), "YUBleGFtcGxlLmNvbQ==\r\n");
        assert_eq!(encode_base64_line(b"ab"), "YWI=\r\n");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_base64_line(b""), "\r\n");
    }

    #[test]
    fn test_encoded_line_len() {
        for input in [&b""[..], b"a", b"ab", b"abc", b"user@example.com"] {
            assert_eq!(encode_base64_line(input).len(), encoded_line_len(input.len()));
        }
    }
}
