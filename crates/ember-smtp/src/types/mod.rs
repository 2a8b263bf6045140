//! Core session types.

mod envelope;
mod field;

pub use envelope::Envelope;
pub use field::{BodyField, BoundedString, HeaderField, MAX_BODY_LEN, MAX_HEADER_LEN};
