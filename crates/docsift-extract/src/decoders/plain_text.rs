//! Plain text decoder.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::error::Result;
use std::io::Read;

/// Reads the whole stream and strips whitespace.
///
/// The whitespace-separated tokens are concatenated with no separator, so
/// `"Hello\nWorld"` becomes `"HelloWorld"`. Invalid UTF-8 sequences are
/// replaced rather than rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextDecoder;

impl PlainTextDecoder {
    /// Create a new plain text decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextDecoder for PlainTextDecoder {
    fn name(&self) -> &'static str {
        "plain text"
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;

        let text = String::from_utf8_lossy(&bytes);
        Ok(text.split_whitespace().collect())
    }
}
