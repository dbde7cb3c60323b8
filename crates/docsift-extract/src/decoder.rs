//! The decoder capability every document kind is bound to.

use crate::error::Result;
use std::io::{BufRead, Seek};

/// A buffered, seekable byte stream handed to decoders.
///
/// `BufRead` lets the sniffer peek at leading bytes without consuming them;
/// `Seek` is required by the zip and compound-file readers.
pub trait DocumentSource: BufRead + Seek {}

impl<T: BufRead + Seek + ?Sized> DocumentSource for T {}

/// Turns one document stream into plain text.
///
/// Decoders own every handle they open (archives, workbooks, compound files)
/// as locals, so those are released when `decode` returns on any path. The
/// source itself belongs to the caller.
pub trait TextDecoder: Send + Sync {
    /// Decoder name for logging/debugging
    fn name(&self) -> &'static str;

    /// Extract the text of the document in `source`.
    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String>;
}
