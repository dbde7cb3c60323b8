//! Container sniffing from leading magic bytes.
//!
//! A `.doc` file is sometimes an OOXML package and a `.docx` file is
//! sometimes a legacy compound file, so the word-processor family is routed
//! on what the bytes say rather than on the extension.

use std::fmt;
use std::io::{self, BufRead, Read, Seek, SeekFrom};

/// OLE2 compound file header.
pub(crate) const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Zip local file header.
pub(crate) const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Outer container format derived from the first bytes of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SniffedFormat {
    /// Legacy compound binary file (OLE2)
    LegacyContainer,
    /// Zip-based package (OOXML)
    ZipContainer,
    /// Neither signature matched
    Unknown,
}

impl SniffedFormat {
    /// Classify a header slice.
    #[must_use]
    pub fn from_header(header: &[u8]) -> Self {
        if header.starts_with(&OLE2_MAGIC) {
            Self::LegacyContainer
        } else if header.starts_with(&ZIP_MAGIC) {
            Self::ZipContainer
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for SniffedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LegacyContainer => "OLE2 compound file",
            Self::ZipContainer => "zip package",
            Self::Unknown => "unrecognised container",
        };
        f.write_str(name)
    }
}

/// Determine the container format without consuming the stream.
///
/// The header is peeked from the reader's buffer. If the buffer holds fewer
/// bytes than the longest signature, the header is read and the stream is
/// seeked back to where it started.
pub fn detect<R: BufRead + Seek + ?Sized>(reader: &mut R) -> io::Result<SniffedFormat> {
    let buffered = reader.fill_buf()?;
    if buffered.len() >= OLE2_MAGIC.len() || buffered.is_empty() {
        return Ok(SniffedFormat::from_header(buffered));
    }

    let start = reader.stream_position()?;
    let mut header = [0u8; OLE2_MAGIC.len()];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    reader.seek(SeekFrom::Start(start))?;

    Ok(SniffedFormat::from_header(&header[..filled]))
}
