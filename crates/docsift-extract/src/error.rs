//! Error types for the extraction subsystem.

use crate::kind::DocumentKind;
use thiserror::Error;

/// Errors that can occur while turning a document stream into text.
///
/// The variants fall into two groups. [`ExtractError::FormatMismatch`] means
/// the container did not hold what the selected decoder expects; callers
/// treat that as "no text" and still keep the file. Every other variant is a
/// genuine extraction failure.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The container does not match the decoder that was selected for it
    #[error("format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        /// What the decoder expected
        expected: &'static str,
        /// What the stream actually contained
        found: String,
    },

    /// The decoder could not make sense of the stream
    #[error("failed to decode {format}: {reason}")]
    Decode {
        /// Decoder name
        format: &'static str,
        /// Underlying failure
        reason: String,
    },

    /// The document is password protected
    #[error("{format} document is encrypted")]
    Encrypted {
        /// Decoder name
        format: &'static str,
    },

    /// The decoder library panicked on this input
    #[error("{format} decoder panicked: {message}")]
    DecoderPanicked {
        /// Decoder name
        format: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },

    /// No decoder is registered for the resolved kind
    #[error("no decoder registered for {0}")]
    NoDecoder(DocumentKind),

    /// The extension does not belong to any decoder family
    #[error("no decoder family for extension {0:?}")]
    UnsupportedExtension(String),

    /// I/O error while reading the stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Build a [`ExtractError::Decode`] from any displayable failure.
    pub fn decode(format: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    /// Whether this error means "wrong container for this decoder".
    #[must_use]
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. })
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
