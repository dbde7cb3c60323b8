//! Decoder registry and per-document dispatch.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::decoders::{
    LegacySheetDecoder, LegacyWordDecoder, ModernSheetDecoder, ModernWordDecoder, PdfDecoder,
    PlainTextDecoder,
};
use crate::error::{ExtractError, Result};
use crate::kind::{DocumentFamily, DocumentKind};
use crate::sniff::{self, SniffedFormat};
use docsift_core::{normalize_extension, SpreadsheetConfig};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Maps each [`DocumentKind`] to the decoder bound to it.
pub struct ExtractorRegistry {
    decoders: HashMap<DocumentKind, Box<dyn TextDecoder>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Create a registry with the built-in decoder for every kind.
    #[must_use]
    pub fn with_defaults(spreadsheet: &SpreadsheetConfig) -> Self {
        let mut registry = Self::new();
        registry.register(DocumentKind::LegacyWord, LegacyWordDecoder::new());
        registry.register(DocumentKind::ModernWord, ModernWordDecoder::new());
        registry.register(
            DocumentKind::LegacySheet,
            LegacySheetDecoder::new(spreadsheet.decimal_separator),
        );
        registry.register(
            DocumentKind::ModernSheet,
            ModernSheetDecoder::new(spreadsheet.buffer_size),
        );
        registry.register(DocumentKind::Pdf, PdfDecoder::new());
        registry.register(DocumentKind::PlainText, PlainTextDecoder::new());
        registry
    }

    /// Bind `decoder` to `kind`, replacing any previous binding.
    pub fn register<D: TextDecoder + 'static>(&mut self, kind: DocumentKind, decoder: D) {
        debug!(%kind, decoder = decoder.name(), "registering decoder");
        self.decoders.insert(kind, Box::new(decoder));
    }

    /// Get the decoder bound to `kind`.
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> Option<&dyn TextDecoder> {
        self.decoders.get(&kind).map(|decoder| decoder.as_ref())
    }

    /// Whether the extension belongs to a decoder family.
    #[must_use]
    pub fn handles_extension(&self, extension: &str) -> bool {
        DocumentFamily::from_extension(&normalize_extension(extension)).is_some()
    }

    /// Pick the document kind for a file.
    ///
    /// Word-processor files are sniffed and routed on their container; the
    /// stream is left at its starting position. Returns `None` when the
    /// container is unrecognised.
    ///
    /// # Errors
    /// Returns error if the extension has no family or sniffing fails.
    pub fn resolve(
        &self,
        extension: &str,
        source: &mut dyn DocumentSource,
    ) -> Result<Option<DocumentKind>> {
        let extension = normalize_extension(extension);
        let family = DocumentFamily::from_extension(&extension)
            .ok_or(ExtractError::UnsupportedExtension(extension))?;

        let sniffed = if family.needs_sniffing() {
            sniff::detect(source)?
        } else {
            SniffedFormat::Unknown
        };

        Ok(family.resolve(sniffed))
    }

    /// Extract the text of one document.
    ///
    /// An unrecognised word-processor container and a decoder reporting a
    /// format mismatch both yield empty text after a warning. Any other
    /// failure, including a panic inside a decoder, is returned as an error.
    ///
    /// # Errors
    /// Returns error if the document cannot be decoded.
    pub fn extract(&self, extension: &str, source: &mut dyn DocumentSource) -> Result<String> {
        let Some(kind) = self.resolve(extension, source)? else {
            warn!(extension, "unrecognised container, keeping file without text");
            return Ok(String::new());
        };

        let decoder = self.get(kind).ok_or(ExtractError::NoDecoder(kind))?;
        debug!(%kind, decoder = decoder.name(), "decoding");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(source)))
            .unwrap_or_else(|payload| {
                Err(ExtractError::DecoderPanicked {
                    format: decoder.name(),
                    message: panic_message(payload.as_ref()),
                })
            });

        match outcome {
            Err(e) if e.is_format_mismatch() => {
                warn!(%kind, error = %e, "format mismatch, keeping file without text");
                Ok(String::new())
            }
            other => other,
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults(&SpreadsheetConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
