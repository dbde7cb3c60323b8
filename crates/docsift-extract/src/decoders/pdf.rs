//! PDF decoder.
//!
//! Uses pdf-extract, which loads the whole document and emits text page by
//! page in page order.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::error::{ExtractError, Result};
use std::io::Read;
use tracing::debug;

/// Decoder for PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDecoder;

impl PdfDecoder {
    /// Create a new PDF decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextDecoder for PdfDecoder {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        debug!(bytes = bytes.len(), "extracting pdf text");

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            let reason = e.to_string();
            if reason.to_ascii_lowercase().contains("encrypt") {
                ExtractError::Encrypted { format: "pdf" }
            } else {
                ExtractError::decode("pdf", reason)
            }
        })
    }
}
