//! Built-in decoders, one per [`DocumentKind`](crate::DocumentKind).

mod legacy_word;
mod modern_word;
mod pdf;
mod plain_text;
mod spreadsheet;

pub use legacy_word::LegacyWordDecoder;
pub use modern_word::ModernWordDecoder;
pub use pdf::PdfDecoder;
pub use plain_text::PlainTextDecoder;
pub use spreadsheet::{format_general, LegacySheetDecoder, ModernSheetDecoder};
