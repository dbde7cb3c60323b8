//! Docsift Extract - Text extraction for office documents, PDFs and plain text.
//!
//! A file's extension picks a decoder family. For the word-processor family
//! the container is sniffed as well, since `.doc` and `.docx` files are often
//! mislabelled. The resolved [`DocumentKind`] is bound to exactly one
//! [`TextDecoder`] in the [`ExtractorRegistry`].
//!
//! # Architecture
//!
//! - **Sniffing** ([`sniff`]): OLE2 / zip detection from leading bytes
//! - **Kinds** ([`kind`]): extension families and the closed set of kinds
//! - **Decoders** ([`decoders`]): one decoder per kind
//! - **Registry** ([`registry`]): dispatch, panic containment and the
//!   format-mismatch policy
//! - **Errors** ([`error`]): extraction error types
//!
//! # Example
//!
//! ```rust
//! use docsift_extract::ExtractorRegistry;
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ExtractorRegistry::default();
//! let mut source = Cursor::new(b"Hello,\n   world".to_vec());
//! let text = registry.extract("txt", &mut source)?;
//! assert_eq!(text, "Hello,world");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod decoder;
pub mod decoders;
pub mod error;
pub mod kind;
pub mod registry;
pub mod sniff;

// Re-export commonly used types
pub use decoder::{DocumentSource, TextDecoder};
pub use error::{ExtractError, Result};
pub use kind::{DocumentFamily, DocumentKind};
pub use registry::ExtractorRegistry;
pub use sniff::SniffedFormat;
