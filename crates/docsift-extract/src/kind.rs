//! Closed set of document kinds the registry dispatches on.

use crate::sniff::SniffedFormat;
use std::fmt;

/// Decoder family implied by a file extension alone.
///
/// The word-processor family is ambiguous until the container is sniffed;
/// every other family maps to exactly one [`DocumentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFamily {
    /// `.doc` and `.docx`
    WordProcessor,
    /// `.xls`
    LegacySpreadsheet,
    /// `.xlsx`
    ModernSpreadsheet,
    /// `.pdf`
    Pdf,
    /// `.txt`
    PlainText,
}

impl DocumentFamily {
    /// Map a normalized (lowercase, dotless) extension to its family.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "doc" | "docx" => Some(Self::WordProcessor),
            "xls" => Some(Self::LegacySpreadsheet),
            "xlsx" => Some(Self::ModernSpreadsheet),
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Whether the family needs a sniffed container to pick a kind.
    #[must_use]
    pub fn needs_sniffing(self) -> bool {
        matches!(self, Self::WordProcessor)
    }

    /// Resolve the concrete kind.
    ///
    /// Returns `None` only for a word-processor file whose container is
    /// unrecognised.
    #[must_use]
    pub fn resolve(self, sniffed: SniffedFormat) -> Option<DocumentKind> {
        match self {
            Self::WordProcessor => match sniffed {
                SniffedFormat::LegacyContainer => Some(DocumentKind::LegacyWord),
                SniffedFormat::ZipContainer => Some(DocumentKind::ModernWord),
                SniffedFormat::Unknown => None,
            },
            Self::LegacySpreadsheet => Some(DocumentKind::LegacySheet),
            Self::ModernSpreadsheet => Some(DocumentKind::ModernSheet),
            Self::Pdf => Some(DocumentKind::Pdf),
            Self::PlainText => Some(DocumentKind::PlainText),
        }
    }
}

/// Concrete document kind, resolved once per file and bound to one decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// Word 97-2003 binary document inside an OLE2 container
    LegacyWord,
    /// WordprocessingML package
    ModernWord,
    /// Excel 97-2003 workbook
    LegacySheet,
    /// SpreadsheetML package
    ModernSheet,
    /// Portable Document Format
    Pdf,
    /// Plain text
    PlainText,
}

impl DocumentKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 6] = [
        Self::LegacyWord,
        Self::ModernWord,
        Self::LegacySheet,
        Self::ModernSheet,
        Self::Pdf,
        Self::PlainText,
    ];

    /// Human-readable name used in logs and errors.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::LegacyWord => "legacy word document",
            Self::ModernWord => "modern word document",
            Self::LegacySheet => "legacy spreadsheet",
            Self::ModernSheet => "modern spreadsheet",
            Self::Pdf => "pdf document",
            Self::PlainText => "plain text",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
