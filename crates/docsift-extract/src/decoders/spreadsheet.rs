//! Spreadsheet decoders backed by calamine.
//!
//! Both decoders emit the text of every non-empty cell of every sheet,
//! joined with single spaces, in sheet then row-major order.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::error::{ExtractError, Result};
use crate::sniff::{self, SniffedFormat};
use calamine::{Data, DataRef, ExcelDateTime, Reader, Xls, Xlsx};
use chrono::NaiveTime;
use docsift_core::SpreadsheetConfig;
use std::io::{BufReader, Seek, SeekFrom};
use tracing::debug;

const LEGACY_FORMAT: &str = "legacy spreadsheet";
const MODERN_FORMAT: &str = "modern spreadsheet";

/// Decoder for Excel 97-2003 (`.xls`) workbooks.
#[derive(Debug, Clone)]
pub struct LegacySheetDecoder {
    decimal_separator: char,
}

impl LegacySheetDecoder {
    /// Create a decoder that formats numbers with `decimal_separator`.
    #[must_use]
    pub fn new(decimal_separator: char) -> Self {
        Self { decimal_separator }
    }
}

impl Default for LegacySheetDecoder {
    fn default() -> Self {
        Self::new(SpreadsheetConfig::default().decimal_separator)
    }
}

impl TextDecoder for LegacySheetDecoder {
    fn name(&self) -> &'static str {
        LEGACY_FORMAT
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let opened: std::result::Result<Xls<_>, _> = Xls::new(&mut *source);
        let mut workbook = match opened {
            Ok(workbook) => workbook,
            Err(e) => {
                return Err(open_failure(
                    source,
                    LEGACY_FORMAT,
                    SniffedFormat::ZipContainer,
                    e,
                ))
            }
        };

        let mut cells = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ExtractError::decode(LEGACY_FORMAT, format!("sheet {name:?}: {e}")))?;
            debug!(sheet = %name, rows = range.height(), "reading sheet");

            for row in range.rows() {
                cells.extend(row.iter().filter_map(|cell| self.cell_text(cell)));
            }
        }

        Ok(cells.join(" "))
    }
}

impl LegacySheetDecoder {
    fn cell_text(&self, cell: &Data) -> Option<String> {
        match cell {
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
            Data::Float(f) => Some(format_general(*f, self.decimal_separator)),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(i) => Some(format_general(*i as f64, self.decimal_separator)),
            Data::DateTime(dt) => Some(datetime_text(dt)),
            Data::Bool(_) | Data::Error(_) | Data::Empty => None,
        }
    }
}

/// Decoder for SpreadsheetML (`.xlsx`) workbooks.
///
/// Cells are pulled one at a time from the sheet XML by calamine's cell
/// reader instead of materializing a whole range, so only the row being
/// parsed is resident. `buffer_size` sizes the raw read buffer under it.
#[derive(Debug, Clone)]
pub struct ModernSheetDecoder {
    buffer_size: usize,
}

impl ModernSheetDecoder {
    /// Create a streaming decoder with the given read buffer size.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

impl Default for ModernSheetDecoder {
    fn default() -> Self {
        Self::new(SpreadsheetConfig::default().buffer_size)
    }
}

impl TextDecoder for ModernSheetDecoder {
    fn name(&self) -> &'static str {
        MODERN_FORMAT
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let reader = BufReader::with_capacity(self.buffer_size, &mut *source);
        let opened: std::result::Result<Xlsx<_>, _> = Xlsx::new(reader);
        let mut workbook = match opened {
            Ok(workbook) => workbook,
            Err(e) => {
                return Err(open_failure(
                    source,
                    MODERN_FORMAT,
                    SniffedFormat::LegacyContainer,
                    e,
                ))
            }
        };

        let mut text = String::new();
        for name in workbook.sheet_names() {
            let sheet_error =
                |e: calamine::XlsxError| ExtractError::decode(MODERN_FORMAT, format!("sheet {name:?}: {e}"));
            let mut cells = workbook.worksheet_cells_reader(&name).map_err(sheet_error)?;

            let mut count = 0usize;
            while let Some(cell) = cells.next_cell().map_err(sheet_error)? {
                if let Some(value) = streamed_cell_text(cell.get_value()) {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&value);
                    count += 1;
                }
            }
            debug!(sheet = %name, cells = count, "streamed sheet");
        }

        Ok(text)
    }
}

fn streamed_cell_text(cell: &DataRef<'_>) -> Option<String> {
    match cell {
        DataRef::String(s) | DataRef::DateTimeIso(s) | DataRef::DurationIso(s) => Some(s.clone()),
        DataRef::SharedString(s) => Some((*s).to_string()),
        DataRef::Float(f) => Some(f.to_string()),
        DataRef::Int(i) => Some(i.to_string()),
        DataRef::DateTime(dt) => Some(datetime_text(dt)),
        DataRef::Bool(_) | DataRef::Error(_) | DataRef::Empty => None,
    }
}

/// Render a date or duration cell as searchable text.
///
/// Dates print as `YYYY-MM-DD`, with the time of day appended when it is
/// not midnight. Durations print as `h:mm:ss`. Serials chrono cannot place
/// fall back to the raw number.
fn datetime_text(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        if let Some(duration) = value.as_duration() {
            let seconds = duration.num_seconds();
            let sign = if seconds < 0 { "-" } else { "" };
            let seconds = seconds.abs();
            return format!(
                "{sign}{}:{:02}:{:02}",
                seconds / 3600,
                seconds / 60 % 60,
                seconds % 60
            );
        }
    } else if let Some(datetime) = value.as_datetime() {
        return if datetime.time() == NaiveTime::MIN {
            datetime.format("%Y-%m-%d").to_string()
        } else {
            datetime.format("%Y-%m-%d %H:%M:%S").to_string()
        };
    }
    value.as_f64().to_string()
}

/// Classify a workbook that failed to open.
///
/// A stream carrying the other spreadsheet family's container is a format
/// mismatch; anything else is a decode failure.
fn open_failure(
    source: &mut dyn DocumentSource,
    format: &'static str,
    other_container: SniffedFormat,
    error: impl std::fmt::Display,
) -> ExtractError {
    let reason = error.to_string();
    let sniffed = source
        .seek(SeekFrom::Start(0))
        .and_then(|_| sniff::detect(source));

    match sniffed {
        Ok(found) if found == other_container => ExtractError::FormatMismatch {
            expected: format,
            found: found.to_string(),
        },
        _ if reason.to_ascii_lowercase().contains("password") => ExtractError::Encrypted { format },
        _ => ExtractError::decode(format, reason),
    }
}

/// Render a number the way a spreadsheet's General format would.
///
/// Integral values print without a fraction. Other values keep at most 10
/// significant digits, switching to scientific notation for very large or
/// very small magnitudes.
pub fn format_general(value: f64, decimal_separator: char) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        return whole.to_string();
    }

    #[allow(clippy::cast_possible_truncation)]
    let magnitude = value.abs().log10().floor() as i32;
    let text = if (-9..15).contains(&magnitude) {
        let decimals = usize::try_from(9 - magnitude).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    } else {
        scientific(value)
    };

    if decimal_separator == '.' {
        text
    } else {
        text.replace('.', &decimal_separator.to_string())
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn scientific(value: f64) -> String {
    let formatted = format!("{value:.9e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{sign}{:02}", trim_fraction(mantissa), exponent.abs())
}
