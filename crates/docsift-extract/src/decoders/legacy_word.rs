//! Word 97-2003 (`.doc`) decoder.
//!
//! Reads the File Information Block (FIB) at the start of the `WordDocument`
//! stream, follows it to the piece table in the table stream and rebuilds
//! the document text piece by piece. Pieces are either 8-bit (Windows-1252)
//! or UTF-16LE runs inside the `WordDocument` stream.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::error::{ExtractError, Result};
use cfb::CompoundFile;
use std::io::{Read, Seek};
use tracing::debug;

const FORMAT: &str = "legacy word";

const WORD_STREAM: &str = "/WordDocument";
const FIB_MAGIC: u16 = 0xA5EC;
/// Oldest FIB version we can read (Word 97).
const MIN_NFIB: u16 = 0x00C0;

const OFFSET_NFIB: usize = 0x0002;
const OFFSET_FLAGS: usize = 0x000A;
const OFFSET_FC_CLX: usize = 0x01A2;
const OFFSET_LCB_CLX: usize = 0x01A6;

const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// Decoder for legacy binary Word documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyWordDecoder;

impl LegacyWordDecoder {
    /// Create a new legacy Word decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextDecoder for LegacyWordDecoder {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let mut file = CompoundFile::open(source).map_err(|e| ExtractError::decode(FORMAT, e))?;

        if !file.is_stream(WORD_STREAM) {
            return Err(mismatch("compound file without a WordDocument stream"));
        }

        let word = read_stream(&mut file, WORD_STREAM)?;
        let fib = Fib::parse(&word)?;

        let table_name = fib.table_stream();
        if !file.is_stream(table_name) {
            return Err(ExtractError::decode(
                FORMAT,
                format!("missing table stream {table_name}"),
            ));
        }
        let table = read_stream(&mut file, table_name)?;

        let clx = span(&table, fib.fc_clx as usize, fib.lcb_clx as usize)
            .ok_or_else(|| ExtractError::decode(FORMAT, "piece table lies outside the table stream"))?;
        let pieces = parse_clx(clx)?;
        debug!(n_fib = fib.n_fib, pieces = pieces.len(), "reading piece table");

        let mut raw = String::new();
        for piece in &pieces {
            piece.append_to(&word, &mut raw)?;
        }

        Ok(clean_text(&raw))
    }
}

fn mismatch(found: impl Into<String>) -> ExtractError {
    ExtractError::FormatMismatch {
        expected: "Word 97-2003 document",
        found: found.into(),
    }
}

fn read_stream<F: Read + Seek>(file: &mut CompoundFile<F>, name: &str) -> Result<Vec<u8>> {
    let mut stream = file.open_stream(name)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn span(bytes: &[u8], start: usize, len: usize) -> Option<&[u8]> {
    bytes.get(start..start.checked_add(len)?)
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    span(bytes, at, 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    span(bytes, at, 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// The few FIB fields needed to find the text.
#[derive(Debug)]
struct Fib {
    n_fib: u16,
    one_table: bool,
    fc_clx: u32,
    lcb_clx: u32,
}

impl Fib {
    fn parse(word: &[u8]) -> Result<Self> {
        let ident = read_u16(word, 0).ok_or_else(|| mismatch("empty WordDocument stream"))?;
        if ident != FIB_MAGIC {
            return Err(mismatch(format!("FIB magic {ident:#06x}")));
        }

        let truncated = || ExtractError::decode(FORMAT, "truncated FIB");
        let n_fib = read_u16(word, OFFSET_NFIB).ok_or_else(truncated)?;
        if n_fib < MIN_NFIB {
            return Err(ExtractError::decode(
                FORMAT,
                format!("unsupported pre-97 document (nFib {n_fib:#06x})"),
            ));
        }

        let flags = read_u16(word, OFFSET_FLAGS).ok_or_else(truncated)?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(ExtractError::Encrypted { format: FORMAT });
        }

        Ok(Self {
            n_fib,
            one_table: flags & FLAG_WHICH_TABLE != 0,
            fc_clx: read_u32(word, OFFSET_FC_CLX).ok_or_else(truncated)?,
            lcb_clx: read_u32(word, OFFSET_LCB_CLX).ok_or_else(truncated)?,
        })
    }

    fn table_stream(&self) -> &'static str {
        if self.one_table {
            "/1Table"
        } else {
            "/0Table"
        }
    }
}

/// One run of text in the `WordDocument` stream.
#[derive(Debug, PartialEq, Eq)]
struct Piece {
    chars: usize,
    fc: u32,
    compressed: bool,
}

impl Piece {
    fn append_to(&self, word: &[u8], out: &mut String) -> Result<()> {
        let outside = || ExtractError::decode(FORMAT, "piece lies outside the WordDocument stream");

        if self.compressed {
            let bytes = span(word, (self.fc / 2) as usize, self.chars).ok_or_else(outside)?;
            out.extend(bytes.iter().map(|&b| cp1252_char(b)));
        } else {
            let len = self.chars.checked_mul(2).ok_or_else(outside)?;
            let bytes = span(word, self.fc as usize, len).ok_or_else(outside)?;
            let units = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
            out.extend(char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)));
        }
        Ok(())
    }
}

/// Walk the CLX: skip property runs (`Prc`), then parse the piece table (`Pcdt`).
fn parse_clx(clx: &[u8]) -> Result<Vec<Piece>> {
    let malformed = |what: &str| ExtractError::decode(FORMAT, format!("malformed CLX: {what}"));
    let mut pos = 0;

    loop {
        match clx.get(pos) {
            Some(0x01) => {
                let cb = read_u16(clx, pos + 1).ok_or_else(|| malformed("truncated Prc"))?;
                pos += 3 + cb as usize;
            }
            Some(0x02) => {
                let lcb = read_u32(clx, pos + 1).ok_or_else(|| malformed("truncated Pcdt"))?;
                let plc = span(clx, pos + 5, lcb as usize).ok_or_else(|| malformed("truncated PlcPcd"))?;
                return parse_plc_pcd(plc);
            }
            Some(other) => return Err(malformed(&format!("unexpected entry {other:#04x}"))),
            None => return Err(malformed("no piece table")),
        }
    }
}

/// `PlcPcd`: n+1 character positions followed by n 8-byte piece descriptors.
fn parse_plc_pcd(plc: &[u8]) -> Result<Vec<Piece>> {
    if plc.len() < 4 || (plc.len() - 4) % 12 != 0 {
        return Err(ExtractError::decode(
            FORMAT,
            format!("piece table has odd length {}", plc.len()),
        ));
    }

    let count = (plc.len() - 4) / 12;
    let descriptors = (count + 1) * 4;

    (0..count)
        .map(|i| {
            let start = read_u32(plc, i * 4).unwrap_or(0);
            let end = read_u32(plc, (i + 1) * 4).unwrap_or(0);
            let fc = read_u32(plc, descriptors + i * 8 + 2).unwrap_or(0);
            if end < start {
                return Err(ExtractError::decode(
                    FORMAT,
                    format!("piece {i} ends before it starts"),
                ));
            }
            Ok(Piece {
                chars: (end - start) as usize,
                fc: fc & FC_MASK,
                compressed: fc & FC_COMPRESSED != 0,
            })
        })
        .collect()
}

/// Windows-1252 code points for 0x80..=0x9F; undefined slots map to themselves.
const CP1252_HIGH: [u16; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0x008D, 0x017D, 0x008F, 0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => char::from_u32(u32::from(CP1252_HIGH[usize::from(byte - 0x80)]))
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        _ => char::from(byte),
    }
}

/// Turn Word's in-band control characters into plain text.
///
/// Field codes are `0x13 instruction 0x14 result 0x15`; only the result is
/// kept. Fields nest, and an inner field inside an instruction is dropped
/// along with it.
fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // One entry per open field: whether its result part has started.
    let mut fields: Vec<bool> = Vec::new();

    for ch in raw.chars() {
        match ch {
            '\u{13}' => fields.push(false),
            '\u{14}' => {
                if let Some(in_result) = fields.last_mut() {
                    *in_result = true;
                }
            }
            '\u{15}' => {
                fields.pop();
            }
            _ if fields.iter().any(|in_result| !in_result) => {}
            '\r' | '\u{0B}' | '\u{0C}' => out.push('\n'),
            '\u{07}' => out.push('\t'),
            '\u{1E}' => out.push('-'),
            '\t' | '\n' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    /// Write the given streams into an OLE2 compound file.
    pub(crate) fn compound(streams: &[(&str, &[u8])]) -> Vec<u8> {
        let mut file = CompoundFile::create(Cursor::new(Vec::new())).expect("create compound file");
        for (name, data) in streams {
            let mut stream = file.create_stream(name).expect("create stream");
            stream.write_all(data).expect("write stream");
            stream.flush().expect("flush stream");
        }
        file.flush().expect("flush compound file");
        file.into_inner().into_inner()
    }

    /// Build a `.doc` from `(text, compressed)` pieces.
    ///
    /// Compressed pieces store each char as one byte, so tests only pass
    /// chars below U+0100 for them.
    pub(crate) fn doc_with_pieces(pieces: &[(&str, bool)], flags: u16) -> Vec<u8> {
        let mut word = vec![0u8; 0x200];
        word[0..2].copy_from_slice(&FIB_MAGIC.to_le_bytes());
        word[OFFSET_NFIB..OFFSET_NFIB + 2].copy_from_slice(&0x00C1u16.to_le_bytes());
        word[OFFSET_FLAGS..OFFSET_FLAGS + 2]
            .copy_from_slice(&(flags | FLAG_WHICH_TABLE).to_le_bytes());

        let mut cps = vec![0u32];
        let mut pcds = Vec::new();
        for (text, compressed) in pieces {
            let offset = word.len() as u32;
            let (chars, fc) = if *compressed {
                let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
                word.extend_from_slice(&bytes);
                (bytes.len(), (offset * 2) | FC_COMPRESSED)
            } else {
                let units: Vec<u16> = text.encode_utf16().collect();
                for unit in &units {
                    word.extend_from_slice(&unit.to_le_bytes());
                }
                (units.len(), offset)
            };
            let last = *cps.last().expect("cp");
            cps.push(last + chars as u32);
            pcds.extend_from_slice(&[0, 0]);
            pcds.extend_from_slice(&fc.to_le_bytes());
            pcds.extend_from_slice(&[0, 0]);
        }

        let mut plc: Vec<u8> = cps.iter().flat_map(|cp| cp.to_le_bytes()).collect();
        plc.extend_from_slice(&pcds);

        // A property run ahead of the piece table, which the reader must skip.
        let mut clx = vec![0x01, 0x02, 0x00, 0xAA, 0xBB, 0x02];
        clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
        clx.extend_from_slice(&plc);

        word[OFFSET_FC_CLX..OFFSET_FC_CLX + 4].copy_from_slice(&0u32.to_le_bytes());
        word[OFFSET_LCB_CLX..OFFSET_LCB_CLX + 4].copy_from_slice(&(clx.len() as u32).to_le_bytes());

        compound(&[(WORD_STREAM, word.as_slice()), ("/1Table", clx.as_slice())])
    }

    /// A `.doc` holding `text` in a single 8-bit piece.
    pub(crate) fn doc_with_text(text: &str) -> Vec<u8> {
        doc_with_pieces(&[(text, true)], 0)
    }

    fn decode(bytes: Vec<u8>) -> Result<String> {
        LegacyWordDecoder::new().decode(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_compressed_piece() {
        let text = decode(doc_with_text("Hello world\rSecond paragraph\r")).expect("decode doc");
        assert_eq!(text, "Hello world\nSecond paragraph\n");
    }

    #[test]
    fn test_mixed_pieces() {
        let bytes = doc_with_pieces(&[("Caf", true), ("\u{e9} \u{2013} \u{65e5}\r", false)], 0);
        assert_eq!(decode(bytes).expect("decode doc"), "Caf\u{e9} \u{2013} \u{65e5}\n");
    }

    #[test]
    fn test_windows_1252_punctuation() {
        let bytes = doc_with_text("\u{93}quoted\u{94} \u{80}5");
        assert_eq!(decode(bytes).expect("decode doc"), "\u{201C}quoted\u{201D} \u{20AC}5");
    }

    #[test]
    fn test_field_instructions_dropped() {
        let raw = "See \u{13} HYPERLINK \"http://x\" \u{14}the site\u{15} now\r";
        assert_eq!(decode(doc_with_text(raw)).expect("decode doc"), "See the site now\n");
    }

    #[test]
    fn test_nested_field_in_instruction() {
        let raw = "a\u{13}IF \u{13}PAGE\u{14}1\u{15} = 1\u{14}yes\u{15}b";
        assert_eq!(clean_text(raw), "ayesb");
    }

    #[test]
    fn test_table_cells_become_tabs() {
        let text = decode(doc_with_text("A\u{7}B\u{7}\u{7}\r")).expect("decode doc");
        assert_eq!(text, "A\tB\t\t\n");
    }

    #[test]
    fn test_encrypted_document() {
        let err = decode(doc_with_pieces(&[("secret", true)], FLAG_ENCRYPTED)).unwrap_err();
        assert!(matches!(err, ExtractError::Encrypted { .. }), "got {err}");
    }

    #[test]
    fn test_missing_word_stream_is_mismatch() {
        let bytes = compound(&[("/Workbook", &b"not a word document"[..])]);
        let err = decode(bytes).unwrap_err();
        assert!(err.is_format_mismatch(), "got {err}");
    }

    #[test]
    fn test_bad_fib_magic_is_mismatch() {
        let bytes = compound(&[(WORD_STREAM, &[0u8; 0x200][..])]);
        let err = decode(bytes).unwrap_err();
        assert!(err.is_format_mismatch(), "got {err}");
    }

    #[test]
    fn test_truncated_container_is_decode_error() {
        let mut bytes = crate::sniff::OLE2_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 100]);
        let err = decode(bytes).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { .. }), "got {err}");
    }

    #[test]
    fn test_malformed_piece_table() {
        assert!(parse_clx(&[0x07]).is_err());
        assert!(parse_clx(&[]).is_err());
        assert!(parse_plc_pcd(&[0, 0, 0, 0, 1]).is_err());
    }
}
