//! WordprocessingML (`.docx`) decoder.
//!
//! Opens the zip package, then walks the XML of the header parts, the main
//! document part and the footer parts, in that order.

use crate::decoder::{DocumentSource, TextDecoder};
use crate::error::{ExtractError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::Read;
use tracing::debug;
use zip::ZipArchive;

const FORMAT: &str = "modern word";
const MAIN_PART: &str = "word/document.xml";

/// Decoder for OOXML word-processing packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModernWordDecoder;

impl ModernWordDecoder {
    /// Create a new OOXML word decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextDecoder for ModernWordDecoder {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, source: &mut dyn DocumentSource) -> Result<String> {
        let mut archive = ZipArchive::new(source).map_err(|e| ExtractError::decode(FORMAT, e))?;

        if archive.index_for_name(MAIN_PART).is_none() {
            return Err(ExtractError::FormatMismatch {
                expected: "word-processing package",
                found: format!("zip package without {MAIN_PART}"),
            });
        }

        let mut headers = story_parts(&archive, "word/header");
        let mut footers = story_parts(&archive, "word/footer");
        headers.sort();
        footers.sort();

        let mut text = String::new();
        for part in headers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(MAIN_PART))
            .chain(footers.iter().map(String::as_str))
        {
            let xml = read_part(&mut archive, part)?;
            debug!(part, bytes = xml.len(), "reading document part");
            append_part_text(&xml, &mut text)?;
        }

        Ok(text)
    }
}

fn story_parts<R: Read + std::io::Seek>(archive: &ZipArchive<R>, prefix: &str) -> Vec<String> {
    archive
        .file_names()
        .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
        .map(ToString::to_string)
        .collect()
}

fn read_part<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ExtractError::decode(FORMAT, format!("{name}: {e}")))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Append the visible text of one part.
///
/// Runs of `w:t` are concatenated, each paragraph ends with a newline,
/// `w:tab` becomes a tab and `w:br`/`w:cr` a newline. Tab stop definitions
/// (`w:tabs/w:tab`) are formatting, not content.
fn append_part_text(xml: &str, out: &mut String) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut in_text = false;
    let mut in_tab_stops = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tabs" => in_tab_stops = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if !in_tab_stops => out.push('\t'),
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let unescaped = t.unescape().map_err(|e| ExtractError::decode(FORMAT, e))?;
                out.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::decode(
                    FORMAT,
                    format!("malformed XML at byte {}: {e}", reader.buffer_position()),
                ))
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Zip the given `(name, contents)` parts into a package.
    pub(crate) fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start part");
            writer.write_all(contents.as_bytes()).expect("write part");
        }
        writer.finish().expect("finish package").into_inner()
    }

    /// A minimal `.docx` whose body holds one paragraph per entry.
    pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );
        package(&[
            ("[Content_Types].xml", "<Types/>"),
            (MAIN_PART, document.as_str()),
        ])
    }

    fn decode(bytes: Vec<u8>) -> Result<String> {
        ModernWordDecoder::new().decode(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_extracts_paragraphs() {
        let text = decode(docx_with_paragraphs(&["Quarterly report", "Revenue &amp; costs"]))
            .expect("decode docx");
        assert_eq!(text, "Quarterly report\nRevenue & costs\n");
    }

    #[test]
    fn test_tabs_breaks_and_tab_stops() {
        let document = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
            <w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t><w:br/><w:t>Next</w:t></w:r></w:p>
            <w:p/>
            </w:body></w:document>"#;
        let bytes = package(&[(MAIN_PART, document)]);
        let text = decode(bytes).expect("decode docx");
        assert_eq!(text, "Name\tValue\nNext\n\n");
    }

    #[test]
    fn test_headers_precede_body_and_footers_follow() {
        let header = r#"<w:hdr xmlns:w="w"><w:p><w:r><w:t>Header</w:t></w:r></w:p></w:hdr>"#;
        let footer = r#"<w:ftr xmlns:w="w"><w:p><w:r><w:t>Footer</w:t></w:r></w:p></w:ftr>"#;
        let body = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Body</w:t></w:r></w:p></w:body></w:document>"#;
        let bytes = package(&[
            ("word/footer1.xml", footer),
            (MAIN_PART, body),
            ("word/header1.xml", header),
        ]);
        assert_eq!(decode(bytes).expect("decode docx"), "Header\nBody\nFooter\n");
    }

    #[test]
    fn test_zip_without_main_part_is_mismatch() {
        let bytes = package(&[("xl/workbook.xml", "<workbook/>")]);
        let err = decode(bytes).unwrap_err();
        assert!(err.is_format_mismatch(), "got {err}");
    }

    #[test]
    fn test_truncated_zip_is_decode_error() {
        let mut bytes = docx_with_paragraphs(&["lost"]);
        bytes.truncate(bytes.len() / 2);
        let err = decode(bytes).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { .. }), "got {err}");
    }
}
