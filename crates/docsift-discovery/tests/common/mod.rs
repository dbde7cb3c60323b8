//! Document fixtures for the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write `bytes` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().expect("parent")).expect("create parents");
    fs::write(&path, bytes).expect("write fixture");
    path
}

fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start part");
        writer.write_all(contents.as_bytes()).expect("write part");
    }
    writer.finish().expect("finish package").into_inner()
}

/// A `.docx` with a single paragraph.
pub fn docx(text: &str) -> Vec<u8> {
    let document = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:body></w:document>"#
    );
    package(&[
        ("[Content_Types].xml", "<Types/>"),
        ("word/document.xml", document.as_str()),
    ])
}

/// A Word 97 `.doc` holding `text` (ASCII) in one 8-bit piece.
pub fn doc(text: &str) -> Vec<u8> {
    const TEXT_OFFSET: u32 = 0x200;

    let mut word = vec![0u8; TEXT_OFFSET as usize];
    word[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    word[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
    // fWhichTblStm: the piece table lives in 1Table.
    word[0x0A..0x0C].copy_from_slice(&0x0200u16.to_le_bytes());
    word.extend_from_slice(text.as_bytes());

    let chars = text.len() as u32;
    let fc = (TEXT_OFFSET * 2) | 0x4000_0000;
    let mut plc = Vec::new();
    plc.extend_from_slice(&0u32.to_le_bytes());
    plc.extend_from_slice(&chars.to_le_bytes());
    plc.extend_from_slice(&[0, 0]);
    plc.extend_from_slice(&fc.to_le_bytes());
    plc.extend_from_slice(&[0, 0]);

    let mut clx = vec![0x02];
    clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    clx.extend_from_slice(&plc);

    word[0x1A2..0x1A6].copy_from_slice(&0u32.to_le_bytes());
    word[0x1A6..0x1AA].copy_from_slice(&(clx.len() as u32).to_le_bytes());

    let mut file = cfb::CompoundFile::create(Cursor::new(Vec::new())).expect("create compound file");
    for (name, data) in [("/WordDocument", &word), ("/1Table", &clx)] {
        let mut stream = file.create_stream(name).expect("create stream");
        stream.write_all(data).expect("write stream");
        stream.flush().expect("flush stream");
    }
    file.flush().expect("flush compound file");
    file.into_inner().into_inner()
}

/// A one-sheet `.xlsx` with a string cell and a numeric cell in row 1.
pub fn xlsx(label: &str, number: f64) -> Vec<u8> {
    let workbook = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;
    let sheet = format!(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{label}</t></is></c><c r="B1"><v>{number}</v></c></row></sheetData></worksheet>"#
    );
    package(&[
        ("[Content_Types].xml", "<Types/>"),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ])
}

fn biff_record(typ: u16, data: &[u8]) -> Vec<u8> {
    let mut out = typ.to_le_bytes().to_vec();
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn biff_bof(substream: u16) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    data[0..2].copy_from_slice(&0x0600u16.to_le_bytes());
    data[2..4].copy_from_slice(&substream.to_le_bytes());
    biff_record(0x0809, &data)
}

/// A BIFF8 `.xls` with a label cell and a numeric cell in row 1.
pub fn xls(label: &str, number: f64) -> Vec<u8> {
    let mut sheet = biff_bof(0x0010);
    let mut cell = Vec::new();
    for field in [0u16, 0, 0, label.len() as u16] {
        cell.extend_from_slice(&field.to_le_bytes());
    }
    cell.push(0);
    cell.extend_from_slice(label.as_bytes());
    sheet.extend(biff_record(0x0204, &cell));
    let mut cell = Vec::new();
    for field in [0u16, 1, 0] {
        cell.extend_from_slice(&field.to_le_bytes());
    }
    cell.extend_from_slice(&number.to_le_bytes());
    sheet.extend(biff_record(0x0203, &cell));
    sheet.extend(biff_record(0x000A, &[]));

    let mut globals = biff_bof(0x0005);
    let name = b"Sheet1";
    // BoundSheet8 record plus the trailing EOF record.
    let offset = globals.len() + (4 + 8 + name.len()) + 4;
    let mut bound = (offset as u32).to_le_bytes().to_vec();
    bound.extend_from_slice(&[0, 0, name.len() as u8, 0]);
    bound.extend_from_slice(name);
    globals.extend(biff_record(0x0085, &bound));
    globals.extend(biff_record(0x000A, &[]));
    globals.extend(sheet);

    let mut file = cfb::CompoundFile::create_with_version(cfb::Version::V3, Cursor::new(Vec::new()))
        .expect("create compound file");
    {
        let mut stream = file.create_stream("/Workbook").expect("create stream");
        stream.write_all(&globals).expect("write workbook");
        stream.flush().expect("flush stream");
    }
    file.flush().expect("flush compound file");
    file.into_inner().into_inner()
}

/// A one-page PDF showing `text`.
pub fn pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}
