//! Office Open XML workbook output.
//!
//! Writes the smallest part set Excel and LibreOffice accept: content types,
//! package and workbook relationships, a stylesheet with a bold header font,
//! and one worksheet per sheet. Text goes in as inline strings so no shared
//! string table is needed.

use std::io::{Cursor, Write};

use ledger_model::{ExportCell, ExportData, ExportMetadata};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ExportCause;

pub const DATA_SHEET: &str = "Data";
pub const METADATA_SHEET: &str = "Metadata";

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

const HEADER_STYLE: &str = "1";
const MAX_COLUMN_WIDTH: usize = 60;

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/// A worksheet's content before serialization.
struct Sheet<'a> {
    name: &'static str,
    headers: &'a [String],
    rows: Vec<Vec<ExportCell>>,
}

/// Serialize `data` as an `.xlsx` workbook.
///
/// Sheet `Data` holds the header row and the cells. Sheet `Metadata` is
/// added when `data` carries metadata.
pub fn write_xlsx(data: &ExportData, title: &str) -> Result<Vec<u8>, ExportCause> {
    let mut sheets = vec![Sheet {
        name: DATA_SHEET,
        headers: &data.headers,
        rows: data.rows.clone(),
    }];
    let metadata_headers = ["Field".to_string(), "Value".to_string()];
    if let Some(metadata) = &data.metadata {
        sheets.push(Sheet {
            name: METADATA_SHEET,
            headers: &metadata_headers,
            rows: metadata_rows(title, metadata),
        });
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(&content_types(sheets.len())?)?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(&package_relationships()?)?;
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook(&sheets)?)?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(&workbook_relationships(sheets.len())?)?;
    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES_XML.as_bytes())?;
    for (idx, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
        zip.write_all(&worksheet(sheet)?)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn metadata_rows(title: &str, metadata: &ExportMetadata) -> Vec<Vec<ExportCell>> {
    vec![
        vec![ExportCell::from("Title"), ExportCell::from(title)],
        vec![
            ExportCell::from("Record Count"),
            ExportCell::Number(metadata.record_count as f64),
        ],
        vec![
            ExportCell::from("Date Range"),
            ExportCell::from(metadata.date_range.as_str()),
        ],
        vec![
            ExportCell::from("Generated At"),
            ExportCell::Text(
                metadata
                    .generated_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string(),
            ),
        ],
    ]
}

fn xml_writer() -> Result<Writer<Vec<u8>>, ExportCause> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(xml)
}

fn content_types(sheet_count: usize) -> Result<Vec<u8>, ExportCause> {
    let mut xml = xml_writer()?;
    let mut types = BytesStart::new("Types");
    types.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/content-types",
    ));
    xml.write_event(Event::Start(types))?;
    for (extension, content_type) in [
        (
            "rels",
            "application/vnd.openxmlformats-package.relationships+xml",
        ),
        ("xml", "application/xml"),
    ] {
        let mut default = BytesStart::new("Default");
        default.push_attribute(("Extension", extension));
        default.push_attribute(("ContentType", content_type));
        xml.write_event(Event::Empty(default))?;
    }
    write_override(
        &mut xml,
        "/xl/workbook.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    )?;
    write_override(
        &mut xml,
        "/xl/styles.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
    )?;
    for idx in 1..=sheet_count {
        write_override(
            &mut xml,
            &format!("/xl/worksheets/sheet{idx}.xml"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
        )?;
    }
    xml.write_event(Event::End(BytesEnd::new("Types")))?;
    Ok(xml.into_inner())
}

fn write_override(
    xml: &mut Writer<Vec<u8>>,
    part: &str,
    content_type: &str,
) -> Result<(), ExportCause> {
    let mut element = BytesStart::new("Override");
    element.push_attribute(("PartName", part));
    element.push_attribute(("ContentType", content_type));
    xml.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_relationship(
    xml: &mut Writer<Vec<u8>>,
    id: &str,
    kind: &str,
    target: &str,
) -> Result<(), ExportCause> {
    let mut element = BytesStart::new("Relationship");
    element.push_attribute(("Id", id));
    element.push_attribute(("Type", kind));
    element.push_attribute(("Target", target));
    xml.write_event(Event::Empty(element))?;
    Ok(())
}

fn package_relationships() -> Result<Vec<u8>, ExportCause> {
    let mut xml = xml_writer()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", PACKAGE_RELATIONSHIPS_NS));
    xml.write_event(Event::Start(root))?;
    write_relationship(
        &mut xml,
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        "xl/workbook.xml",
    )?;
    xml.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(xml.into_inner())
}

fn workbook(sheets: &[Sheet<'_>]) -> Result<Vec<u8>, ExportCause> {
    let mut xml = xml_writer()?;
    let mut root = BytesStart::new("workbook");
    root.push_attribute(("xmlns", SPREADSHEET_NS));
    root.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    xml.write_event(Event::Start(root))?;
    xml.write_event(Event::Start(BytesStart::new("sheets")))?;
    for (idx, sheet) in sheets.iter().enumerate() {
        let sheet_id = (idx + 1).to_string();
        let rel_id = format!("rId{}", idx + 1);
        let mut element = BytesStart::new("sheet");
        element.push_attribute(("name", sheet.name));
        element.push_attribute(("sheetId", sheet_id.as_str()));
        element.push_attribute(("r:id", rel_id.as_str()));
        xml.write_event(Event::Empty(element))?;
    }
    xml.write_event(Event::End(BytesEnd::new("sheets")))?;
    xml.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(xml.into_inner())
}

fn workbook_relationships(sheet_count: usize) -> Result<Vec<u8>, ExportCause> {
    let mut xml = xml_writer()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", PACKAGE_RELATIONSHIPS_NS));
    xml.write_event(Event::Start(root))?;
    for idx in 1..=sheet_count {
        write_relationship(
            &mut xml,
            &format!("rId{idx}"),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
            &format!("worksheets/sheet{idx}.xml"),
        )?;
    }
    write_relationship(
        &mut xml,
        &format!("rId{}", sheet_count + 1),
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
        "styles.xml",
    )?;
    xml.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(xml.into_inner())
}

fn worksheet(sheet: &Sheet<'_>) -> Result<Vec<u8>, ExportCause> {
    let mut xml = xml_writer()?;
    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", SPREADSHEET_NS));
    xml.write_event(Event::Start(root))?;

    if !sheet.headers.is_empty() {
        xml.write_event(Event::Start(BytesStart::new("cols")))?;
        for (idx, width) in column_widths(sheet).into_iter().enumerate() {
            let position = (idx + 1).to_string();
            let width = width.to_string();
            let mut col = BytesStart::new("col");
            col.push_attribute(("min", position.as_str()));
            col.push_attribute(("max", position.as_str()));
            col.push_attribute(("width", width.as_str()));
            col.push_attribute(("customWidth", "1"));
            xml.write_event(Event::Empty(col))?;
        }
        xml.write_event(Event::End(BytesEnd::new("cols")))?;
    }

    xml.write_event(Event::Start(BytesStart::new("sheetData")))?;
    if !sheet.headers.is_empty() {
        let headers: Vec<ExportCell> = sheet
            .headers
            .iter()
            .map(|header| ExportCell::Text(header.clone()))
            .collect();
        write_row(&mut xml, 1, &headers, Some(HEADER_STYLE))?;
        for (idx, row) in sheet.rows.iter().enumerate() {
            write_row(&mut xml, idx + 2, row, None)?;
        }
    }
    xml.write_event(Event::End(BytesEnd::new("sheetData")))?;
    xml.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(xml.into_inner())
}

fn write_row(
    xml: &mut Writer<Vec<u8>>,
    number: usize,
    cells: &[ExportCell],
    style: Option<&str>,
) -> Result<(), ExportCause> {
    let row_ref = number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_ref.as_str()));
    xml.write_event(Event::Start(row))?;
    for (idx, cell) in cells.iter().enumerate() {
        let reference = format!("{}{number}", column_name(idx));
        let mut element = BytesStart::new("c");
        element.push_attribute(("r", reference.as_str()));
        if let Some(style) = style {
            element.push_attribute(("s", style));
        }
        match cell {
            ExportCell::Number(value) if value.is_finite() => {
                xml.write_event(Event::Start(element))?;
                write_text_element(xml, "v", &value.to_string())?;
                xml.write_event(Event::End(BytesEnd::new("c")))?;
            }
            ExportCell::Text(text) if text.is_empty() => {
                xml.write_event(Event::Empty(element))?;
            }
            other => {
                element.push_attribute(("t", "inlineStr"));
                xml.write_event(Event::Start(element))?;
                xml.write_event(Event::Start(BytesStart::new("is")))?;
                let mut t = BytesStart::new("t");
                t.push_attribute(("xml:space", "preserve"));
                xml.write_event(Event::Start(t))?;
                let text = sanitize(&other.to_string());
                xml.write_event(Event::Text(BytesText::new(&text)))?;
                xml.write_event(Event::End(BytesEnd::new("t")))?;
                xml.write_event(Event::End(BytesEnd::new("is")))?;
                xml.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
    }
    xml.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_text_element(
    xml: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ExportCause> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Drop control characters XML 1.0 cannot carry.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect()
}

/// Spreadsheet column letters for a zero-based index: A..Z, AA, AB, ...
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        name.push(b'A' + rem as u8);
        remaining = (remaining - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn column_widths(sheet: &Sheet<'_>) -> Vec<usize> {
    sheet
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let longest = sheet
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.to_string().chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(8, MAX_COLUMN_WIDTH)
        })
        .collect()
}
