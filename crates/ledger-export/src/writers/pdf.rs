//! PDF 1.4 output.
//!
//! The document uses the standard Helvetica fonts with WinAnsi encoding, so
//! no font programs are embedded. Page one carries the title, the metadata
//! block and the optional chart; the table flows over as many pages as it
//! needs, repeating the header row on each.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use ledger_model::{ExportCell, ExportData, ExportMetadata};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use crate::chart::RasterImage;
use crate::error::ExportCause;

const PORTRAIT: (f32, f32) = (595.0, 842.0);
const LANDSCAPE: (f32, f32) = (842.0, 595.0);
/// Tables wider than this switch the document to landscape.
pub const LANDSCAPE_COLUMN_THRESHOLD: usize = 6;

const MARGIN: f32 = 40.0;
const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 9.0;
const CELL_SIZE: f32 = 8.0;
const ROW_HEIGHT: f32 = 14.0;
const CELL_PADDING: f32 = 3.0;
const FOOTER_SIZE: f32 = 7.0;
const MAX_CHART_HEIGHT: f32 = 260.0;
const HEADER_GRAY: f32 = 0.9;
const CHART_RESOURCE: &str = "Im1";

/// Serialize `data` as a PDF document.
pub fn write_pdf(
    data: &ExportData,
    title: &str,
    chart: Option<&RasterImage>,
) -> Result<Vec<u8>, ExportCause> {
    let pages = layout(data, title, chart);
    let (page_width, page_height) = page_size(data.headers.len());

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let fonts = dictionary! {
        Font::Regular.resource() => regular_id,
        Font::Bold.resource() => bold_id,
    };
    let chart_id = chart
        .map(chart_stream)
        .transpose()?
        .map(|stream| doc.add_object(stream));

    let page_count = pages.len();
    let mut kids = Vec::with_capacity(page_count);
    for (idx, mut page) in pages.into_iter().enumerate() {
        let footer = format!("Page {} of {page_count}", idx + 1);
        let footer_width = text_width(&encode_win_ansi(&footer), FOOTER_SIZE, Font::Regular);
        page.text(
            Font::Regular,
            FOOTER_SIZE,
            page_width - MARGIN - footer_width,
            MARGIN / 2.0,
            &footer,
        );
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.encode()?));

        let mut resources = dictionary! { "Font" => fonts.clone() };
        if let Some(image_id) = chart_id.filter(|_| idx == 0) {
            resources.set("XObject", dictionary! { CHART_RESOURCE => image_id });
        }
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(page_width, page_height),
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(info_dictionary(title, data.metadata.as_ref()));
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn page_size(column_count: usize) -> (f32, f32) {
    if column_count > LANDSCAPE_COLUMN_THRESHOLD {
        LANDSCAPE
    } else {
        PORTRAIT
    }
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    [0.0, 0.0, width, height]
        .into_iter()
        .map(|edge| Object::Integer(edge as i64))
        .collect()
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn info_dictionary(title: &str, metadata: Option<&ExportMetadata>) -> Dictionary {
    let mut info = dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal("ledger-export"),
    };
    if let Some(metadata) = metadata {
        let stamp = metadata.generated_at.format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("CreationDate", Object::string_literal(stamp));
    }
    info
}

/// RGB image XObject; the pixels are Flate-compressed up front.
fn chart_stream(image: &RasterImage) -> Result<Stream, ExportCause> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.pixels())?;
    let compressed = encoder.finish()?;
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width()),
        "Height" => i64::from(image.height()),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, compressed).with_compression(false))
}

/// Lay out every page's drawing operators, minus the page footer.
fn layout(data: &ExportData, title: &str, chart: Option<&RasterImage>) -> Vec<PageContent> {
    let (page_width, page_height) = page_size(data.headers.len());
    let usable_width = page_width - 2.0 * MARGIN;
    let bottom = MARGIN + FOOTER_SIZE + 6.0;

    let mut pages = Vec::new();
    let mut page = PageContent::default();
    let mut y = page_height - MARGIN - TITLE_SIZE;
    page.text(Font::Bold, TITLE_SIZE, MARGIN, y, title);
    y -= 10.0;

    if let Some(metadata) = &data.metadata {
        let lines = [
            format!(
                "Generated: {}",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            format!("Date range: {}", metadata.date_range),
            format!("Records: {}", metadata.record_count),
        ];
        for line in &lines {
            y -= META_SIZE + 3.0;
            page.text(Font::Regular, META_SIZE, MARGIN, y, line);
        }
        y -= 8.0;
    }

    if let Some(image) = chart {
        let (width, height) = (image.width() as f32, image.height() as f32);
        let scale = (usable_width / width).min(MAX_CHART_HEIGHT / height);
        let (draw_width, draw_height) = (width * scale, height * scale);
        y -= draw_height;
        page.image(CHART_RESOURCE, MARGIN, y, draw_width, draw_height);
        y -= 12.0;
    }

    if data.headers.is_empty() {
        y -= META_SIZE + 3.0;
        page.text(Font::Regular, META_SIZE, MARGIN, y, "No columns selected.");
        pages.push(page);
        return pages;
    }

    let widths = column_widths(data, usable_width);
    y = header_row(&mut page, &data.headers, &widths, y);
    if data.rows.is_empty() {
        page.text(
            Font::Regular,
            CELL_SIZE,
            MARGIN + CELL_PADDING,
            y - ROW_HEIGHT + 4.0,
            "No records.",
        );
    }
    for row in &data.rows {
        if y - ROW_HEIGHT < bottom {
            pages.push(std::mem::take(&mut page));
            y = header_row(&mut page, &data.headers, &widths, page_height - MARGIN);
        }
        body_row(&mut page, row, &widths, y);
        y -= ROW_HEIGHT;
    }
    pages.push(page);
    pages
}

/// Draw the shaded header row with its top edge at `top`; returns the top
/// of the next row.
fn header_row(page: &mut PageContent, headers: &[String], widths: &[f32], top: f32) -> f32 {
    let row_bottom = top - ROW_HEIGHT;
    let total: f32 = widths.iter().sum();
    page.fill_rect(MARGIN, row_bottom, total, ROW_HEIGHT, HEADER_GRAY);
    let mut x = MARGIN;
    for (header, width) in headers.iter().zip(widths) {
        let fitted = fit(header, width - 2.0 * CELL_PADDING, CELL_SIZE, Font::Bold);
        page.encoded_text(Font::Bold, CELL_SIZE, x + CELL_PADDING, row_bottom + 4.0, fitted);
        x += width;
    }
    page.line(MARGIN, row_bottom, MARGIN + total, row_bottom);
    row_bottom
}

fn body_row(page: &mut PageContent, cells: &[ExportCell], widths: &[f32], top: f32) {
    let baseline = top - ROW_HEIGHT + 4.0;
    let mut x = MARGIN;
    for (cell, width) in cells.iter().zip(widths) {
        let available = width - 2.0 * CELL_PADDING;
        let fitted = fit(&cell.to_string(), available, CELL_SIZE, Font::Regular);
        let offset = match cell {
            ExportCell::Number(_) => available - text_width(&fitted, CELL_SIZE, Font::Regular),
            ExportCell::Text(_) => 0.0,
        };
        page.encoded_text(Font::Regular, CELL_SIZE, x + CELL_PADDING + offset, baseline, fitted);
        x += width;
    }
}

/// Split `usable` width across columns in proportion to their content,
/// within bounds so one long column cannot starve the rest.
fn column_widths(data: &ExportData, usable: f32) -> Vec<f32> {
    const SAMPLE_ROWS: usize = 200;
    let weights: Vec<f32> = data
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let longest = data
                .rows
                .iter()
                .take(SAMPLE_ROWS)
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.to_string().chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            longest.clamp(4, 30) as f32
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.iter().map(|weight| usable * weight / total).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

/// Drawing operators for one page.
#[derive(Debug, Default)]
struct PageContent {
    operations: Vec<Operation>,
}

impl PageContent {
    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.encoded_text(font, size, x, y, encode_win_ansi(text));
    }

    fn encoded_text(&mut self, font: Font, size: f32, x: f32, y: f32, bytes: Vec<u8>) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(bytes)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.operations.extend([
            Operation::new("g", vec![gray.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
            Operation::new("g", vec![0_i64.into()]),
        ]);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.operations.extend([
            Operation::new("w", vec![0.5_f32.into()]),
            Operation::new("m", vec![x1.into(), y1.into()]),
            Operation::new("l", vec![x2.into(), y2.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0_i64.into(),
                    0_i64.into(),
                    height.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn encode(self) -> Result<Vec<u8>, ExportCause> {
        Ok(Content {
            operations: self.operations,
        }
        .encode()?)
    }
}

/// Encode text for the WinAnsi-encoded standard fonts.
///
/// Characters outside the code page become `?`, except the rupee sign which
/// is spelled out.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => bytes.push(ch as u8),
            '\t' | '\n' | '\r' => bytes.push(b' '),
            '₹' => bytes.extend_from_slice(b"Rs."),
            other => bytes.push(win_ansi_extra(other).unwrap_or(b'?')),
        }
    }
    bytes
}

/// The 0x80..0x9F block, where WinAnsi departs from Latin-1.
fn win_ansi_extra(ch: char) -> Option<u8> {
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Helvetica advance widths for 0x20..=0x7E, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];
const DEFAULT_WIDTH: u16 = 556;
/// Helvetica-Bold runs wider; measured with the regular table plus margin.
const BOLD_FACTOR: f32 = 1.1;

fn text_width(bytes: &[u8], size: f32, font: Font) -> f32 {
    let units: u32 = bytes
        .iter()
        .map(|&byte| {
            let width = match byte {
                0x20..=0x7e => HELVETICA_WIDTHS[usize::from(byte - 0x20)],
                _ => DEFAULT_WIDTH,
            };
            u32::from(width)
        })
        .sum();
    let factor = match font {
        Font::Regular => 1.0,
        Font::Bold => BOLD_FACTOR,
    };
    units as f32 / 1000.0 * size * factor
}

/// Encode `text` and cut it to `max_width`, ending in an ellipsis when cut.
fn fit(text: &str, max_width: f32, size: f32, font: Font) -> Vec<u8> {
    const ELLIPSIS: u8 = 0x85;
    let mut bytes = encode_win_ansi(text);
    if text_width(&bytes, size, font) <= max_width {
        return bytes;
    }
    let ellipsis_width = text_width(&[ELLIPSIS], size, font);
    while !bytes.is_empty() && text_width(&bytes, size, font) + ellipsis_width > max_width {
        bytes.pop();
    }
    bytes.push(ELLIPSIS);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_maps_the_windows_block() {
        assert_eq!(encode_win_ansi("café €"), b"caf\xe9 \x80");
        assert_eq!(encode_win_ansi("a\tb"), b"a b");
    }

    #[test]
    fn rupee_is_spelled_out() {
        assert_eq!(encode_win_ansi("₹1,200.00"), b"Rs.1,200.00");
        assert_eq!(encode_win_ansi("日本"), b"??");
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let fitted = fit("Consolidated Freight Services Pvt Ltd", 60.0, CELL_SIZE, Font::Regular);
        assert_eq!(fitted.last(), Some(&0x85));
        assert!(text_width(&fitted, CELL_SIZE, Font::Regular) <= 60.0);
        assert_eq!(fit("Acme", 60.0, CELL_SIZE, Font::Regular), b"Acme");
    }

    #[test]
    fn wide_tables_go_landscape() {
        assert_eq!(page_size(6), PORTRAIT);
        assert_eq!(page_size(7), LANDSCAPE);
    }

    #[test]
    fn text_runs_select_font_then_position() {
        let mut page = PageContent::default();
        page.text(Font::Bold, 16.0, 40.0, 786.0, "Q1 (draft)");
        let operators: Vec<&str> = page.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, ["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(page.operations[1].operands[0].as_name().unwrap(), b"F2");

        let decoded = Content::decode(&page.encode().unwrap()).unwrap();
        let shown = decoded.operations[3].operands[0].as_str().unwrap();
        assert_eq!(shown, b"Q1 (draft)");
    }
}
