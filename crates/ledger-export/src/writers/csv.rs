//! CSV serialization.
//!
//! Header record first, then one record per row. Fields containing the
//! delimiter, a quote, CR or LF are quoted and embedded quotes doubled.

use ::csv::{QuoteStyle, WriterBuilder};
use ledger_model::ExportData;

use crate::error::ExportCause;

pub fn write_csv(data: &ExportData) -> Result<Vec<u8>, ExportCause> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    if !data.headers.is_empty() {
        writer.write_record(&data.headers)?;
        for row in &data.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| ExportCause::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use ledger_model::ExportCell;

    use super::*;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn quotes_only_when_needed() {
        let data = ExportData::new(
            vec!["Party".to_string(), "Note".to_string(), "Amount".to_string()],
            vec![
                vec![
                    ExportCell::from("Acme, Inc."),
                    ExportCell::from("said \"hi\""),
                    ExportCell::from(1250.5),
                ],
                vec![
                    ExportCell::from("Globex"),
                    ExportCell::from("line\nbreak"),
                    ExportCell::empty(),
                ],
            ],
        );
        insta::assert_snapshot!(text(write_csv(&data).unwrap()), @r#"
        Party,Note,Amount
        "Acme, Inc.","said ""hi""",1250.5
        Globex,"line
        break",
        "#);
    }

    #[test]
    fn no_columns_writes_nothing() {
        let data = ExportData::new(Vec::new(), vec![Vec::new(), Vec::new()]);
        assert!(write_csv(&data).unwrap().is_empty());
    }
}
