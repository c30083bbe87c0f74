//! A plain dump of every data row as a new document.

use sheetfill_workbook::TabularSource;

use crate::error::DocxError;
use crate::minimal::MinimalDocx;

pub const REPORT_FILE_NAME: &str = "report.docx";
pub const REPORT_TITLE: &str = "Report Generated from Excel";

/// One `Row N` heading per data row followed by a `label: value` paragraph
/// per column.
pub fn build_report(source: &TabularSource) -> MinimalDocx {
    let labels = source.column_labels();
    let mut doc = MinimalDocx::new();
    doc.heading(1, REPORT_TITLE);
    for (i, row) in source.rows().iter().enumerate() {
        doc.heading(2, format!("Row {}", i + 1));
        for (label, cell) in labels.iter().zip(row) {
            doc.paragraph(format!("{label}: {cell}"));
        }
    }
    doc
}

pub fn report_bytes(source: &TabularSource) -> Result<Vec<u8>, DocxError> {
    build_report(source).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimal::ParagraphStyle;
    use sheetfill_common::CellValue;

    #[test]
    fn rows_become_headed_sections() {
        let source = TabularSource::from_rows(
            Some(vec!["Município".into(), String::new()]),
            vec![
                vec![CellValue::from("Tucano"), CellValue::Number(12345.0)],
                vec![CellValue::from("Euclides"), CellValue::Empty],
            ],
        );
        let doc = build_report(&source);
        let texts: Vec<&str> = doc.paragraphs().iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Report Generated from Excel",
                "Row 1",
                "Município: Tucano",
                "B: 12345",
                "Row 2",
                "Município: Euclides",
                "B: ",
            ]
        );
        assert_eq!(doc.paragraphs()[0].0, ParagraphStyle::Heading1);
        assert_eq!(doc.paragraphs()[4].0, ParagraphStyle::Heading2);
    }

    #[test]
    fn empty_source_has_only_the_title() {
        let doc = build_report(&TabularSource::default());
        assert_eq!(doc.paragraphs().len(), 1);
    }
}
